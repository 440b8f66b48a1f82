use thiserror::Error;

#[derive(Debug, Error)]
pub enum DftError {
    #[error("Construction error: {0}")]
    Construction(String),

    #[error("Knot vector error: {0}")]
    Knots(String),

    #[error("Parameter out of domain: {0}")]
    Domain(String),
}

pub type Result<T> = std::result::Result<T, DftError>;
