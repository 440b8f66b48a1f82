pub mod error;
pub mod tolerance;

pub use error::{DftError, Result};
pub use tolerance::Tolerance;
