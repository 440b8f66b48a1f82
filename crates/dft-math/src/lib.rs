pub mod chord;

pub use glam::{DVec2, DVec3};
pub use chord::{chord_lengths, polyline_length};

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;
