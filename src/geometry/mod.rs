pub mod camera;
pub mod clipping;
pub mod matrix;
pub mod rotation;
pub mod transform;
pub mod vector;
