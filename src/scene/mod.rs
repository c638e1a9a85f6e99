pub mod controller;
pub mod mesh;
pub mod model;
