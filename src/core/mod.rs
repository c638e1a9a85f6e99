pub mod frame_buffer;
pub mod geometry_processor;
pub mod rasterizer;
pub mod renderer;
