// UI模块主文件
pub mod app;

pub use app::{ViewerApp, start_viewer};
