// utils/mod.rs
pub mod render_process;
pub mod save_utils;
