//! # softraster
//!
//! 单线程软件光栅化器：加载单个 OBJ 网格，逐帧应用四元数姿态与相机平移输入，
//! 在视图空间做近平面裁剪，按像素中心与左上规则光栅化并进行深度测试。

pub mod core;
pub mod geometry;
pub mod io;
pub mod material_system;
pub mod scene;
pub mod ui;
pub mod utils;
