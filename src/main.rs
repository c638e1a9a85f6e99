use clap::Parser;
use log::{debug, info};
use std::time::Instant;

use softraster::core::renderer::Renderer;
use softraster::geometry::camera::Camera;
use softraster::io::args::Args;
use softraster::io::config_loader::TomlConfigLoader;
use softraster::io::render_settings::ViewerSettings;
use softraster::scene::model::Model;
use softraster::ui::{self, ViewerApp};
use softraster::utils::render_process::run_headless;

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Some(config_path) = &args.create_config {
        TomlConfigLoader::create_example_config(config_path)?;
        info!("示例配置已写入: {}", config_path);
        return Ok(());
    }

    let settings = args.resolve_settings()?;
    settings.validate()?;

    let (mut model, mut camera, mut renderer) = build_scene(&settings)?;

    if args.headless {
        let (_, written) = run_headless(&mut renderer, &mut model, &mut camera, &settings)?;
        debug!("共写入 {} 个文件", written.len());
        Ok(())
    } else {
        let app = ViewerApp::new(renderer, model, camera, settings.control_settings());
        ui::start_viewer(app).map_err(|e| format!("查看器运行失败: {}", e))
    }
}

/// 加载模型、构造相机和渲染器
fn build_scene(settings: &ViewerSettings) -> Result<(Model, Camera, Renderer), String> {
    let obj_path = settings
        .obj
        .as_deref()
        .ok_or_else(|| "错误: 未指定OBJ文件路径".to_string())?;

    let load_start = Instant::now();
    let mut model = Model::load(obj_path).map_err(|e| format!("模型加载失败: {}", e))?;
    info!("模型加载耗时 {:?}", load_start.elapsed());

    let offset = settings.object_offset()?;
    model.translate(offset.x, offset.y, offset.z);
    debug!("物体偏移: {:?}", model.offset());

    let camera_settings = settings.camera_settings()?;
    let camera = Camera::new(camera_settings).map_err(|e| format!("相机配置无效: {}", e))?;

    let renderer = Renderer::with_settings(
        settings.width,
        settings.height,
        settings.render_settings()?,
    );
    info!(
        "渲染器就绪: {}x{} (宽高比 {:.3}), 视场角 {:.1}°, 裁剪面 [{}, {}]",
        renderer.width(),
        renderer.height(),
        camera.aspect_ratio(),
        camera.fov_degrees(),
        camera.near(),
        camera.far()
    );
    debug!(
        "相机基: forward {:?}, up {:?}, right {:?}; 渲染选项 {:?}",
        camera.forward(),
        camera.up(),
        camera.right(),
        renderer.settings()
    );

    Ok((model, camera, renderer))
}
