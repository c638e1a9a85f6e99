use crate::core::renderer::{FrameStats, Renderer};
use crate::geometry::camera::Camera;
use crate::io::render_settings::ViewerSettings;
use crate::scene::model::Model;
use crate::utils::save_utils::save_frame;
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// 无头渲染：以固定输入渲染 `settings.frames` 帧，然后保存最后一帧
///
/// `frames == 0` 时不施加任何输入，只渲染一次初始姿态。
///
/// # 返回值
/// 最后一帧的统计和写入的文件路径
pub fn run_headless(
    renderer: &mut Renderer,
    model: &mut Model,
    camera: &mut Camera,
    settings: &ViewerSettings,
) -> Result<(FrameStats, Vec<PathBuf>), String> {
    let input = settings.headless_input();
    let controls = settings.control_settings();
    let start_time = Instant::now();

    let mut stats = if settings.frames == 0 {
        renderer
            .render(model, camera)
            .map_err(|e| format!("渲染失败: {}", e))?
    } else {
        FrameStats::default()
    };

    for frame in 0..settings.frames {
        stats = renderer
            .update(model, camera, &input, &controls)
            .map_err(|e| format!("第 {} 帧渲染失败: {}", frame, e))?;
        debug!(
            "帧 {}: 提交 {}, 裁剪 {}, 拒绝 {}, 写入像素 {}",
            frame, stats.submitted, stats.clipped, stats.rejected, stats.pixels_written
        );
    }
    info!(
        "无头渲染完成: {} 帧, 耗时 {:?}",
        settings.frames,
        start_time.elapsed()
    );

    let written = save_frame(
        &renderer.frame_buffer,
        &settings.output_dir,
        &settings.output,
        settings.save_depth,
    )?;
    Ok((stats, written))
}
