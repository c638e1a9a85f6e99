use crate::core::frame_buffer::FrameBuffer;
use crate::material_system::color::apply_colormap_jet;
use image::ColorType;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// 保存图像数据到PNG文件
pub fn save_image(
    path: &Path,
    data: &[u8],
    width: u32,
    height: u32,
    color_type: ColorType,
) -> Result<(), String> {
    image::save_buffer(path, data, width, height, color_type)
        .map_err(|e| format!("保存图像到 {} 时出错: {}", path.display(), e))?;
    info!("图像已保存到 {}", path.display());
    Ok(())
}

/// 将深度缓冲数据归一化到指定的百分位数范围
///
/// 有限值被映射到 [0.0, 1.0]；非有限值（无记录的像素）保持为 NaN。
pub fn normalize_depth(depth_buffer: &[f32], min_percentile: f32, max_percentile: f32) -> Vec<f32> {
    let mut finite_depths: Vec<f32> = depth_buffer
        .iter()
        .copied()
        .filter(|d| d.is_finite())
        .collect();

    let (min_clip, max_clip) = if finite_depths.len() >= 2 {
        finite_depths.sort_unstable_by(f32::total_cmp);
        let last = finite_depths.len() - 1;
        let index = |percentile: f32| {
            ((percentile / 100.0 * last as f32).round() as usize).min(last)
        };

        let (mut lo, mut hi) = (
            finite_depths[index(min_percentile)],
            finite_depths[index(max_percentile)],
        );
        // 百分位范围过窄时退回到完整范围
        if hi - lo < 1e-6 {
            lo = finite_depths[0];
            hi = finite_depths[last];
        }
        debug!(
            "使用百分位数归一化深度: [{:.1}%, {:.1}%] -> [{:.4}, {:.4}]",
            min_percentile, max_percentile, lo, hi
        );
        (lo, hi)
    } else {
        match finite_depths.first() {
            Some(&d) => (d, d),
            None => {
                warn!("没有可用的深度值，深度图将全部为空");
                (0.0, 1.0)
            }
        }
    };

    let range = max_clip - min_clip;
    let inv_range = if range > 1e-6 { 1.0 / range } else { 0.0 };

    depth_buffer
        .iter()
        .map(|&depth| {
            if depth.is_finite() {
                ((depth.clamp(min_clip, max_clip) - min_clip) * inv_range).clamp(0.0, 1.0)
            } else {
                f32::NAN
            }
        })
        .collect()
}

/// 将深度缓冲转换为伪彩色RGB图像，越近越暖
pub fn depth_to_jet(depth_buffer: &[f32]) -> Vec<u8> {
    let inverted: Vec<f32> = normalize_depth(depth_buffer, 1.0, 99.0)
        .into_iter()
        .map(|d| 1.0 - d)
        .collect();
    apply_colormap_jet(&inverted)
}

/// 保存帧缓冲区：`<output_dir>/<output>_color.png`，以及可选的 `<output>_depth.png`
///
/// 返回写入的文件路径。
pub fn save_frame(
    frame_buffer: &FrameBuffer,
    output_dir: &str,
    output_name: &str,
    save_depth: bool,
) -> Result<Vec<PathBuf>, String> {
    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("创建输出目录 '{}' 失败: {}", output_dir, e))?;

    let width = frame_buffer.width() as u32;
    let height = frame_buffer.height() as u32;
    let mut written = Vec::new();

    let color_path = Path::new(output_dir).join(format!("{}_color.png", output_name));
    save_image(
        &color_path,
        &frame_buffer.rgb_bytes(),
        width,
        height,
        ColorType::Rgb8,
    )?;
    written.push(color_path);

    if save_depth {
        let depth_colored = depth_to_jet(frame_buffer.depth_values());
        let depth_path = Path::new(output_dir).join(format!("{}_depth.png", output_name));
        save_image(&depth_path, &depth_colored, width, height, ColorType::Rgb8)?;
        written.push(depth_path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_spans_unit_range_and_keeps_gaps() {
        let depth = [0.2, f32::INFINITY, 0.4, 0.6];
        let normalized = normalize_depth(&depth, 0.0, 100.0);
        assert_relative_eq!(normalized[0], 0.0);
        assert!(normalized[1].is_nan());
        assert_relative_eq!(normalized[2], 0.5, epsilon = 1e-5);
        assert_relative_eq!(normalized[3], 1.0);
    }

    #[test]
    fn normalize_handles_flat_and_empty_buffers() {
        let flat = normalize_depth(&[0.3, 0.3, 0.3], 1.0, 99.0);
        assert!(flat.iter().all(|&d| d == 0.0));

        let empty = normalize_depth(&[f32::INFINITY; 4], 1.0, 99.0);
        assert!(empty.iter().all(|d| d.is_nan()));
    }

    #[test]
    fn nearer_depth_is_warmer() {
        let rgb = depth_to_jet(&[0.1, 0.9, f32::INFINITY]);
        // 最近 -> 红, 最远 -> 蓝, 无记录 -> 黑
        assert_eq!(&rgb[0..3], &[255, 0, 0]);
        assert_eq!(&rgb[3..6], &[0, 0, 255]);
        assert_eq!(&rgb[6..9], &[0, 0, 0]);
    }

    #[test]
    fn save_frame_writes_color_and_depth() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("out");
        let output_dir = output_dir.to_str().unwrap();

        let mut fb = FrameBuffer::new(4, 3);
        fb.clear([10, 20, 30]);
        fb.test_and_set(1, 1, 0.5, [200, 0, 0]);

        let paths = save_frame(&fb, output_dir, "frame", true).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("frame_color.png"));
        assert!(paths[1].ends_with("frame_depth.png"));

        let color = image::open(&paths[0]).unwrap().to_rgb8();
        assert_eq!(color.dimensions(), (4, 3));
        assert_eq!(color.get_pixel(1, 1).0, [200, 0, 0]);
        assert_eq!(color.get_pixel(0, 0).0, [10, 20, 30]);

        let only_color = save_frame(&fb, output_dir, "plain", false).unwrap();
        assert_eq!(only_color.len(), 1);
    }
}
