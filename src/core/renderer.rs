use crate::core::frame_buffer::FrameBuffer;
use crate::core::geometry_processor::{GeometryProcessor, TriangleFate};
use crate::core::rasterizer::{ScreenVertex, rasterize_triangle, signed_area};
use crate::geometry::camera::Camera;
use crate::material_system::color::{get_face_color, linear_rgb_to_u8};
use crate::scene::controller::{ControlSettings, FrameInput, apply_frame_input};
use crate::scene::model::Model;
use log::trace;
use std::time::Instant;
use thiserror::Error;

/// 渲染错误，出现即表示本帧失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("相机视口 {camera_width}x{camera_height} 与帧缓冲区 {buffer_width}x{buffer_height} 不一致")]
    ViewportMismatch {
        camera_width: usize,
        camera_height: usize,
        buffer_width: usize,
        buffer_height: usize,
    },
}

/// 渲染器选项
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// 清屏颜色
    pub background: [u8; 3],
    /// 为每个三角形分配确定性的伪随机颜色
    pub colorize: bool,
    /// 剔除屏幕上逆时针绕序的三角形
    pub backface_culling: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background: [0, 0, 0],
            colorize: false,
            backface_culling: false,
        }
    }
}

/// 单帧渲染统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// 网格中提交的三角形数
    pub submitted: usize,
    /// 被近平面裁剪且仍有部分送入光栅化的三角形数
    pub clipped: usize,
    /// 没有任何部分送入光栅化的三角形数（近平面之后、远平面之外、背面或零面积）
    ///
    /// 每个三角形只计入一类：`submitted == 未裁剪且绘制 + clipped + rejected`。
    pub rejected: usize,
    /// 实际送入光栅化的屏幕三角形数
    pub rasterized: usize,
    /// 通过深度测试写入的像素数
    pub pixels_written: usize,
}

/// 软件渲染器，独占颜色与深度缓冲区
pub struct Renderer {
    pub frame_buffer: FrameBuffer,
    settings: RenderSettings,
    /// 每帧复用的屏幕三角形缓存
    screen_triangles: Vec<[ScreenVertex; 3]>,
}

impl Renderer {
    pub fn with_settings(width: usize, height: usize, settings: RenderSettings) -> Self {
        Self {
            frame_buffer: FrameBuffer::new(width, height),
            settings,
            screen_triangles: Vec::with_capacity(2),
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn width(&self) -> usize {
        self.frame_buffer.width()
    }

    pub fn height(&self) -> usize {
        self.frame_buffer.height()
    }

    /// 渲染一帧：清屏、变换、裁剪、投影、光栅化和深度测试
    pub fn render(&mut self, model: &Model, camera: &Camera) -> Result<FrameStats, RenderError> {
        if camera.width() != self.width() || camera.height() != self.height() {
            return Err(RenderError::ViewportMismatch {
                camera_width: camera.width(),
                camera_height: camera.height(),
                buffer_width: self.width(),
                buffer_height: self.height(),
            });
        }

        let frame_start = Instant::now();
        self.frame_buffer.clear(self.settings.background);

        let processor = GeometryProcessor::new(model, camera);
        let mut stats = FrameStats::default();

        for (face_index, triangle) in model.mesh().triangles().iter().enumerate() {
            stats.submitted += 1;

            self.screen_triangles.clear();
            let was_clipped = match processor.process(triangle, &mut self.screen_triangles) {
                TriangleFate::Rejected => {
                    stats.rejected += 1;
                    continue;
                }
                TriangleFate::Clipped => true,
                TriangleFate::Accepted => false,
            };

            // 裁剪得到的子三角形沿用父三角形的颜色
            let color = linear_rgb_to_u8(&get_face_color(face_index, self.settings.colorize));
            let mut any_rasterized = false;

            for vertices in &self.screen_triangles {
                let area = signed_area(vertices);
                if area == 0.0 || (self.settings.backface_culling && area < 0.0) {
                    continue;
                }
                any_rasterized = true;
                stats.rasterized += 1;
                stats.pixels_written += rasterize_triangle(&mut self.frame_buffer, vertices, color);
            }

            if !any_rasterized {
                stats.rejected += 1;
            } else if was_clipped {
                stats.clipped += 1;
            }
        }

        trace!(
            "帧完成 ({:?}): 提交 {}, 裁剪 {}, 拒绝 {}, 光栅化 {}, 写入像素 {}",
            frame_start.elapsed(),
            stats.submitted,
            stats.clipped,
            stats.rejected,
            stats.rasterized,
            stats.pixels_written
        );

        Ok(stats)
    }

    /// 先把一帧输入作用到相机和模型上，再渲染
    pub fn update(
        &mut self,
        model: &mut Model,
        camera: &mut Camera,
        input: &FrameInput,
        controls: &ControlSettings,
    ) -> Result<FrameStats, RenderError> {
        apply_frame_input(model, camera, input, controls);
        self.render(model, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame_buffer::PIXEL_SIZE;
    use crate::geometry::camera::CameraSettings;
    use crate::scene::mesh::{Mesh, Triangle};
    use nalgebra::Vector3;

    const WIDTH: usize = 1280;
    const HEIGHT: usize = 720;

    fn scenario_triangle(z: f32) -> Triangle {
        Triangle::new(
            Vector3::new(-1.0, -1.0, z),
            Vector3::new(1.0, -1.0, z),
            Vector3::new(0.0, 1.0, z),
        )
    }

    fn model_of(triangles: Vec<Triangle>) -> Model {
        Model::new(Mesh::new("test", triangles).unwrap())
    }

    fn camera() -> Camera {
        Camera::new(CameraSettings::default()).unwrap()
    }

    fn plain_renderer(width: usize, height: usize) -> Renderer {
        Renderer::with_settings(width, height, RenderSettings::default())
    }

    /// 非背景像素的坐标
    fn drawn_pixels(renderer: &Renderer) -> Vec<(usize, usize)> {
        let background = renderer.settings().background;
        let fb = &renderer.frame_buffer;
        (0..fb.height())
            .flat_map(|y| (0..fb.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y).is_some_and(|p| p[..3] != background[..]))
            .collect()
    }

    #[test]
    fn scenario_triangle_is_drawn_centered_and_contiguous() {
        let mut renderer = plain_renderer(WIDTH, HEIGHT);
        let stats = renderer
            .render(&model_of(vec![scenario_triangle(5.0)]), &camera())
            .unwrap();

        let pixels = drawn_pixels(&renderer);
        assert!(!pixels.is_empty());
        assert_eq!(stats.pixels_written, pixels.len());
        assert_eq!(stats.rasterized, 1);

        let cx = pixels.iter().map(|p| p.0 as f32).sum::<f32>() / pixels.len() as f32;
        assert!((cx - 639.5).abs() < 2.0, "centroid x = {}", cx);

        let min_y = pixels.iter().map(|p| p.1).min().unwrap();
        let max_y = pixels.iter().map(|p| p.1).max().unwrap();
        assert!(min_y < HEIGHT / 2 && max_y > HEIGHT / 2);

        // 每一行的像素都是连续区间，且行与行之间没有空洞
        for y in min_y..=max_y {
            let row: Vec<usize> = pixels.iter().filter(|p| p.1 == y).map(|p| p.0).collect();
            assert!(!row.is_empty(), "row {} is empty", y);
            let (lo, hi) = (row[0], row[row.len() - 1]);
            assert_eq!(hi - lo + 1, row.len());
        }
    }

    #[test]
    fn triangle_behind_camera_draws_nothing() {
        let mut renderer = plain_renderer(WIDTH, HEIGHT);
        let stats = renderer
            .render(&model_of(vec![scenario_triangle(-5.0)]), &camera())
            .unwrap();

        assert_eq!(stats.pixels_written, 0);
        assert_eq!(stats.rejected, 1);
        assert!(drawn_pixels(&renderer).is_empty());
    }

    #[test]
    fn nearer_triangle_wins_regardless_of_order() {
        let center = (WIDTH / 2, HEIGHT / 2);
        for (triangles, near_index) in [
            (vec![scenario_triangle(5.0), scenario_triangle(6.0)], 0),
            (vec![scenario_triangle(6.0), scenario_triangle(5.0)], 1),
        ] {
            let mut renderer = Renderer::with_settings(
                WIDTH,
                HEIGHT,
                RenderSettings {
                    colorize: true,
                    ..Default::default()
                },
            );
            renderer.render(&model_of(triangles), &camera()).unwrap();

            let [r, g, b] = linear_rgb_to_u8(&get_face_color(near_index, true));
            assert_eq!(
                renderer.frame_buffer.pixel(center.0, center.1),
                Some([r, g, b, 255])
            );
        }
    }

    #[test]
    fn buffer_size_is_stable_across_frames() {
        let mut renderer = plain_renderer(WIDTH, HEIGHT);
        let model = model_of(vec![scenario_triangle(5.0)]);
        let camera = camera();
        for _ in 0..3 {
            renderer.render(&model, &camera).unwrap();
            assert_eq!(renderer.frame_buffer.color_bytes().len(), WIDTH * HEIGHT * PIXEL_SIZE);
        }
    }

    #[test]
    fn straddling_triangle_is_partially_drawn() {
        let triangle = Triangle::new(
            Vector3::new(-1.0, -1.0, 2.0),
            Vector3::new(1.0, -1.0, 2.0),
            Vector3::new(0.0, 3.0, -2.0),
        );
        let mut renderer = plain_renderer(WIDTH, HEIGHT);
        let stats = renderer.render(&model_of(vec![triangle]), &camera()).unwrap();

        assert_eq!(stats.clipped, 1);
        assert_eq!(stats.rejected, 0);
        assert!(stats.pixels_written > 0);
        assert!(stats.pixels_written < WIDTH * HEIGHT);
    }

    #[test]
    fn each_triangle_is_counted_in_exactly_one_category() {
        let straddling = Triangle::new(
            Vector3::new(-1.0, -1.0, 2.0),
            Vector3::new(1.0, -1.0, 2.0),
            Vector3::new(0.0, 3.0, -2.0),
        );
        let flipped = Triangle::new(
            Vector3::new(-1.0, -1.0, 5.0),
            Vector3::new(0.0, 1.0, 5.0),
            Vector3::new(1.0, -1.0, 5.0),
        );
        let model = model_of(vec![
            straddling,
            flipped,
            scenario_triangle(5.0),
            scenario_triangle(-5.0),
        ]);
        let mut renderer = Renderer::with_settings(
            WIDTH,
            HEIGHT,
            RenderSettings {
                backface_culling: true,
                ..Default::default()
            },
        );
        let stats = renderer.render(&model, &camera()).unwrap();

        // 裁剪后的子三角形全部被剔除时只计为拒绝
        assert_eq!(stats.submitted, 4);
        assert_eq!(stats.clipped, 0);
        assert_eq!(stats.rejected, 3);
        assert_eq!(stats.rasterized, 1);

        renderer.settings = RenderSettings::default();
        let stats = renderer.render(&model, &camera()).unwrap();
        assert_eq!(stats.clipped, 1);
        assert_eq!(stats.rejected, 1);
        assert!(stats.clipped + stats.rejected <= stats.submitted);
    }

    #[test]
    fn backface_culling_rejects_counter_clockwise_triangles() {
        let mut renderer = Renderer::with_settings(
            WIDTH,
            HEIGHT,
            RenderSettings {
                backface_culling: true,
                ..Default::default()
            },
        );
        // 场景三角形在屏幕上为逆时针
        let stats = renderer
            .render(&model_of(vec![scenario_triangle(5.0)]), &camera())
            .unwrap();
        assert_eq!(stats.pixels_written, 0);
        assert_eq!(stats.rejected, 1);

        let flipped = Triangle::new(
            Vector3::new(-1.0, -1.0, 5.0),
            Vector3::new(0.0, 1.0, 5.0),
            Vector3::new(1.0, -1.0, 5.0),
        );
        let stats = renderer.render(&model_of(vec![flipped]), &camera()).unwrap();
        assert!(stats.pixels_written > 0);
    }

    #[test]
    fn viewport_mismatch_is_an_error() {
        let mut renderer = plain_renderer(640, 480);
        let result = renderer.render(&model_of(vec![scenario_triangle(5.0)]), &camera());
        assert!(matches!(result, Err(RenderError::ViewportMismatch { .. })));
    }

    #[test]
    fn update_applies_input_before_rendering() {
        let mut renderer = plain_renderer(WIDTH, HEIGHT);
        let mut model = model_of(vec![scenario_triangle(5.0)]);
        let mut camera = camera();

        let input = FrameInput {
            forward: 1.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
            elapsed_ms: 1000.0,
        };
        let before = plain_renderer(WIDTH, HEIGHT)
            .render(&model, &camera)
            .unwrap()
            .pixels_written;
        let after = renderer
            .update(&mut model, &mut camera, &input, &ControlSettings::default())
            .unwrap()
            .pixels_written;

        assert!((camera.position().z - 1.0).abs() < 1e-5);
        // 相机前移后三角形更大
        assert!(after > before);
    }
}
