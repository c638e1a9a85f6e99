use crate::core::renderer::Renderer;
use crate::geometry::camera::Camera;
use crate::scene::controller::{ControlSettings, FrameInput};
use crate::scene::model::Model;
use egui::{Color32, ColorImage, RichText, TextureOptions, Vec2};
use log::{error, info};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

const FPS_HISTORY_SIZE: usize = 30;

/// 滑动平均帧率
#[derive(Debug, Default)]
pub struct FpsCounter {
    history: VecDeque<f32>,
    average: f32,
}

impl FpsCounter {
    pub fn record(&mut self, frame_time: Duration) {
        let seconds = frame_time.as_secs_f32();
        if seconds <= 0.0 {
            return;
        }
        self.history.push_back(1.0 / seconds);
        if self.history.len() > FPS_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.average = self.history.iter().sum::<f32>() / self.history.len() as f32;
    }

    pub fn average(&self) -> f32 {
        self.average
    }

    /// 根据帧率水平选择显示颜色
    pub fn display(&self) -> (String, Color32) {
        let average = self.average();
        let color = if average >= 30.0 {
            Color32::from_rgb(50, 220, 50)
        } else if average >= 15.0 {
            Color32::from_rgb(220, 180, 50)
        } else {
            Color32::from_rgb(220, 50, 50)
        };
        (format!("FPS: {:.1}", average), color)
    }
}

/// 把按键与鼠标状态换算为一帧输入：W 前进、S 后退，拖拽的横向位移绕Y轴、纵向位移绕X轴
pub fn frame_input(forward_down: bool, backward_down: bool, drag: Vec2, elapsed: Duration) -> FrameInput {
    let forward = match (forward_down, backward_down) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    };
    FrameInput {
        forward,
        rotate_x: drag.y,
        rotate_y: drag.x,
        elapsed_ms: elapsed.as_secs_f32() * 1000.0,
    }
}

/// 交互式查看器：窗口事件循环的外部协作者
pub struct ViewerApp {
    renderer: Renderer,
    model: Model,
    camera: Camera,
    controls: ControlSettings,
    rendered_image: Option<egui::TextureHandle>,
    last_frame_time: Option<Instant>,
    fps: FpsCounter,
}

impl ViewerApp {
    pub fn new(renderer: Renderer, model: Model, camera: Camera, controls: ControlSettings) -> Self {
        Self {
            renderer,
            model,
            camera,
            controls,
            rendered_image: None,
            last_frame_time: None,
            fps: FpsCounter::default(),
        }
    }

    fn read_input(&mut self, ctx: &egui::Context) -> FrameInput {
        let now = Instant::now();
        let elapsed = self
            .last_frame_time
            .map(|last| now.duration_since(last))
            .unwrap_or_default();
        self.last_frame_time = Some(now);
        self.fps.record(elapsed);

        ctx.input(|i| {
            let drag = if i.pointer.primary_down() {
                i.pointer.delta()
            } else {
                Vec2::ZERO
            };
            frame_input(
                i.key_down(egui::Key::W),
                i.key_down(egui::Key::S),
                drag,
                elapsed,
            )
        })
    }

    /// 将颜色缓冲区上传到纹理
    fn upload_frame(&mut self, ctx: &egui::Context) {
        let width = self.renderer.width();
        let height = self.renderer.height();
        let image =
            ColorImage::from_rgba_unmultiplied([width, height], self.renderer.frame_buffer.color_bytes());

        match &mut self.rendered_image {
            Some(texture) => texture.set(image, TextureOptions::default()),
            None => {
                self.rendered_image =
                    Some(ctx.load_texture("rendered_image", image, TextureOptions::default()));
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        let input = self.read_input(ctx);
        if let Err(e) = self
            .renderer
            .update(&mut self.model, &mut self.camera, &input, &self.controls)
        {
            error!("渲染失败: {}", e);
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }
        self.upload_frame(ctx);

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let (fps_text, fps_color) = self.fps.display();
                ui.label(RichText::new(fps_text).color(fps_color));
                ui.separator();
                ui.label("W/S: move   drag: rotate   Esc: quit");
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if let Some(texture) = &self.rendered_image {
                    let size = Vec2::new(self.renderer.width() as f32, self.renderer.height() as f32);
                    ui.add(egui::Image::new(texture).fit_to_exact_size(size));
                }
            });

        ctx.request_repaint();
    }
}

/// 启动查看器窗口，阻塞直到窗口关闭
pub fn start_viewer(app: ViewerApp) -> Result<(), eframe::Error> {
    let width = app.renderer.width() as f32;
    let height = app.renderer.height() as f32;
    info!("启动查看器窗口 {}x{}", width, height);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height + 32.0])
            .with_resizable(false),
        ..Default::default()
    };

    eframe::run_native("softraster", options, Box::new(|_cc| Ok(Box::new(app))))
}
