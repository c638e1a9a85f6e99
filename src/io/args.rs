use crate::io::config_loader::TomlConfigLoader;
use crate::io::render_settings::ViewerSettings;
use clap::Parser;
use log::info;

/// 命令行参数
///
/// 未给出的参数不覆盖配置文件中的值；优先级为 默认值 < TOML < 命令行。
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "softraster")]
#[command(author, version, about = "单网格软件光栅化查看器", long_about = None)]
pub struct Args {
    // ===== 配置 =====
    /// 配置文件路径（TOML格式）
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<String>,

    /// 在指定路径生成示例配置后退出
    #[arg(long, value_name = "FILE")]
    pub create_config: Option<String>,

    /// 无头模式：渲染若干帧后保存PNG，不打开窗口
    #[arg(long)]
    pub headless: bool,

    // ===== 文件 =====
    /// 输入OBJ文件的路径
    #[arg(long)]
    pub obj: Option<String>,

    /// 输出文件的基础名称（"frame" -> "frame_color.png", "frame_depth.png"）
    #[arg(short, long)]
    pub output: Option<String>,

    /// 输出图像的目录
    #[arg(long)]
    pub output_dir: Option<String>,

    // ===== 渲染 =====
    #[arg(long)]
    pub width: Option<usize>,

    #[arg(long)]
    pub height: Option<usize>,

    /// 背景颜色 "r,g,b"（0-255）
    #[arg(long)]
    pub background: Option<String>,

    /// 使用伪随机面颜色
    #[arg(long)]
    pub colorize: bool,

    /// 启用背面剔除
    #[arg(long)]
    pub backface_culling: bool,

    /// 是否保存深度图
    #[arg(long)]
    pub save_depth: Option<bool>,

    // ===== 相机 =====
    #[arg(long)]
    pub near: Option<f32>,

    #[arg(long)]
    pub far: Option<f32>,

    /// 垂直视场角（度）
    #[arg(long)]
    pub fov: Option<f32>,

    /// 物体偏移 "x,y,z"
    #[arg(long, allow_hyphen_values = true)]
    pub offset: Option<String>,

    // ===== 无头模式输入 =====
    /// 渲染帧数
    #[arg(long)]
    pub frames: Option<usize>,

    /// 每帧模拟耗时（毫秒）
    #[arg(long)]
    pub frame_ms: Option<f32>,

    /// 每帧绕X轴的旋转输入
    #[arg(long, allow_hyphen_values = true)]
    pub rotate_x: Option<f32>,

    /// 每帧绕Y轴的旋转输入
    #[arg(long, allow_hyphen_values = true)]
    pub rotate_y: Option<f32>,

    /// 每帧前后移动输入（-1、0、1）
    #[arg(long, allow_hyphen_values = true)]
    pub forward: Option<f32>,
}

impl Args {
    /// 加载配置文件（若有），再用命令行参数覆盖
    pub fn resolve_settings(&self) -> Result<ViewerSettings, String> {
        let mut settings = match &self.config {
            Some(config_path) => {
                info!("加载配置文件: {}", config_path);
                TomlConfigLoader::load_from_file(config_path)
                    .map_err(|e| format!("配置文件加载失败: {}", e))?
            }
            None => ViewerSettings::default(),
        };
        self.apply_to(&mut settings);
        Ok(settings)
    }

    /// 将显式给出的参数写入设置
    pub fn apply_to(&self, settings: &mut ViewerSettings) {
        if let Some(obj) = &self.obj {
            settings.obj = Some(obj.clone());
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            settings.output_dir = output_dir.clone();
        }

        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(background) = &self.background {
            settings.background = background.clone();
        }
        if self.colorize {
            settings.colorize = true;
        }
        if self.backface_culling {
            settings.backface_culling = true;
        }
        if let Some(save_depth) = self.save_depth {
            settings.save_depth = save_depth;
        }

        if let Some(near) = self.near {
            settings.near = near;
        }
        if let Some(far) = self.far {
            settings.far = far;
        }
        if let Some(fov) = self.fov {
            settings.fov = fov;
        }
        if let Some(offset) = &self.offset {
            settings.object_offset = offset.clone();
        }

        if let Some(frames) = self.frames {
            settings.frames = frames;
        }
        if let Some(frame_ms) = self.frame_ms {
            settings.frame_ms = frame_ms;
        }
        if let Some(rotate_x) = self.rotate_x {
            settings.rotate_x = rotate_x;
        }
        if let Some(rotate_y) = self.rotate_y {
            settings.rotate_y = rotate_y;
        }
        if let Some(forward) = self.forward {
            settings.forward = forward;
        }
    }
}
