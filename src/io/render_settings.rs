use crate::core::renderer::RenderSettings;
use crate::geometry::camera::CameraSettings;
use crate::scene::controller::{ControlSettings, FrameInput};
use nalgebra::Vector3;

/// 所有可通过TOML或命令行配置的参数
///
/// 向量和颜色以字符串形式保存，便于与TOML互相转换；使用时再按需解析。
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    // ===== 文件路径设置 =====
    /// 输入OBJ文件的路径
    pub obj: Option<String>,
    /// 输出文件的基础名称
    pub output: String,
    /// 输出图像的目录
    pub output_dir: String,

    // ===== 渲染基础设置 =====
    pub width: usize,
    pub height: usize,
    /// 背景颜色，格式为"r,g,b"（0-255）
    pub background: String,
    /// 使用伪随机面颜色
    pub colorize: bool,
    pub backface_culling: bool,
    /// 无头模式下同时保存深度图
    pub save_depth: bool,

    // ===== 相机参数 =====
    pub near: f32,
    pub far: f32,
    /// 垂直视场角（度）
    pub fov: f32,
    /// 相机位置，格式为"x,y,z"
    pub camera_position: String,
    /// 相机观察方向，格式为"x,y,z"
    pub camera_forward: String,
    /// 相机上方向，格式为"x,y,z"
    pub camera_up: String,

    // ===== 物体变换 =====
    /// 旋转之后施加的平移，格式为"x,y,z"
    pub object_offset: String,

    // ===== 交互灵敏度 =====
    pub move_speed: f32,
    pub rotation_speed: f32,

    // ===== 无头模式 =====
    /// 渲染帧数
    pub frames: usize,
    /// 每帧模拟的耗时（毫秒）
    pub frame_ms: f32,
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub forward: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            obj: None,
            output: "frame".to_string(),
            output_dir: "output".to_string(),

            width: 1280,
            height: 720,
            background: "0,0,0".to_string(),
            colorize: false,
            backface_culling: false,
            save_depth: true,

            near: 0.1,
            far: 1000.0,
            fov: 80.0,
            camera_position: "0,0,0".to_string(),
            camera_forward: "0,0,1".to_string(),
            camera_up: "0,1,0".to_string(),

            object_offset: "0,-3,6".to_string(),

            move_speed: 0.001,
            rotation_speed: 0.001,

            frames: 1,
            frame_ms: 16.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
            forward: 0.0,
        }
    }
}

/// 解析逗号分隔的三个浮点数
pub fn parse_vec3(s: &str) -> Result<Vector3<f32>, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("需要3个逗号分隔的值，得到 '{}'", s));
    }
    let mut values = [0.0f32; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = part
            .trim()
            .parse::<f32>()
            .map_err(|e| format!("无效数字 '{}': {}", part.trim(), e))?;
    }
    Ok(Vector3::from(values))
}

/// 解析"r,g,b"格式的颜色，每个分量为0-255的整数
pub fn parse_color(s: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("颜色需要3个逗号分隔的值，得到 '{}'", s));
    }
    let mut rgb = [0u8; 3];
    for (channel, part) in rgb.iter_mut().zip(&parts) {
        *channel = part
            .trim()
            .parse::<u8>()
            .map_err(|e| format!("无效颜色分量 '{}': {}", part.trim(), e))?;
    }
    Ok(rgb)
}

impl ViewerSettings {
    pub fn camera_settings(&self) -> Result<CameraSettings, String> {
        Ok(CameraSettings {
            width: self.width,
            height: self.height,
            near: self.near,
            far: self.far,
            fov_degrees: self.fov,
            position: parse_vec3(&self.camera_position)
                .map_err(|e| format!("相机位置格式不正确: {}", e))?,
            forward: parse_vec3(&self.camera_forward)
                .map_err(|e| format!("相机方向格式不正确: {}", e))?,
            up: parse_vec3(&self.camera_up).map_err(|e| format!("相机上方向格式不正确: {}", e))?,
        })
    }

    pub fn render_settings(&self) -> Result<RenderSettings, String> {
        Ok(RenderSettings {
            background: parse_color(&self.background)
                .map_err(|e| format!("背景颜色格式不正确: {}", e))?,
            colorize: self.colorize,
            backface_culling: self.backface_culling,
        })
    }

    pub fn control_settings(&self) -> ControlSettings {
        ControlSettings {
            move_speed: self.move_speed,
            rotation_speed: self.rotation_speed,
        }
    }

    pub fn object_offset(&self) -> Result<Vector3<f32>, String> {
        parse_vec3(&self.object_offset).map_err(|e| format!("物体偏移格式不正确: {}", e))
    }

    /// 无头模式下每帧使用的固定输入
    pub fn headless_input(&self) -> FrameInput {
        FrameInput {
            forward: self.forward,
            rotate_x: self.rotate_x,
            rotate_y: self.rotate_y,
            elapsed_ms: self.frame_ms,
        }
    }

    /// 验证与具体模块无关的参数；相机参数由相机自身校验
    pub fn validate(&self) -> Result<(), String> {
        match &self.obj {
            Some(obj_path) if !std::path::Path::new(obj_path).exists() => {
                return Err(format!("错误: 找不到OBJ文件 '{}'", obj_path));
            }
            None => return Err("错误: 未指定OBJ文件路径".to_string()),
            _ => {}
        }

        if self.output_dir.trim().is_empty() {
            return Err("错误: 输出目录不能为空".to_string());
        }
        if self.output.trim().is_empty() {
            return Err("错误: 输出文件名不能为空".to_string());
        }
        if !(self.frame_ms >= 0.0) {
            return Err(format!("错误: 帧耗时必须为非负数，当前为 {}", self.frame_ms));
        }

        self.camera_settings()?;
        self.render_settings()?;
        self.object_offset()?;
        Ok(())
    }
}
