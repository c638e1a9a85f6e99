use crate::io::render_settings::ViewerSettings;
use std::path::Path;
use toml::Value;

/// TOML配置管理器，统一处理配置的读写
///
/// 未知的键被忽略；已知键的类型错误会返回错误，不会静默回退到默认值。
pub struct TomlConfigLoader;

fn type_error(section: &str, key: &str, expected: &str) -> String {
    format!("[{}] {} 应为{}", section, key, expected)
}

fn get_str(table: &toml::Table, section: &str, key: &str) -> Result<Option<String>, String> {
    table
        .get(key)
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| type_error(section, key, "字符串"))
        })
        .transpose()
}

fn get_bool(table: &toml::Table, section: &str, key: &str) -> Result<Option<bool>, String> {
    table
        .get(key)
        .map(|v| v.as_bool().ok_or_else(|| type_error(section, key, "布尔值")))
        .transpose()
}

/// 整数也作为浮点数接受，如 `far = 1000`
fn get_f32(table: &toml::Table, section: &str, key: &str) -> Result<Option<f32>, String> {
    table
        .get(key)
        .map(|v| match v {
            Value::Float(f) => Ok(*f as f32),
            Value::Integer(i) => Ok(*i as f32),
            _ => Err(type_error(section, key, "数值")),
        })
        .transpose()
}

fn get_usize(table: &toml::Table, section: &str, key: &str) -> Result<Option<usize>, String> {
    table
        .get(key)
        .map(|v| {
            v.as_integer()
                .and_then(|i| usize::try_from(i).ok())
                .ok_or_else(|| type_error(section, key, "非负整数"))
        })
        .transpose()
}

fn section<'a>(toml: &'a Value, name: &str) -> Result<Option<&'a toml::Table>, String> {
    toml.get(name)
        .map(|v| v.as_table().ok_or_else(|| format!("[{}] 应为表", name)))
        .transpose()
}

impl TomlConfigLoader {
    /// 从TOML文件加载完整配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ViewerSettings, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("读取配置文件失败: {}", e))?;

        Self::load_from_content(&content)
    }

    /// 从TOML内容字符串加载配置
    pub fn load_from_content(content: &str) -> Result<ViewerSettings, String> {
        let toml_value: Value =
            toml::from_str(content).map_err(|e| format!("解析TOML失败: {}", e))?;

        Self::parse_toml_to_settings(&toml_value)
    }

    /// 保存配置到TOML文件
    pub fn save_to_file<P: AsRef<Path>>(settings: &ViewerSettings, path: P) -> Result<(), String> {
        let toml_content = Self::settings_to_toml(settings);
        std::fs::write(path, toml_content).map_err(|e| format!("写入配置文件失败: {}", e))
    }

    /// 生成示例配置文件
    pub fn create_example_config<P: AsRef<Path>>(path: P) -> Result<(), String> {
        let settings = ViewerSettings {
            obj: Some("assets/teapot.obj".to_string()),
            ..Default::default()
        };
        Self::save_to_file(&settings, path).map_err(|e| format!("创建示例配置失败: {}", e))
    }

    // ===== TOML -> ViewerSettings 转换 =====

    fn parse_toml_to_settings(toml: &Value) -> Result<ViewerSettings, String> {
        let mut settings = ViewerSettings::default();

        if let Some(files) = section(toml, "files")? {
            Self::parse_files_section(&mut settings, files)?;
        }
        if let Some(render) = section(toml, "render")? {
            Self::parse_render_section(&mut settings, render)?;
        }
        if let Some(camera) = section(toml, "camera")? {
            Self::parse_camera_section(&mut settings, camera)?;
        }
        if let Some(object) = section(toml, "object")? {
            if let Some(offset) = get_str(object, "object", "offset")? {
                settings.object_offset = offset;
            }
        }
        if let Some(controls) = section(toml, "controls")? {
            Self::parse_controls_section(&mut settings, controls)?;
        }
        if let Some(headless) = section(toml, "headless")? {
            Self::parse_headless_section(&mut settings, headless)?;
        }

        Ok(settings)
    }

    fn parse_files_section(settings: &mut ViewerSettings, files: &toml::Table) -> Result<(), String> {
        if let Some(obj) = get_str(files, "files", "obj")? {
            settings.obj = Some(obj);
        }
        if let Some(output) = get_str(files, "files", "output")? {
            settings.output = output;
        }
        if let Some(output_dir) = get_str(files, "files", "output_dir")? {
            settings.output_dir = output_dir;
        }
        Ok(())
    }

    fn parse_render_section(
        settings: &mut ViewerSettings,
        render: &toml::Table,
    ) -> Result<(), String> {
        if let Some(width) = get_usize(render, "render", "width")? {
            settings.width = width;
        }
        if let Some(height) = get_usize(render, "render", "height")? {
            settings.height = height;
        }
        if let Some(background) = get_str(render, "render", "background")? {
            settings.background = background;
        }
        if let Some(colorize) = get_bool(render, "render", "colorize")? {
            settings.colorize = colorize;
        }
        if let Some(backface_culling) = get_bool(render, "render", "backface_culling")? {
            settings.backface_culling = backface_culling;
        }
        if let Some(save_depth) = get_bool(render, "render", "save_depth")? {
            settings.save_depth = save_depth;
        }
        Ok(())
    }

    fn parse_camera_section(
        settings: &mut ViewerSettings,
        camera: &toml::Table,
    ) -> Result<(), String> {
        if let Some(near) = get_f32(camera, "camera", "near")? {
            settings.near = near;
        }
        if let Some(far) = get_f32(camera, "camera", "far")? {
            settings.far = far;
        }
        if let Some(fov) = get_f32(camera, "camera", "fov")? {
            settings.fov = fov;
        }
        if let Some(position) = get_str(camera, "camera", "position")? {
            settings.camera_position = position;
        }
        if let Some(forward) = get_str(camera, "camera", "forward")? {
            settings.camera_forward = forward;
        }
        if let Some(up) = get_str(camera, "camera", "up")? {
            settings.camera_up = up;
        }
        Ok(())
    }

    fn parse_controls_section(
        settings: &mut ViewerSettings,
        controls: &toml::Table,
    ) -> Result<(), String> {
        if let Some(move_speed) = get_f32(controls, "controls", "move_speed")? {
            settings.move_speed = move_speed;
        }
        if let Some(rotation_speed) = get_f32(controls, "controls", "rotation_speed")? {
            settings.rotation_speed = rotation_speed;
        }
        Ok(())
    }

    fn parse_headless_section(
        settings: &mut ViewerSettings,
        headless: &toml::Table,
    ) -> Result<(), String> {
        if let Some(frames) = get_usize(headless, "headless", "frames")? {
            settings.frames = frames;
        }
        if let Some(frame_ms) = get_f32(headless, "headless", "frame_ms")? {
            settings.frame_ms = frame_ms;
        }
        if let Some(rotate_x) = get_f32(headless, "headless", "rotate_x")? {
            settings.rotate_x = rotate_x;
        }
        if let Some(rotate_y) = get_f32(headless, "headless", "rotate_y")? {
            settings.rotate_y = rotate_y;
        }
        if let Some(forward) = get_f32(headless, "headless", "forward")? {
            settings.forward = forward;
        }
        Ok(())
    }

    // ===== ViewerSettings -> TOML 转换 =====

    fn settings_to_toml(settings: &ViewerSettings) -> String {
        let mut content = String::new();

        content.push_str("# 软件光栅化查看器配置文件\n");
        content.push_str("# 命令行参数会覆盖这里的设置\n\n");

        content.push_str("[files]\n");
        if let Some(obj) = &settings.obj {
            content.push_str(&format!("obj = \"{}\"\n", obj));
        } else {
            content.push_str("# obj = \"path/to/your/model.obj\"  # 取消注释并设置OBJ文件路径\n");
        }
        content.push_str(&format!("output = \"{}\"\n", settings.output));
        content.push_str(&format!("output_dir = \"{}\"\n", settings.output_dir));
        content.push('\n');

        content.push_str("[render]\n");
        content.push_str(&format!("width = {}\n", settings.width));
        content.push_str(&format!("height = {}\n", settings.height));
        content.push_str(&format!("background = \"{}\"\n", settings.background));
        content.push_str(&format!("colorize = {}\n", settings.colorize));
        content.push_str(&format!(
            "backface_culling = {}\n",
            settings.backface_culling
        ));
        content.push_str(&format!("save_depth = {}\n", settings.save_depth));
        content.push('\n');

        // 浮点数使用 {:?} 输出，保证整数值也带小数点
        content.push_str("[camera]\n");
        content.push_str(&format!("near = {:?}\n", settings.near));
        content.push_str(&format!("far = {:?}\n", settings.far));
        content.push_str(&format!("fov = {:?}\n", settings.fov));
        content.push_str(&format!("position = \"{}\"\n", settings.camera_position));
        content.push_str(&format!("forward = \"{}\"\n", settings.camera_forward));
        content.push_str(&format!("up = \"{}\"\n", settings.camera_up));
        content.push('\n');

        content.push_str("[object]\n");
        content.push_str(&format!("offset = \"{}\"\n", settings.object_offset));
        content.push('\n');

        content.push_str("[controls]\n");
        content.push_str("# 每毫秒移动的世界单位\n");
        content.push_str(&format!("move_speed = {:?}\n", settings.move_speed));
        content.push_str("# 每单位鼠标位移每毫秒旋转的角度（度）\n");
        content.push_str(&format!("rotation_speed = {:?}\n", settings.rotation_speed));
        content.push('\n');

        content.push_str("[headless]\n");
        content.push_str(&format!("frames = {}\n", settings.frames));
        content.push_str(&format!("frame_ms = {:?}\n", settings.frame_ms));
        content.push_str(&format!("rotate_x = {:?}\n", settings.rotate_x));
        content.push_str(&format!("rotate_y = {:?}\n", settings.rotate_y));
        content.push_str(&format!("forward = {:?}\n", settings.forward));

        content
    }
}
