use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// RGB颜色，分量范围 [0.0, 1.0]
pub type Color = Vector3<f32>;

/// 未着色模式下的默认灰色
pub const DEFAULT_FACE_COLOR: Color = Color::new(0.7, 0.7, 0.7);

/// 将线性RGB值转换为u8数组，超出范围的分量被截断
pub fn linear_rgb_to_u8(color: &Color) -> [u8; 3] {
    [
        (color.x * 255.0).clamp(0.0, 255.0) as u8,
        (color.y * 255.0).clamp(0.0, 255.0) as u8,
        (color.z * 255.0).clamp(0.0, 255.0) as u8,
    ]
}

/// 获取三角形的基础颜色
///
/// `colorize` 为 false 时返回默认灰色；否则以面索引为种子生成伪随机颜色，
/// 同一索引每帧得到相同结果，裁剪产生的子三角形因此沿用父三角形的颜色。
pub fn get_face_color(face_index: usize, colorize: bool) -> Color {
    if !colorize {
        return DEFAULT_FACE_COLOR;
    }

    let mut rng = StdRng::seed_from_u64(face_index as u64);
    Color::new(
        0.3 + rng.random::<f32>() * 0.4,
        0.3 + rng.random::<f32>() * 0.4,
        0.3 + rng.random::<f32>() * 0.4,
    )
}

/// JET 颜色映射：0 为蓝，1 为红
pub fn jet(value: f32) -> Color {
    let value = value.clamp(0.0, 1.0);
    if value <= 0.25 {
        // 蓝 -> 青
        Color::new(0.0, value * 4.0, 1.0)
    } else if value <= 0.5 {
        // 青 -> 绿
        Color::new(0.0, 1.0, 1.0 - (value - 0.25) * 4.0)
    } else if value <= 0.75 {
        // 绿 -> 黄
        Color::new((value - 0.5) * 4.0, 1.0, 0.0)
    } else {
        // 黄 -> 红
        Color::new(1.0, 1.0 - (value - 0.75) * 4.0, 0.0)
    }
}

/// 将归一化深度图（按行展开）转换为 RGB8 图像数据，非有限值输出黑色
pub fn apply_colormap_jet(normalized_depth: &[f32]) -> Vec<u8> {
    normalized_depth
        .iter()
        .flat_map(|&depth| {
            if depth.is_finite() {
                linear_rgb_to_u8(&jet(depth))
            } else {
                [0, 0, 0]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_colors_are_deterministic() {
        assert_eq!(get_face_color(42, true), get_face_color(42, true));
        assert_eq!(get_face_color(7, false), DEFAULT_FACE_COLOR);

        let c = get_face_color(3, true);
        assert!(c.iter().all(|&v| (0.3..0.7).contains(&v)));
    }

    #[test]
    fn u8_conversion_clamps() {
        assert_eq!(linear_rgb_to_u8(&Color::new(1.5, -0.2, 1.0)), [255, 0, 255]);
    }

    #[test]
    fn jet_endpoints() {
        assert_eq!(apply_colormap_jet(&[0.0]), vec![0, 0, 255]);
        assert_eq!(apply_colormap_jet(&[1.0]), vec![255, 0, 0]);
        assert_eq!(apply_colormap_jet(&[0.5]), vec![0, 255, 0]);
        assert_eq!(apply_colormap_jet(&[f32::INFINITY, f32::NAN]), vec![0; 6]);
    }
}
