//! 基于边函数的三角形光栅化
//!
//! 屏幕坐标系原点在左上角、Y 轴向下。像素 `(x, y)` 在其中心 `(x + 0.5, y + 0.5)`
//! 处采样；中心恰好落在边上时按左上规则归属，保证共享边的相邻三角形不重复、
//! 不遗漏像素。

use crate::core::frame_buffer::FrameBuffer;
use nalgebra::Point2;

/// 深度范围容差：插值舍入导致的略微越界（近平面或远平面上的片元）仍然保留
pub const DEPTH_EPSILON: f32 = 1e-5;

/// 投影并完成视口映射后的顶点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    /// 像素坐标
    pub position: Point2<f32>,
    /// NDC深度，`[0, 1]` 内可见
    pub depth: f32,
}

impl ScreenVertex {
    pub fn new(x: f32, y: f32, depth: f32) -> Self {
        Self {
            position: Point2::new(x, y),
            depth,
        }
    }
}

/// 边函数：点 `p` 相对有向边 `a -> b` 的有符号面积（两倍）
#[inline]
pub fn edge_function(a: &Point2<f32>, b: &Point2<f32>, p: &Point2<f32>) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// 三角形在屏幕空间中的有符号面积（两倍）
///
/// Y 轴向下时，正值对应视觉上的顺时针绕序。
pub fn signed_area(vertices: &[ScreenVertex; 3]) -> f32 {
    edge_function(
        &vertices[0].position,
        &vertices[1].position,
        &vertices[2].position,
    )
}

/// 正面积绕序下的左上边判定：水平且向右的边为上边，向上的边为左边
#[inline]
fn is_top_left(a: &Point2<f32>, b: &Point2<f32>) -> bool {
    let d = b - a;
    (d.y == 0.0 && d.x > 0.0) || d.y < 0.0
}

#[inline]
fn covers(weight: f32, top_left: bool) -> bool {
    weight > 0.0 || (weight == 0.0 && top_left)
}

/// 遍历三角形覆盖的所有像素，回调参数为像素坐标和插值深度
///
/// 三角形先被统一为正面积绕序，零面积三角形不产生任何像素。
pub fn for_each_covered_pixel(
    vertices: &[ScreenVertex; 3],
    width: usize,
    height: usize,
    mut visit: impl FnMut(usize, usize, f32),
) {
    let area = signed_area(vertices);
    if area == 0.0 || !area.is_finite() {
        return;
    }
    let [v0, v1, v2] = if area > 0.0 {
        *vertices
    } else {
        [vertices[0], vertices[2], vertices[1]]
    };
    let inv_area = 1.0 / area.abs();
    let (p0, p1, p2) = (v0.position, v1.position, v2.position);

    // 包围盒与缓冲区求交
    let min_x = p0.x.min(p1.x).min(p2.x).floor().max(0.0) as usize;
    let min_y = p0.y.min(p1.y).min(p2.y).floor().max(0.0) as usize;
    let max_x = p0.x.max(p1.x).max(p2.x).ceil().min(width as f32) as usize;
    let max_y = p0.y.max(p1.y).max(p2.y).ceil().min(height as f32) as usize;

    let top_left = [is_top_left(&p1, &p2), is_top_left(&p2, &p0), is_top_left(&p0, &p1)];

    for y in min_y..max_y {
        for x in min_x..max_x {
            let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge_function(&p1, &p2, &p);
            let w1 = edge_function(&p2, &p0, &p);
            let w2 = edge_function(&p0, &p1, &p);

            if covers(w0, top_left[0]) && covers(w1, top_left[1]) && covers(w2, top_left[2]) {
                // NDC深度在屏幕空间中是仿射的，直接用重心坐标线性插值
                let depth = (w0 * v0.depth + w1 * v1.depth + w2 * v2.depth) * inv_area;
                visit(x, y, depth);
            }
        }
    }
}

/// 光栅化单个三角形并进行深度测试，返回写入的像素数
pub fn rasterize_triangle(
    frame_buffer: &mut FrameBuffer,
    vertices: &[ScreenVertex; 3],
    color: [u8; 3],
) -> usize {
    let (width, height) = (frame_buffer.width(), frame_buffer.height());
    let mut written = 0;
    for_each_covered_pixel(vertices, width, height, |x, y, depth| {
        if !(-DEPTH_EPSILON..=1.0 + DEPTH_EPSILON).contains(&depth) {
            return;
        }
        if frame_buffer.test_and_set(x, y, depth.clamp(0.0, 1.0), color) {
            written += 1;
        }
    });
    written
}
