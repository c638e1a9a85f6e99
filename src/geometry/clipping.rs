//! 视图空间近平面裁剪（Sutherland-Hodgman）
//!
//! 三角形被平面 `z = near` 裁剪后最多得到 4 个顶点，因此结果使用定长数组保存，
//! 每帧逐三角形裁剪时不产生堆分配。

use nalgebra::Vector3;

/// 裁剪后的凸多边形（0、3 或 4 个顶点）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippedPolygon {
    vertices: [Vector3<f32>; 4],
    len: usize,
    /// 是否有顶点位于近平面之后
    pub clipped: bool,
}

impl ClippedPolygon {
    fn empty() -> Self {
        Self {
            vertices: [Vector3::zeros(); 4],
            len: 0,
            clipped: true,
        }
    }

    fn push(&mut self, v: Vector3<f32>) {
        self.vertices[self.len] = v;
        self.len += 1;
    }

    pub fn vertices(&self) -> &[Vector3<f32>] {
        &self.vertices[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.vertices().len() < 3
    }

    /// 以扇形方式拆分为三角形，保持原始绕序
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3<f32>; 3]> + '_ {
        let v = self.vertices();
        (1..v.len().saturating_sub(1)).map(move |i| [v[0], v[i], v[i + 1]])
    }
}

/// 用近平面裁剪视图空间中的三角形，`z >= near` 的部分被保留
pub fn clip_triangle_near(triangle: &[Vector3<f32>; 3], near: f32) -> ClippedPolygon {
    let inside = triangle.map(|v| v.z >= near);

    if inside.iter().all(|&i| i) {
        let mut polygon = ClippedPolygon::empty();
        triangle.iter().for_each(|v| polygon.push(*v));
        polygon.clipped = false;
        return polygon;
    }

    let mut polygon = ClippedPolygon::empty();
    if !inside.iter().any(|&i| i) {
        return polygon;
    }

    for i in 0..3 {
        let j = (i + 1) % 3;
        let (a, b) = (triangle[i], triangle[j]);

        if inside[i] {
            polygon.push(a);
        }
        if inside[i] != inside[j] {
            let t = (near - a.z) / (b.z - a.z);
            let mut crossing = a + (b - a) * t;
            crossing.z = near;
            polygon.push(crossing);
        }
    }

    polygon
}
