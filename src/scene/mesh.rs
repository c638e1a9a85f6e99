use crate::io::obj_loader::LoadError;
use nalgebra::Vector3;

/// 模型空间中的三角形
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vector3<f32>; 3],
}

impl Triangle {
    pub fn new(a: Vector3<f32>, b: Vector3<f32>, c: Vector3<f32>) -> Self {
        Self {
            vertices: [a, b, c],
        }
    }
}

/// 不可变的三角形网格，构造成功即保证非空
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(name: impl Into<String>, triangles: Vec<Triangle>) -> Result<Self, LoadError> {
        let name = name.into();
        if triangles.is_empty() {
            return Err(LoadError::EmptyMesh { name });
        }
        Ok(Self { name, triangles })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// 轴对齐包围盒 (min, max)
    pub fn bounds(&self) -> (Vector3<f32>, Vector3<f32>) {
        let mut min = Vector3::repeat(f32::INFINITY);
        let mut max = Vector3::repeat(f32::NEG_INFINITY);
        for v in self.triangles.iter().flat_map(|t| t.vertices.iter()) {
            min = min.inf(v);
            max = max.sup(v);
        }
        (min, max)
    }
}
