use crate::geometry::matrix::Mat4;
use crate::geometry::rotation::{Quaternion, compose};
use crate::geometry::transform::TransformFactory;
use crate::io::obj_loader::{LoadError, load_mesh};
use crate::scene::mesh::Mesh;
use log::info;
use nalgebra::Vector3;
use std::path::Path;

/// 可交互的模型：不可变网格 + 可变姿态与平移
#[derive(Debug, Clone)]
pub struct Model {
    mesh: Mesh,
    orientation: Quaternion,
    offset: Vector3<f32>,
}

impl Model {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            orientation: Quaternion::identity(),
            offset: Vector3::zeros(),
        }
    }

    /// 从OBJ文件加载模型，失败即为致命错误，不会退化为空网格
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let mesh = load_mesh(path)?;
        let (min, max) = mesh.bounds();
        info!(
            "模型 '{}' 加载完成: {} 个三角形, 包围盒 [{:.2}, {:.2}, {:.2}] - [{:.2}, {:.2}, {:.2}]",
            mesh.name(),
            mesh.triangle_count(),
            min.x,
            min.y,
            min.z,
            max.x,
            max.y,
            max.z
        );
        Ok(Self::new(mesh))
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn orientation(&self) -> Quaternion {
        self.orientation
    }

    /// 用增量旋转更新姿态（组合，而非直接赋值）
    pub fn rotate(&mut self, delta: &Quaternion) {
        self.orientation = compose(&self.orientation, delta);
    }

    /// 设置旋转之后施加的世界平移
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.offset = Vector3::new(x, y, z);
    }

    pub fn offset(&self) -> Vector3<f32> {
        self.offset
    }

    /// 当前的世界变换（先旋转后平移），每次调用都重新计算
    pub fn world_matrix(&self) -> Mat4 {
        TransformFactory::model(&self.orientation, &self.offset)
    }
}
