use crate::geometry::matrix::Mat4;
use crate::geometry::rotation::{Quaternion, rotation_matrix};
use nalgebra::{Point2, Vector3};

/// 变换矩阵工厂，所有矩阵均为行向量约定（平移位于第 3 行）
pub struct TransformFactory;

impl TransformFactory {
    /// 创建平移矩阵
    pub fn translation(offset: &Vector3<f32>) -> Mat4 {
        Mat4::new(
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            offset.x, offset.y, offset.z, 1.0,
        )
    }

    /// 创建四元数对应的旋转矩阵
    pub fn rotation(orientation: &Quaternion) -> Mat4 {
        rotation_matrix(orientation)
    }

    /// 模型的世界变换：先旋转，再平移
    pub fn model(orientation: &Quaternion, offset: &Vector3<f32>) -> Mat4 {
        Self::rotation(orientation) * Self::translation(offset)
    }

    /// 由正交基和位置构成的相机世界变换（相机空间 -> 世界空间）
    pub fn camera_world(
        position: &Vector3<f32>,
        right: &Vector3<f32>,
        up: &Vector3<f32>,
        forward: &Vector3<f32>,
    ) -> Mat4 {
        Mat4::new(
            right.x, right.y, right.z, 0.0, //
            up.x, up.y, up.z, 0.0, //
            forward.x, forward.y, forward.z, 0.0, //
            position.x, position.y, position.z, 1.0,
        )
    }

    /// 相机世界变换的闭式逆：先平移 `-position`，再乘以基矩阵的转置
    pub fn view(
        position: &Vector3<f32>,
        right: &Vector3<f32>,
        up: &Vector3<f32>,
        forward: &Vector3<f32>,
    ) -> Mat4 {
        let basis = Self::camera_world(&Vector3::zeros(), right, up, forward);
        Self::translation(&-position) * basis.transpose()
    }

    /// 创建透视投影矩阵
    ///
    /// 视图空间深度 `z` 写入 `w`，`[near, far]` 在透视除法后映射到 `[0, 1]`。
    pub fn perspective(aspect_ratio: f32, fov_y_rad: f32, near: f32, far: f32) -> Mat4 {
        let focal = 1.0 / (fov_y_rad * 0.5).tan();
        let depth_scale = far / (far - near);

        Mat4::new(
            focal / aspect_ratio, 0.0, 0.0, 0.0, //
            0.0, focal, 0.0, 0.0, //
            0.0, 0.0, depth_scale, 1.0, //
            0.0, 0.0, -near * depth_scale, 0.0,
        )
    }
}

/// 将NDC坐标转换为屏幕像素坐标
pub fn ndc_to_pixel(ndc: &Vector3<f32>, width: f32, height: f32) -> Point2<f32> {
    let screen_x = (ndc.x + 1.0) * 0.5 * width;
    // 翻转Y轴：NDC中+1是顶部，屏幕坐标中0是顶部
    let screen_y = (1.0 - ndc.y) * 0.5 * height;
    Point2::new(screen_x, screen_y)
}
