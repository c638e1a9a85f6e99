use crate::geometry::matrix::Mat4;
use crate::geometry::transform::TransformFactory;
use crate::geometry::vector::{is_orthonormal_basis, normalize_or_zero};
use nalgebra::Vector3;
use thiserror::Error;

/// 相机配置错误，非法取值直接报告而不是被静默修正
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraError {
    #[error("视口尺寸必须为正数，当前为 {width}x{height}")]
    InvalidViewport { width: usize, height: usize },
    #[error("裁剪平面需满足 0 < near < far，当前 near={near}, far={far}")]
    InvalidClipPlanes { near: f32, far: f32 },
    #[error("视场角必须位于 (0°, 180°) 区间，当前为 {fov}°")]
    InvalidFov { fov: f32 },
    #[error("相机前方向与上方向无法构成正交基")]
    DegenerateBasis,
}

/// 相机配置参数
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    pub width: usize,
    pub height: usize,
    pub near: f32,
    pub far: f32,
    /// 垂直视场角（角度制）
    pub fov_degrees: f32,
    /// 相机位置
    pub position: Vector3<f32>,
    /// 观察方向，构造后固定不变
    pub forward: Vector3<f32>,
    /// 世界上方向，构造时会与 forward 正交化
    pub up: Vector3<f32>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            near: 0.1,
            far: 1000.0,
            fov_degrees: 80.0,
            position: Vector3::zeros(),
            forward: Vector3::z(),
            up: Vector3::y(),
        }
    }
}

impl CameraSettings {
    /// 检查所有参数，返回第一个发现的问题
    pub fn validate(&self) -> Result<(), CameraError> {
        if self.width == 0 || self.height == 0 {
            return Err(CameraError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        // 使用取反比较，使 NaN 也被拒绝
        if !(self.near > 0.0 && self.near < self.far) {
            return Err(CameraError::InvalidClipPlanes {
                near: self.near,
                far: self.far,
            });
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(CameraError::InvalidFov {
                fov: self.fov_degrees,
            });
        }
        Ok(())
    }
}

/// 只平移不旋转的透视相机
///
/// 正交基在构造时确定并保持不变；视图矩阵随位置更新，投影矩阵只在构造时计算一次。
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vector3<f32>,
    forward: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    near: f32,
    far: f32,
    fov_degrees: f32,
    width: usize,
    height: usize,
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl Camera {
    pub fn new(settings: CameraSettings) -> Result<Self, CameraError> {
        settings.validate()?;

        let (forward, up, right) = Self::orthonormal_basis(&settings.forward, &settings.up)?;
        let aspect_ratio = settings.width as f32 / settings.height as f32;
        let projection_matrix = TransformFactory::perspective(
            aspect_ratio,
            settings.fov_degrees.to_radians(),
            settings.near,
            settings.far,
        );

        let mut camera = Self {
            position: settings.position,
            forward,
            up,
            right,
            near: settings.near,
            far: settings.far,
            fov_degrees: settings.fov_degrees,
            width: settings.width,
            height: settings.height,
            view_matrix: Mat4::identity(),
            projection_matrix,
        };
        camera.update_view_matrix();
        Ok(camera)
    }

    /// Gram-Schmidt 正交化：forward 归一化，up 去掉 forward 分量，right = up × forward
    fn orthonormal_basis(
        forward: &Vector3<f32>,
        up: &Vector3<f32>,
    ) -> Result<(Vector3<f32>, Vector3<f32>, Vector3<f32>), CameraError> {
        let forward = normalize_or_zero(forward);
        if forward == Vector3::zeros() {
            return Err(CameraError::DegenerateBasis);
        }

        let up = normalize_or_zero(&(up - forward * up.dot(&forward)));
        if up == Vector3::zeros() {
            return Err(CameraError::DegenerateBasis);
        }

        let right = up.cross(&forward);
        // 非有限输入会穿过上面的零向量检查
        if !is_orthonormal_basis(&forward, &up, &right) {
            return Err(CameraError::DegenerateBasis);
        }
        Ok((forward, up, right))
    }

    fn update_view_matrix(&mut self) {
        self.view_matrix =
            TransformFactory::view(&self.position, &self.right, &self.up, &self.forward);
    }

    /// 只修改位置，基向量保持不变
    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.update_view_matrix();
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.forward
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// 视图矩阵（世界坐标 -> 相机坐标）
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    /// 投影矩阵（相机坐标 -> 透视除法前的裁剪坐标）
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// 相机世界变换（相机坐标 -> 世界坐标）
    pub fn world_matrix(&self) -> Mat4 {
        TransformFactory::camera_world(&self.position, &self.right, &self.up, &self.forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn scenario_camera() -> Camera {
        Camera::new(CameraSettings::default()).unwrap()
    }

    fn project(camera: &Camera, p: Vector3<f32>) -> (Vector3<f32>, f32) {
        let view = camera.view_matrix().transform_point(&p).point;
        let clip = camera.projection_matrix().transform_point(&view);
        (clip.point, clip.w)
    }

    #[test]
    fn rejects_invalid_configuration() {
        let bad_planes = CameraSettings {
            near: 10.0,
            far: 10.0,
            ..Default::default()
        };
        assert!(matches!(
            Camera::new(bad_planes),
            Err(CameraError::InvalidClipPlanes { .. })
        ));

        let bad_fov = CameraSettings {
            fov_degrees: 0.0,
            ..Default::default()
        };
        assert_eq!(
            Camera::new(bad_fov).unwrap_err(),
            CameraError::InvalidFov { fov: 0.0 }
        );

        let wide_fov = CameraSettings {
            fov_degrees: 180.0,
            ..Default::default()
        };
        assert!(Camera::new(wide_fov).is_err());

        let zero_width = CameraSettings {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            Camera::new(zero_width),
            Err(CameraError::InvalidViewport { .. })
        ));

        let negative_near = CameraSettings {
            near: -0.1,
            ..Default::default()
        };
        assert!(Camera::new(negative_near).is_err());
    }

    #[test]
    fn rejects_parallel_basis() {
        let settings = CameraSettings {
            forward: Vector3::y(),
            up: Vector3::new(0.0, 2.0, 0.0),
            ..Default::default()
        };
        assert_eq!(
            Camera::new(settings).unwrap_err(),
            CameraError::DegenerateBasis
        );

        let non_finite = CameraSettings {
            forward: Vector3::new(f32::NAN, 0.0, 1.0),
            ..Default::default()
        };
        assert_eq!(
            Camera::new(non_finite).unwrap_err(),
            CameraError::DegenerateBasis
        );
    }

    #[test]
    fn basis_is_orthonormalized() {
        let camera = Camera::new(CameraSettings {
            forward: Vector3::new(0.0, 0.0, 2.0),
            up: Vector3::new(0.0, 1.0, 0.5),
            ..Default::default()
        })
        .unwrap();

        assert!(is_orthonormal_basis(
            &camera.right(),
            &camera.up(),
            &camera.forward()
        ));
        assert_abs_diff_eq!(camera.forward(), Vector3::z(), epsilon = 1e-6);
        assert_abs_diff_eq!(camera.up(), Vector3::y(), epsilon = 1e-6);
        assert_abs_diff_eq!(camera.right(), Vector3::x(), epsilon = 1e-6);
    }

    #[test]
    fn set_position_keeps_basis_and_refreshes_view() {
        let mut camera = scenario_camera();
        let basis = (camera.forward(), camera.up(), camera.right());

        camera.set_position(Vector3::new(0.0, 0.0, -2.0));
        assert_eq!((camera.forward(), camera.up(), camera.right()), basis);
        assert_eq!(camera.position(), Vector3::new(0.0, 0.0, -2.0));

        let view_origin = camera.view_matrix().transform_point(&Vector3::zeros()).point;
        assert_abs_diff_eq!(view_origin, Vector3::new(0.0, 0.0, 2.0), epsilon = 1e-6);
        assert!(
            camera
                .view_matrix()
                .approx_eq(&camera.world_matrix().inverse().unwrap(), 1e-6)
        );

        camera.set_position(camera.position() + Vector3::new(0.0, 0.0, 0.5));
        assert_eq!(camera.position(), Vector3::new(0.0, 0.0, -1.5));
    }

    #[test]
    fn point_on_forward_axis_projects_to_center() {
        let camera = scenario_camera();
        for d in [0.5_f32, 5.0, 100.0, 999.0] {
            let (ndc, w) = project(&camera, Vector3::new(0.0, 0.0, d));
            assert!(w > 0.0);
            assert!(ndc.iter().all(|c| c.is_finite()));
            assert_abs_diff_eq!(ndc.x, 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(ndc.y, 0.0, epsilon = 1e-6);
            assert!((0.0..=1.0).contains(&ndc.z), "depth {} at d={}", ndc.z, d);
        }
    }

    #[test]
    fn point_inside_fov_cone_stays_in_ndc_range() {
        let camera = scenario_camera();
        let (ndc, _) = project(&camera, Vector3::new(1.0, -1.0, 5.0));
        assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
        assert!(ndc.x > 0.0 && ndc.y < 0.0);
    }

    #[test]
    fn point_behind_camera_has_negative_w() {
        let camera = scenario_camera();
        let (_, w) = project(&camera, Vector3::new(0.0, 0.0, -5.0));
        assert!(w < 0.0);
    }

    #[test]
    fn accessors_report_configuration() {
        let camera = scenario_camera();
        assert_eq!(camera.width(), 1280);
        assert_eq!(camera.height(), 720);
        assert_eq!(camera.near(), 0.1);
        assert_eq!(camera.far(), 1000.0);
        assert_eq!(camera.fov_degrees(), 80.0);
        assert_abs_diff_eq!(camera.aspect_ratio(), 16.0 / 9.0, epsilon = 1e-6);
    }
}
