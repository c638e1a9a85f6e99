use crate::geometry::matrix::Mat4;
use crate::geometry::vector::NORMALIZE_EPSILON;
use nalgebra::{Unit, UnitQuaternion, Vector3};

/// 模型姿态使用的单位四元数
pub type Quaternion = UnitQuaternion<f32>;

/// 由旋转角（弧度）和旋转轴构造四元数，轴长度接近零时返回单位四元数
pub fn axis_angle(angle_rad: f32, axis: &Vector3<f32>) -> Quaternion {
    match Unit::try_new(*axis, NORMALIZE_EPSILON) {
        Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle_rad),
        None => UnitQuaternion::identity(),
    }
}

/// 组合两个旋转：`current * delta`，增量在模型局部坐标系中先于当前姿态施加。
///
/// 连续累乘会积累舍入误差，因此每次组合后都重新归一化。
pub fn compose(current: &Quaternion, delta: &Quaternion) -> Quaternion {
    let mut result = current * delta;
    result.renormalize();
    result
}

/// 纯函数形式的姿态更新：先绕 X 轴俯仰，再绕 Y 轴偏航
pub fn compose_pitch_yaw(current: &Quaternion, pitch_rad: f32, yaw_rad: f32) -> Quaternion {
    let pitched = compose(current, &axis_angle(pitch_rad, &Vector3::x()));
    compose(&pitched, &axis_angle(yaw_rad, &Vector3::y()))
}

/// 四元数转换为行向量约定的旋转矩阵
pub fn rotation_matrix(q: &Quaternion) -> Mat4 {
    Mat4::from(q.to_homogeneous())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f32::consts::{FRAC_PI_2, TAU};

    #[test]
    fn identity_composition_is_identity() {
        let result = compose(&Quaternion::identity(), &Quaternion::identity());
        assert_relative_eq!(result, Quaternion::identity());
    }

    #[test]
    fn rotation_with_inverse_is_identity() {
        let q = axis_angle(1.2, &Vector3::new(1.0, 2.0, -0.5));
        let result = compose(&q, &q.inverse());
        assert_relative_eq!(result, Quaternion::identity(), epsilon = 1e-6);
    }

    #[test]
    fn zero_axis_yields_identity() {
        assert_eq!(axis_angle(0.7, &Vector3::zeros()), Quaternion::identity());
    }

    #[test]
    fn delta_is_applied_in_local_frame() {
        let yawed = axis_angle(FRAC_PI_2, &Vector3::y());
        let pitch = axis_angle(FRAC_PI_2, &Vector3::x());
        let combined = rotation_matrix(&compose(&yawed, &pitch));

        // 先绕 X：y -> z，再绕 Y：z -> x
        let rotated = combined.transform_point(&Vector3::y()).point;
        assert_abs_diff_eq!(rotated, Vector3::x(), epsilon = 1e-6);
    }

    #[test]
    fn pitch_yaw_matches_sequential_composition() {
        let start = axis_angle(0.3, &Vector3::z());
        let expected = compose(
            &compose(&start, &axis_angle(0.1, &Vector3::x())),
            &axis_angle(-0.2, &Vector3::y()),
        );
        assert_relative_eq!(
            compose_pitch_yaw(&start, 0.1, -0.2),
            expected,
            epsilon = 1e-6
        );
    }

    #[test]
    fn full_turn_in_small_steps_returns_to_identity() {
        let steps = 720;
        let axis = Vector3::new(0.3, 1.0, 0.2);
        let step = axis_angle(TAU / steps as f32, &axis);

        let mut orientation = Quaternion::identity();
        for _ in 0..steps {
            orientation = compose(&orientation, &step);
        }

        assert!(orientation.angle() < 1e-3, "angle = {}", orientation.angle());
        assert!(rotation_matrix(&orientation).approx_eq(&Mat4::identity(), 1e-3));
    }

    #[test]
    fn repeated_composition_stays_unit_length() {
        let mut orientation = Quaternion::identity();
        for i in 0..10_000 {
            orientation = compose_pitch_yaw(&orientation, 0.001 * (i % 7) as f32, 0.0007);
        }
        assert_abs_diff_eq!(orientation.quaternion().norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn rotation_matrix_keeps_translation_row_clear() {
        let m = rotation_matrix(&axis_angle(0.5, &Vector3::y()));
        assert_eq!(m[(3, 0)], 0.0);
        assert_eq!(m[(3, 1)], 0.0);
        assert_eq!(m[(3, 2)], 0.0);
        assert_eq!(m[(3, 3)], 1.0);
        assert_eq!(m[(0, 3)], 0.0);
    }
}
