use nalgebra::Vector3;

/// 低于该长度的向量视为零向量
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// 归一化向量；长度接近零时返回零向量而不是除以零
pub fn normalize_or_zero(v: &Vector3<f32>) -> Vector3<f32> {
    v.try_normalize(NORMALIZE_EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// 判断三个向量是否构成右手或左手的正交归一基
pub fn is_orthonormal_basis(a: &Vector3<f32>, b: &Vector3<f32>, c: &Vector3<f32>) -> bool {
    const TOLERANCE: f32 = 1e-4;
    let unit = |v: &Vector3<f32>| (v.norm() - 1.0).abs() < TOLERANCE;
    unit(a)
        && unit(b)
        && unit(c)
        && a.dot(b).abs() < TOLERANCE
        && b.dot(c).abs() < TOLERANCE
        && c.dot(a).abs() < TOLERANCE
}
