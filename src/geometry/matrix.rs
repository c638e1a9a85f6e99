//! # 4x4 变换矩阵
//!
//! 采用行向量约定：点写作行向量 `(x, y, z, 1)` 左乘矩阵，平移分量位于第 3 行。
//! 因此 `a * b` 表示先应用 `a` 再应用 `b`。与 nalgebra（列向量约定）互转时需要转置。

use nalgebra::{Matrix4, Vector3};
use std::ops::{Add, Index, Mul, Sub};
use thiserror::Error;

/// 相对主元阈值：主元绝对值低于 `PIVOT_EPSILON × 该列原始最大绝对值` 时视为奇异矩阵
pub const PIVOT_EPSILON: f32 = 1e-6;

/// 矩阵构造与求逆错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("矩阵不可逆：第 {column} 列找不到非零主元")]
    Singular { column: usize },
    #[error("矩阵初始化数据必须为 4x4，实际为 {rows} 行，首个异常行有 {columns} 列")]
    Malformed { rows: usize, columns: usize },
}

/// 齐次变换结果：`point` 已按 `w` 做过透视除法（`w == 0` 时保持原值）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformedPoint {
    pub point: Vector3<f32>,
    pub w: f32,
}

/// 固定尺寸的 4x4 浮点矩阵，默认值为单位矩阵
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    #[allow(clippy::too_many_arguments)]
    #[rustfmt::skip]
    pub const fn new(
        m00: f32, m01: f32, m02: f32, m03: f32,
        m10: f32, m11: f32, m12: f32, m13: f32,
        m20: f32, m21: f32, m22: f32, m23: f32,
        m30: f32, m31: f32, m32: f32, m33: f32,
    ) -> Self {
        Self {
            m: [
                [m00, m01, m02, m03],
                [m10, m11, m12, m13],
                [m20, m21, m22, m23],
                [m30, m31, m32, m33],
            ],
        }
    }

    pub const fn identity() -> Self {
        Self::from_array([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub const fn from_array(m: [[f32; 4]; 4]) -> Self {
        Self { m }
    }

    /// 从动态行数据构造矩阵，尺寸不是 4x4 时返回错误而不是部分填充的矩阵
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, MatrixError> {
        if rows.len() != 4 {
            let columns = rows.first().map_or(0, Vec::len);
            return Err(MatrixError::Malformed {
                rows: rows.len(),
                columns,
            });
        }
        if let Some(bad_row) = rows.iter().find(|row| row.len() != 4) {
            return Err(MatrixError::Malformed {
                rows: rows.len(),
                columns: bad_row.len(),
            });
        }

        let mut m = [[0.0; 4]; 4];
        for (target, source) in m.iter_mut().zip(rows) {
            target.copy_from_slice(source);
        }
        Ok(Self { m })
    }

    pub fn rows(&self) -> &[[f32; 4]; 4] {
        &self.m
    }

    pub fn transpose(&self) -> Self {
        let mut result = Self::identity();
        for i in 0..4 {
            for j in 0..4 {
                result.m[i][j] = self.m[j][i];
            }
        }
        result
    }

    /// 使用带部分主元选取的 Gauss-Jordan 消元求逆
    ///
    /// 对每一列，从当前行往下选绝对值最大的元素作为主元并交换到对角线上，
    /// 工作矩阵与单位矩阵累加器同步做行交换和消元；最后按对角元归一化每一行，
    /// 累加器即为逆矩阵。整列都为零时返回 [`MatrixError::Singular`]。
    ///
    /// 阈值按列相对于原始矩阵的量级计算，整体很小但满秩的矩阵也能求逆。
    pub fn inverse(&self) -> Result<Self, MatrixError> {
        let mut work = self.m;
        let mut inv = Self::identity().m;

        let mut column_scale = [0.0f32; 4];
        for row in &self.m {
            for (scale, value) in column_scale.iter_mut().zip(row) {
                *scale = scale.max(value.abs());
            }
        }

        for i in 0..4 {
            let mut best = i;
            for j in (i + 1)..4 {
                if work[j][i].abs() > work[best][i].abs() {
                    best = j;
                }
            }

            let pivot = work[best][i].abs();
            if pivot == 0.0 || pivot < PIVOT_EPSILON * column_scale[i] {
                return Err(MatrixError::Singular { column: i });
            }

            if best != i {
                work.swap(i, best);
                inv.swap(i, best);
            }

            for j in 0..4 {
                if j == i {
                    continue;
                }
                let q = work[j][i] / work[i][i];
                if q == 0.0 {
                    continue;
                }
                for k in 0..4 {
                    work[j][k] -= q * work[i][k];
                    inv[j][k] -= q * inv[i][k];
                }
            }
        }

        for i in 0..4 {
            let pivot = work[i][i];
            for k in 0..4 {
                inv[i][k] /= pivot;
            }
        }

        Ok(Self { m: inv })
    }

    /// 齐次点变换（行向量 × 矩阵），`w != 0` 时执行透视除法
    pub fn transform_point(&self, v: &Vector3<f32>) -> TransformedPoint {
        let m = &self.m;
        let mut point = Vector3::new(
            v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + m[3][0],
            v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + m[3][1],
            v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + m[3][2],
        );
        let w = v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + m[3][3];

        if w != 0.0 {
            point /= w;
        }

        TransformedPoint { point, w }
    }

    /// `result = self × other`，写入调用方提供的矩阵
    pub fn mul_into(&self, other: &Mat4, result: &mut Mat4) {
        for i in 0..4 {
            for j in 0..4 {
                result.m[i][j] = self.m[i][0] * other.m[0][j]
                    + self.m[i][1] * other.m[1][j]
                    + self.m[i][2] * other.m[2][j]
                    + self.m[i][3] * other.m[3][j];
            }
        }
    }

    /// 逐元素比较，所有差值都不超过 `epsilon` 时返回 true
    pub fn approx_eq(&self, other: &Mat4, epsilon: f32) -> bool {
        self.m
            .iter()
            .flatten()
            .zip(other.m.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    fn zip_with(&self, other: &Mat4, f: impl Fn(f32, f32) -> f32) -> Mat4 {
        let mut result = *self;
        for i in 0..4 {
            for j in 0..4 {
                result.m[i][j] = f(self.m[i][j], other.m[i][j]);
            }
        }
        result
    }
}

impl Index<(usize, usize)> for Mat4 {
    type Output = f32;

    fn index(&self, (row, column): (usize, usize)) -> &f32 {
        &self.m[row][column]
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut result = Mat4::identity();
        self.mul_into(&rhs, &mut result);
        result
    }
}

impl Add for Mat4 {
    type Output = Mat4;

    fn add(self, rhs: Mat4) -> Mat4 {
        self.zip_with(&rhs, |a, b| a + b)
    }
}

impl Sub for Mat4 {
    type Output = Mat4;

    fn sub(self, rhs: Mat4) -> Mat4 {
        self.zip_with(&rhs, |a, b| a - b)
    }
}

/// 行向量矩阵转为 nalgebra 列向量矩阵（转置）
impl From<Mat4> for Matrix4<f32> {
    fn from(mat: Mat4) -> Self {
        Matrix4::from_fn(|row, column| mat.m[column][row])
    }
}

impl From<Matrix4<f32>> for Mat4 {
    fn from(mat: Matrix4<f32>) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                *value = mat[(j, i)];
            }
        }
        Self { m }
    }
}
