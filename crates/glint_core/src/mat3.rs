//! 3x3 matrices for 2D affine transforms
//!
//! Matrices are stored column-major, matching the layout shader uniforms expect:
//!
//! ```text
//! | m0  m3  m6 |
//! | m1  m4  m7 |
//! | m2  m5  m8 |
//! ```
//!
//! For affine transforms the bottom row is `[0, 0, 1]` and `(m6, m7)` holds the
//! translation. All arithmetic is done in `f32` so results are reproducible
//! bit-for-bit across platforms.

use std::fmt;
use std::ops::{Index, Mul};

use crate::error::{MathError, Result};

/// Column-major 3x3 matrix
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mat3 {
    pub m: [f32; 9],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    pub const ZERO: Mat3 = Mat3 { m: [0.0; 9] };

    pub const fn from_cols_array(m: [f32; 9]) -> Self {
        Self { m }
    }

    pub const fn to_cols_array(&self) -> [f32; 9] {
        self.m
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.m
    }

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self {
            m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, tx, ty, 1.0],
        }
    }

    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self {
            m: [sx, 0.0, 0.0, 0.0, sy, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Counter-clockwise rotation by `radians`.
    ///
    /// Sine and cosine are evaluated in double precision and rounded once.
    pub fn rotation(radians: f32) -> Self {
        let r = radians as f64;
        let s = r.sin() as f32;
        let c = r.cos() as f32;
        Self {
            m: [c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Matrix product `a * b`: the result applies `b` first, then `a`.
    pub fn multiply_two(a: &Mat3, b: &Mat3) -> Mat3 {
        let a = &a.m;
        let b = &b.m;
        let mut res = [0.0f32; 9];

        res[0] = a[0] * b[0] + a[3] * b[1] + a[6] * b[2];
        res[3] = a[0] * b[3] + a[3] * b[4] + a[6] * b[5];
        res[6] = a[0] * b[6] + a[3] * b[7] + a[6] * b[8];

        res[1] = a[1] * b[0] + a[4] * b[1] + a[7] * b[2];
        res[4] = a[1] * b[3] + a[4] * b[4] + a[7] * b[5];
        res[7] = a[1] * b[6] + a[4] * b[7] + a[7] * b[8];

        res[2] = a[2] * b[0] + a[5] * b[1] + a[8] * b[2];
        res[5] = a[2] * b[3] + a[5] * b[4] + a[8] * b[5];
        res[8] = a[2] * b[6] + a[5] * b[7] + a[8] * b[8];

        Mat3 { m: res }
    }

    /// Left-to-right product of two or more matrices.
    ///
    /// `multiply(&[a, b, c])` is `(a * b) * c`, so `c` is applied to points first.
    pub fn multiply(matrices: &[Mat3]) -> Result<Mat3> {
        match matrices {
            [first, second, rest @ ..] => Ok(rest
                .iter()
                .fold(Self::multiply_two(first, second), |acc, m| {
                    Self::multiply_two(&acc, m)
                })),
            _ => Err(MathError::InvalidArgument(format!(
                "matrix multiply needs two or more matrices, got {}",
                matrices.len()
            ))),
        }
    }

    /// Apply the transform to the point `(x, y)`.
    pub fn transform_point(&self, x: f32, y: f32) -> [f32; 2] {
        let m = &self.m;
        [m[0] * x + m[3] * y + m[6], m[1] * x + m[4] * y + m[7]]
    }

    pub fn transpose(&self) -> Mat3 {
        let a = &self.m;
        Mat3 {
            m: [a[0], a[3], a[6], a[1], a[4], a[7], a[2], a[5], a[8]],
        }
    }

    pub fn determinant(&self) -> f32 {
        let a = &self.m;
        a[0] * a[4] * a[8] + a[1] * a[5] * a[6] + a[2] * a[3] * a[7]
            - a[0] * a[5] * a[7]
            - a[2] * a[4] * a[6]
            - a[1] * a[3] * a[8]
    }

    /// Inverse via the adjugate divided by the determinant.
    ///
    /// Fails with [`MathError::SingularMatrix`] only when the determinant is
    /// exactly zero; nearly singular input yields large but finite entries.
    pub fn invert(&self) -> Result<Mat3> {
        let d = self.determinant();
        if d == 0.0 {
            return Err(MathError::SingularMatrix);
        }

        let s = 1.0 / d;
        let a = &self.m;
        let mut res = [0.0f32; 9];

        res[0] = s * (a[4] * a[8] - a[7] * a[5]);
        res[3] = s * (a[6] * a[5] - a[3] * a[8]);
        res[6] = s * (a[3] * a[7] - a[6] * a[4]);

        res[1] = s * (a[7] * a[2] - a[1] * a[8]);
        res[4] = s * (a[0] * a[8] - a[6] * a[2]);
        res[7] = s * (a[6] * a[1] - a[0] * a[7]);

        res[2] = s * (a[1] * a[5] - a[4] * a[2]);
        res[5] = s * (a[3] * a[2] - a[0] * a[5]);
        res[8] = s * (a[0] * a[4] - a[3] * a[1]);

        Ok(Mat3 { m: res })
    }

    /// Element-wise comparison with an absolute tolerance
    pub fn approx_eq(&self, other: &Mat3, epsilon: f32) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        Mat3::multiply_two(&self, &rhs)
    }
}

impl Index<usize> for Mat3 {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.m[index]
    }
}

impl From<[f32; 9]> for Mat3 {
    fn from(m: [f32; 9]) -> Self {
        Self { m }
    }
}

/// Prints the matrix as three rows, one per line.
impl fmt::Display for Mat3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.m;
        writeln!(f, "[{}, {}, {}]", m[0], m[3], m[6])?;
        writeln!(f, "[{}, {}, {}]", m[1], m[4], m[7])?;
        writeln!(f, "[{}, {}, {}]", m[2], m[5], m[8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn sample() -> Mat3 {
        Mat3::multiply(&[
            Mat3::translation(12.5, -3.0),
            Mat3::rotation(0.7),
            Mat3::scale(2.0, 0.5),
        ])
        .unwrap()
    }

    #[test]
    fn test_identity_law() {
        let m = sample();
        assert!(Mat3::multiply_two(&Mat3::identity(), &m).approx_eq(&m, EPS));
        assert!(Mat3::multiply_two(&m, &Mat3::identity()).approx_eq(&m, EPS));
        assert_eq!(Mat3::default(), Mat3::IDENTITY);
    }

    #[test]
    fn test_translation_moves_origin() {
        assert_eq!(Mat3::translation(5.0, 7.0).transform_point(0.0, 0.0), [5.0, 7.0]);
        assert_eq!(Mat3::translation(5.0, 7.0).transform_point(1.0, -1.0), [6.0, 6.0]);
    }

    #[test]
    fn test_scale_and_determinant() {
        let s = Mat3::scale(3.0, -4.0);
        assert_eq!(s.transform_point(2.0, 2.0), [6.0, -8.0]);
        assert_eq!(s.determinant(), -12.0);
        assert_eq!(Mat3::identity().determinant(), 1.0);
    }

    #[test]
    fn test_rotation_is_counter_clockwise() {
        let r = Mat3::rotation(std::f32::consts::FRAC_PI_2);
        let [x, y] = r.transform_point(1.0, 0.0);
        assert!(x.abs() < EPS);
        assert!((y - 1.0).abs() < EPS);

        assert!((r.determinant() - 1.0).abs() < EPS);
        assert_eq!(Mat3::rotation(0.0), Mat3::IDENTITY);
    }

    #[test]
    fn test_multiply_order() {
        // Scale first, then translate
        let m = Mat3::translation(10.0, 0.0) * Mat3::scale(2.0, 2.0);
        assert_eq!(m.transform_point(1.0, 1.0), [12.0, 2.0]);

        // Translate first, then scale
        let m = Mat3::scale(2.0, 2.0) * Mat3::translation(10.0, 0.0);
        assert_eq!(m.transform_point(1.0, 1.0), [22.0, 2.0]);
    }

    #[test]
    fn test_multiply_folds_left() {
        let a = Mat3::translation(1.0, 2.0);
        let b = Mat3::rotation(0.3);
        let c = Mat3::scale(4.0, 5.0);

        let folded = Mat3::multiply(&[a, b, c]).unwrap();
        assert_eq!(folded, (a * b) * c);
        assert_eq!(Mat3::multiply(&[a, b]).unwrap(), a * b);
    }

    #[test]
    fn test_multiply_needs_two_matrices() {
        assert!(matches!(
            Mat3::multiply(&[]),
            Err(MathError::InvalidArgument(_))
        ));
        assert!(matches!(
            Mat3::multiply(&[Mat3::IDENTITY]),
            Err(MathError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_transpose_twice_is_exact() {
        let m = sample();
        assert_eq!(m.transpose().transpose(), m);

        let t = Mat3::translation(3.0, 4.0).transpose();
        assert_eq!(t.m, [1.0, 0.0, 3.0, 0.0, 1.0, 4.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_invert_round_trip() {
        let m = sample();
        let inv = m.invert().unwrap();

        assert!((m * inv).approx_eq(&Mat3::IDENTITY, 1e-4));
        assert!(inv.invert().unwrap().approx_eq(&m, 1e-4));
    }

    #[test]
    fn test_invert_undoes_translation() {
        let inv = Mat3::translation(5.0, 7.0).invert().unwrap();
        assert_eq!(inv.transform_point(5.0, 7.0), [0.0, 0.0]);
    }

    #[test]
    fn test_invert_singular() {
        assert_eq!(Mat3::ZERO.invert(), Err(MathError::SingularMatrix));
        assert_eq!(
            Mat3::scale(0.0, 1.0).invert(),
            Err(MathError::SingularMatrix)
        );
    }

    #[test]
    fn test_display() {
        let m = Mat3::translation(5.0, 7.5);
        assert_eq!(m.to_string(), "[1, 0, 5]\n[0, 1, 7.5]\n[0, 0, 1]\n");
    }

    #[test]
    fn test_pod_layout() {
        let m = Mat3::scale(2.0, 3.0);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&m));
        assert_eq!(floats, m.as_slice());
        assert_eq!(std::mem::size_of::<Mat3>(), 36);
        assert_eq!(m[4], 3.0);
    }
}
