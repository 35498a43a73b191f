//! Quaternion helpers and the 3x4 joint matrix used by the pose pipeline

use glam::{Affine3A, Mat3A, Quat, Vec3, Vec3A, Vec4};
use std::ops::Mul;

#[cfg(feature = "serde-support")]
use serde::Serialize;

/// Reconstruct the quaternion w component from the stored x, y, z.
///
/// MD5 files store only the vector part of each unit quaternion. The scalar
/// part is always taken from the negative root, so a stored (0, 0, 0)
/// becomes (0, 0, 0, -1) rather than the identity.
pub fn compute_quat_w(x: f32, y: f32, z: f32) -> f32 {
    let t = 1.0 - (x * x + y * y + z * z);
    -t.abs().sqrt()
}

/// Build a quaternion from its stored vector part
pub fn quat_from_xyz(v: Vec3) -> Quat {
    Quat::from_xyzw(v.x, v.y, v.z, compute_quat_w(v.x, v.y, v.z))
}

/// Normalized linear interpolation between two quaternions.
///
/// The target is never negated. Instead the blend weight for `to` takes the
/// sign of the dot product so the shorter arc is followed. If the blend
/// collapses to zero length the source rotation is returned unchanged.
pub fn nlerp(from: Quat, to: Quat, alpha: f32) -> Quat {
    let a = Vec4::from(from);
    let b = Vec4::from(to);

    let cosom = a.dot(b);
    let scale0 = 1.0 - alpha;
    let scale1 = if cosom > 0.0 { alpha } else { -alpha };

    let blended = a * scale0 + b * scale1;
    let len = blended.length();
    if len == 0.0 || !len.is_finite() {
        return from;
    }

    Quat::from_vec4(blended / len)
}

/// Row-major 3x4 affine transform: rotation in the left 3x3, translation in
/// the fourth column.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize))]
pub struct JointMatrix {
    pub rows: [[f32; 4]; 3],
}

impl JointMatrix {
    pub const IDENTITY: Self = Self {
        rows: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
        ],
    };

    /// Standard quaternion-to-matrix expansion with the translation in column 3
    pub fn from_rotation_translation(q: Quat, t: Vec3) -> Self {
        let xx = q.x * q.x;
        let xy = q.x * q.y;
        let xz = q.x * q.z;
        let xw = q.x * q.w;

        let yy = q.y * q.y;
        let yz = q.y * q.z;
        let yw = q.y * q.w;

        let zz = q.z * q.z;
        let zw = q.z * q.w;

        Self {
            rows: [
                [
                    1.0 - 2.0 * (yy + zz),
                    2.0 * (xy - zw),
                    2.0 * (xz + yw),
                    t.x,
                ],
                [
                    2.0 * (xy + zw),
                    1.0 - 2.0 * (xx + zz),
                    2.0 * (yz - xw),
                    t.y,
                ],
                [
                    2.0 * (xz - yw),
                    2.0 * (yz + xw),
                    1.0 - 2.0 * (xx + yy),
                    t.z,
                ],
            ],
        }
    }

    /// Compose two transforms; the result applies `rhs` first, then `self`
    #[allow(clippy::should_implement_trait)]
    pub fn mul(&self, rhs: &Self) -> Self {
        let a = &self.rows;
        let b = &rhs.rows;
        let mut rows = [[0.0; 4]; 3];

        for (r, row) in rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().take(3).enumerate() {
                *value = a[r][0] * b[0][c] + a[r][1] * b[1][c] + a[r][2] * b[2][c];
            }
            row[3] = a[r][0] * b[0][3] + a[r][1] * b[1][3] + a[r][2] * b[2][3] + a[r][3];
        }

        Self { rows }
    }

    /// Rotate and translate a point
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.rows;
        Vec3::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3],
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3],
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3],
        )
    }

    /// Rotate a direction, ignoring translation
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let m = &self.rows;
        Vec3::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.rows[0][3], self.rows[1][3], self.rows[2][3])
    }

    /// Basis column `i` (0 = x, 1 = y, 2 = z); any other index yields the translation
    pub fn axis(&self, i: usize) -> Vec3 {
        if i > 2 {
            return self.translation();
        }
        Vec3::new(self.rows[0][i], self.rows[1][i], self.rows[2][i])
    }

    /// Column-major 4x3 layout, ready for upload as a uniform array
    pub fn to_cols_array(&self) -> [f32; 12] {
        let m = &self.rows;
        [
            m[0][0], m[1][0], m[2][0], //
            m[0][1], m[1][1], m[2][1], //
            m[0][2], m[1][2], m[2][2], //
            m[0][3], m[1][3], m[2][3],
        ]
    }
}

impl Default for JointMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for JointMatrix {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::mul(&self, &rhs)
    }
}

impl From<JointMatrix> for Affine3A {
    fn from(m: JointMatrix) -> Self {
        Self {
            matrix3: Mat3A::from_cols(
                Vec3A::from(m.axis(0)),
                Vec3A::from(m.axis(1)),
                Vec3A::from(m.axis(2)),
            ),
            translation: Vec3A::from(m.translation()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_1_SQRT_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_quat_w_is_non_positive() {
        assert_eq!(compute_quat_w(0.0, 0.0, 0.0), -1.0);
        assert!(compute_quat_w(0.5, 0.5, 0.5) <= 0.0);
        // Slightly over-unit input still yields a finite value
        assert!(compute_quat_w(1.0, 0.1, 0.0).is_finite());
    }

    #[test]
    fn test_quat_from_zero_xyz() {
        let q = quat_from_xyz(Vec3::ZERO);
        assert_eq!(q, Quat::from_xyzw(0.0, 0.0, 0.0, -1.0));
    }

    #[test]
    fn test_quat_from_xyz_unit_length() {
        for v in [
            Vec3::new(0.1, 0.2, 0.3),
            Vec3::new(-0.5, 0.5, 0.0),
            Vec3::new(0.0, 0.0, FRAC_1_SQRT_2),
        ] {
            let q = quat_from_xyz(v);
            assert!((q.length() - 1.0).abs() < 1e-5);
            assert!(q.w <= 0.0);
        }
    }

    #[test]
    fn test_nlerp_endpoints() {
        let a = quat_from_xyz(Vec3::new(0.0, 0.0, 0.0));
        let b = quat_from_xyz(Vec3::new(0.0, 0.0, FRAC_1_SQRT_2));

        let start = nlerp(a, b, 0.0);
        assert!((Vec4::from(start) - Vec4::from(a)).length() < 1e-6);

        let end = nlerp(a, b, 1.0);
        assert!((Vec4::from(end) - Vec4::from(b)).length() < 1e-6);
    }

    #[test]
    fn test_nlerp_takes_short_path() {
        let a = Quat::from_xyzw(0.0, 0.0, 0.0, -1.0);
        // Same rotation as `a` with the opposite sign
        let b = Quat::from_xyzw(0.0, 0.0, 0.0, 1.0);
        let mid = nlerp(a, b, 0.5);
        assert!((Vec4::from(mid) - Vec4::from(a)).length() < 1e-6);
    }

    #[test]
    fn test_nlerp_zero_length_returns_from() {
        let a = Quat::from_xyzw(0.0, 0.0, 0.0, 1.0);
        let zero = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        assert_eq!(nlerp(a, zero, 1.0), a);
    }

    #[test]
    fn test_nlerp_orthogonal_is_unit() {
        let a = Quat::from_xyzw(0.0, 0.0, 0.0, 1.0);
        let b = Quat::from_xyzw(1.0, 0.0, 0.0, 0.0);
        let mid = nlerp(a, b, 0.5);
        assert!((mid.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_identity_rotation_from_negative_w() {
        let m = JointMatrix::from_rotation_translation(
            Quat::from_xyzw(0.0, 0.0, 0.0, -1.0),
            Vec3::new(1.0, 2.0, 3.0),
        );
        assert!(approx(m.axis(0), Vec3::X));
        assert!(approx(m.axis(1), Vec3::Y));
        assert!(approx(m.axis(2), Vec3::Z));
        assert_eq!(m.translation(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_matches_glam_rotation() {
        let q = quat_from_xyz(Vec3::new(0.2, -0.3, 0.4));
        let m = JointMatrix::from_rotation_translation(q, Vec3::ZERO);
        let v = Vec3::new(0.3, 1.0, -2.0);
        assert!(approx(m.transform_vector(v), q * v));
    }

    #[test]
    fn test_mul_applies_rhs_first() {
        let parent = JointMatrix::from_rotation_translation(
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::new(0.0, 0.0, 1.0),
        );
        let child = JointMatrix::from_rotation_translation(Quat::IDENTITY, Vec3::X);
        let global = parent * child;

        // Child offset (1,0,0) rotated by 90 degrees lands on +Y, then lifted
        assert!(approx(global.translation(), Vec3::new(0.0, 1.0, 1.0)));
        assert!(approx(global.transform_point(Vec3::ZERO), global.translation()));
    }

    #[test]
    fn test_mul_identity() {
        let m = JointMatrix::from_rotation_translation(
            quat_from_xyz(Vec3::new(0.1, 0.2, 0.3)),
            Vec3::new(4.0, 5.0, 6.0),
        );
        let left = JointMatrix::IDENTITY * m;
        for r in 0..3 {
            for c in 0..4 {
                assert!((left.rows[r][c] - m.rows[r][c]).abs() < 1e-7);
            }
        }
    }

    #[test]
    fn test_affine_conversion_agrees() {
        let m = JointMatrix::from_rotation_translation(
            quat_from_xyz(Vec3::new(0.3, 0.0, -0.1)),
            Vec3::new(-1.0, 0.5, 2.0),
        );
        let affine = Affine3A::from(m);
        let p = Vec3::new(1.0, -2.0, 0.25);
        assert!(approx(affine.transform_point3(p), m.transform_point(p)));
    }

    #[test]
    fn test_cols_array_layout() {
        let m = JointMatrix::from_rotation_translation(Quat::IDENTITY, Vec3::new(7.0, 8.0, 9.0));
        let cols = m.to_cols_array();
        assert_eq!(&cols[9..], &[7.0, 8.0, 9.0]);
        assert_eq!(&cols[..3], &[1.0, 0.0, 0.0]);
    }
}
