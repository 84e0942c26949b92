//! Rigid transform decomposition and blending.
//!
//! A local matrix is split into scale, shear, rotation and translation so
//! that two transform samples can be blended component-wise. Blending raw
//! matrix elements would shrink and skew intermediate poses.
//!
//! Matrices are column-major with column vectors (glam). In that form the
//! recomposed matrix is `T * R * H * S`, where `H` has columns
//! `(1,0,0)`, `(xy,1,0)`, `(xz,yz,1)`; in the row-vector form archives use
//! this is the familiar scale, shear, rotate, translate product.

use crate::util::{DMat3, DMat4, DQuat, DVec3};

/// Scale axes shorter than this are clamped before normalization.
pub const MIN_SCALE: f64 = 1e-10;

/// A 4x4 affine transform split into independent components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidDecomposition {
    pub scale: DVec3,
    /// Off-diagonal coefficients `(xy, xz, yz)`.
    pub shear: DVec3,
    /// Unit quaternion.
    pub rotation: DQuat,
    pub translation: DVec3,
}

impl Default for RigidDecomposition {
    fn default() -> Self {
        Self {
            scale: DVec3::ONE,
            shear: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            translation: DVec3::ZERO,
        }
    }
}

impl RigidDecomposition {
    /// Split an affine matrix. The projective row is ignored.
    ///
    /// [`recompose`](Self::recompose) returns the input to within `1e-9` per
    /// element. For singular matrices a collapsed axis keeps a scale of
    /// [`MIN_SCALE`] and its direction is rebuilt orthogonal to the surviving
    /// axes, so the rotation stays that of the non-degenerate part.
    pub fn decompose(m: &DMat4) -> Self {
        let translation = m.w_axis.truncate();

        let mut c0 = m.x_axis.truncate();
        let mut c1 = m.y_axis.truncate();
        let mut c2 = m.z_axis.truncate();

        // Gram-Schmidt, recording what gets removed. Collapsed axes are
        // zeroed so they remove nothing from the later ones.
        let mut scale = DVec3::ZERO;
        let mut valid = [true; 3];
        scale.x = c0.length().max(MIN_SCALE);
        (c0, valid[0]) = unit_or_zero(c0, scale.x);

        let mut xy = c0.dot(c1);
        c1 -= xy * c0;
        scale.y = c1.length().max(MIN_SCALE);
        (c1, valid[1]) = unit_or_zero(c1, scale.y);
        xy /= scale.y;

        let mut xz = c0.dot(c2);
        c2 -= xz * c0;
        let mut yz = c1.dot(c2);
        c2 -= yz * c1;
        scale.z = c2.length().max(MIN_SCALE);
        (c2, valid[2]) = unit_or_zero(c2, scale.z);
        xz /= scale.z;
        yz /= scale.z;

        let [mut c0, mut c1, mut c2] = complete_basis([c0, c1, c2], valid);

        // Mirrored basis: fold the reflection into the scale
        if c0.dot(c1.cross(c2)) < 0.0 {
            scale = -scale;
            c0 = -c0;
            c1 = -c1;
            c2 = -c2;
        }

        let q = DQuat::from_mat3(&DMat3::from_cols(c0, c1, c2));
        let rotation = if q.is_finite() && q.length_squared() > 0.0 {
            q.normalize()
        } else {
            DQuat::IDENTITY
        };

        Self {
            scale,
            shear: DVec3::new(xy, xz, yz),
            rotation,
            translation,
        }
    }

    /// Rebuild the matrix.
    pub fn recompose(&self) -> DMat4 {
        let shear = DMat3::from_cols(
            DVec3::X,
            DVec3::new(self.shear.x, 1.0, 0.0),
            DVec3::new(self.shear.y, self.shear.z, 1.0),
        );
        let basis = DMat3::from_quat(self.rotation) * shear * DMat3::from_diagonal(self.scale);
        DMat4::from_cols(
            basis.x_axis.extend(0.0),
            basis.y_axis.extend(0.0),
            basis.z_axis.extend(0.0),
            self.translation.extend(1.0),
        )
    }

    /// Blend towards `other` by `weight` (0 returns `self`).
    ///
    /// Scale, shear and translation are lerped; rotation is slerped along
    /// the shorter arc.
    pub fn interpolate(&self, other: &Self, weight: f64) -> Self {
        let end = shortest_arc(self.rotation, other.rotation);
        Self {
            scale: self.scale.lerp(other.scale, weight),
            shear: self.shear.lerp(other.shear, weight),
            rotation: self.rotation.slerp(end, weight).normalize(),
            translation: self.translation.lerp(other.translation, weight),
        }
    }
}

/// `v / len`, or zero with `false` when the length was clamped.
fn unit_or_zero(v: DVec3, len: f64) -> (DVec3, bool) {
    if len > MIN_SCALE {
        (v / len, true)
    } else {
        (DVec3::ZERO, false)
    }
}

/// Fill the collapsed columns of an orthonormal set so the result is a
/// right-handed orthonormal basis.
fn complete_basis(mut cols: [DVec3; 3], valid: [bool; 3]) -> [DVec3; 3] {
    let survivors = valid.iter().filter(|v| **v).count();
    match survivors {
        3 => {}
        2 => {
            if let Some(i) = valid.iter().position(|v| !v) {
                cols[i] = cols[(i + 1) % 3].cross(cols[(i + 2) % 3]);
            }
        }
        1 => {
            if let Some(k) = valid.iter().position(|v| *v) {
                let (i, j) = ((k + 1) % 3, (k + 2) % 3);
                cols[i] = cols[k].any_orthonormal_vector();
                cols[j] = cols[k].cross(cols[i]);
            }
        }
        _ => cols = [DVec3::X, DVec3::Y, DVec3::Z],
    }
    cols
}

/// `to`, negated when it lies on the far hemisphere from `from`.
///
/// `q` and `-q` describe the same rotation, but slerping towards the wrong
/// one travels the long way around.
#[inline]
pub fn shortest_arc(from: DQuat, to: DQuat) -> DQuat {
    if from.dot(to) < 0.0 {
        -to
    } else {
        to
    }
}

/// Decompose both matrices, blend, and recompose.
pub fn interpolate_matrices(a: &DMat4, b: &DMat4, weight: f64) -> DMat4 {
    let da = RigidDecomposition::decompose(a);
    let db = RigidDecomposition::decompose(b);
    da.interpolate(&db, weight).recompose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_mat_close(a: &DMat4, b: &DMat4, tol: f64) {
        let (a, b) = (a.to_cols_array(), b.to_cols_array());
        for i in 0..16 {
            assert!(
                (a[i] - b[i]).abs() <= tol,
                "element {i}: {} vs {}",
                a[i],
                b[i]
            );
        }
    }

    fn sheared(xy: f64, xz: f64, yz: f64) -> DMat4 {
        RigidDecomposition {
            shear: DVec3::new(xy, xz, yz),
            ..Default::default()
        }
        .recompose()
    }

    #[test]
    fn test_identity() {
        let d = RigidDecomposition::decompose(&DMat4::IDENTITY);
        assert_eq!(d.scale, DVec3::ONE);
        assert_eq!(d.shear, DVec3::ZERO);
        assert_eq!(d.translation, DVec3::ZERO);
        assert!(d.rotation.angle_between(DQuat::IDENTITY) < 1e-12);
    }

    #[test]
    fn test_components() {
        let rot = DQuat::from_rotation_y(0.7);
        let m = DMat4::from_scale_rotation_translation(
            DVec3::new(2.0, 3.0, 4.0),
            rot,
            DVec3::new(-1.0, 5.0, 9.0),
        );
        let d = RigidDecomposition::decompose(&m);
        assert!((d.scale - DVec3::new(2.0, 3.0, 4.0)).abs().max_element() < 1e-12);
        assert!(d.shear.abs().max_element() < 1e-12);
        assert!(d.rotation.angle_between(rot) < 1e-9);
        assert_eq!(d.translation, DVec3::new(-1.0, 5.0, 9.0));
    }

    #[test]
    fn test_round_trip_affine() {
        let matrices = [
            DMat4::IDENTITY,
            DMat4::from_translation(DVec3::new(10.0, -3.0, 0.25)),
            DMat4::from_rotation_z(2.9) * DMat4::from_scale(DVec3::new(0.5, 7.0, 1.0)),
            DMat4::from_translation(DVec3::splat(4.0))
                * DMat4::from_axis_angle(DVec3::new(1.0, 2.0, 3.0).normalize(), -1.3)
                * sheared(0.3, -0.2, 1.5)
                * DMat4::from_scale(DVec3::new(3.0, 0.1, 2.0)),
            // mirrored
            DMat4::from_rotation_x(0.4) * DMat4::from_scale(DVec3::new(-1.0, 2.0, 2.0)),
            DMat4::from_cols_array(&[
                1.0, 0.2, -0.4, 0.0,
                0.5, 2.0, 0.1, 0.0,
                -0.3, 0.7, 1.5, 0.0,
                6.0, 7.0, 8.0, 1.0,
            ]),
        ];
        for m in &matrices {
            let back = RigidDecomposition::decompose(m).recompose();
            assert_mat_close(m, &back, 1e-9);
        }
    }

    #[test]
    fn test_negative_determinant_folds_into_scale() {
        let m = DMat4::from_scale(DVec3::new(1.0, 1.0, -1.0));
        let d = RigidDecomposition::decompose(&m);
        assert!(d.scale.x < 0.0 && d.scale.y < 0.0 && d.scale.z < 0.0);
        assert_mat_close(&m, &d.recompose(), 1e-12);
    }

    #[test]
    fn test_degenerate_scale_stays_finite() {
        let m = DMat4::from_scale(DVec3::new(0.0, 1.0, 1.0));
        let d = RigidDecomposition::decompose(&m);
        assert!(d.scale.is_finite());
        assert!(d.shear.is_finite());
        assert!(d.rotation.is_finite());
        assert!(d.recompose().is_finite());

        let d = RigidDecomposition::decompose(&DMat4::ZERO);
        assert!(d.recompose().is_finite());
        assert_eq!(d.rotation, DQuat::IDENTITY);
    }

    #[test]
    fn test_singular_round_trip() {
        let rot = DMat4::from_rotation_z(0.5);
        let matrices = [
            // flattened along one axis
            DMat4::from_translation(DVec3::new(1.0, 2.0, 3.0))
                * rot
                * DMat4::from_scale(DVec3::new(0.0, 1.0, 1.0)),
            rot * DMat4::from_scale(DVec3::new(2.0, 0.0, 3.0)),
            rot * DMat4::from_scale(DVec3::new(2.0, 3.0, 0.0)),
            // collapsed onto a line
            rot * DMat4::from_scale(DVec3::new(0.0, 0.0, 2.0)),
            // second column parallel to the first
            DMat4::from_cols_array(&[
                1.0, 1.0, 0.0, 0.0,
                2.0, 2.0, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ]),
            DMat4::ZERO,
        ];
        for m in &matrices {
            let d = RigidDecomposition::decompose(m);
            assert!(d.scale.is_finite() && d.shear.is_finite());
            assert!((d.rotation.length() - 1.0).abs() < 1e-12);
            let mut affine = *m;
            affine.w_axis.w = 1.0;
            assert_mat_close(&affine, &d.recompose(), 1e-9);
        }

        // the surviving axes keep their orientation
        let d = RigidDecomposition::decompose(&matrices[0]);
        assert!(d.rotation.angle_between(DQuat::from_rotation_z(0.5)) < 1e-9);
        assert!((d.scale.x - MIN_SCALE).abs() < 1e-20);
    }

    #[test]
    fn test_interpolate_translation() {
        let a = DMat4::IDENTITY;
        let b = DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0));
        let m = interpolate_matrices(&a, &b, 0.5);
        assert_mat_close(&m, &DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0)), 1e-12);
    }

    #[test]
    fn test_interpolate_endpoints() {
        let a = DMat4::from_scale_rotation_translation(
            DVec3::new(1.0, 2.0, 3.0),
            DQuat::from_rotation_x(0.3),
            DVec3::X,
        );
        let b = DMat4::from_scale_rotation_translation(
            DVec3::splat(0.5),
            DQuat::from_rotation_z(-2.0),
            DVec3::new(0.0, 8.0, -2.0),
        );
        assert_mat_close(&interpolate_matrices(&a, &b, 0.0), &a, 1e-9);
        assert_mat_close(&interpolate_matrices(&a, &b, 1.0), &b, 1e-9);
    }

    #[test]
    fn test_interpolate_scale_is_not_matrix_lerp() {
        // Half of a 180 degree turn is a pure 90 degree turn, not a collapsed matrix
        let a = DMat4::IDENTITY;
        let b = DMat4::from_rotation_z(std::f64::consts::PI * 0.999);
        let d = RigidDecomposition::decompose(&interpolate_matrices(&a, &b, 0.5));
        assert!((d.scale - DVec3::ONE).abs().max_element() < 1e-9);
    }

    #[test]
    fn test_shortest_arc() {
        let a = DQuat::IDENTITY;
        let b = -DQuat::from_rotation_y(0.2);
        assert!(a.dot(b) < 0.0);
        let fixed = shortest_arc(a, b);
        assert!(a.dot(fixed) > 0.0);
        // same rotation either way
        assert!(fixed.angle_between(b) < 1e-12);
        assert_eq!(shortest_arc(a, fixed), fixed);
    }
}
