//! Vector/quaternion aliases and conversions from flat rig arrays.
//!
//! Rig data carries quaternions as `[x, y, z, w]`; nalgebra stores them as
//! `(w, i, j, k)`. All conversions go through here.

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

pub type Vec3 = Vector3<f64>;
pub type Quat = UnitQuaternion<f64>;

/// Direction every bone points along in its own rest-aligned frame.
pub const CANONICAL_AXIS: [f64; 3] = [0.0, 1.0, 0.0];

/// Quaternions with a squared norm below this cannot be normalized.
const MIN_QUAT_NORM_SQUARED: f64 = 1e-12;

#[inline]
pub fn canonical_axis() -> Vec3 {
    Vec3::new(CANONICAL_AXIS[0], CANONICAL_AXIS[1], CANONICAL_AXIS[2])
}

/// Length encoding used before propagation: the canonical axis scaled by `length`.
#[inline]
pub fn length_vector(length: f64) -> Vec3 {
    canonical_axis() * length
}

#[inline]
pub fn vec3(v: [f64; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

/// Read three consecutive components starting at `start`.
#[inline]
pub fn vec3_at(values: &[f64], start: usize) -> Option<Vec3> {
    values
        .get(start..start + 3)
        .map(|s| Vec3::new(s[0], s[1], s[2]))
}

/// Build a unit quaternion from `[x, y, z, w]`, normalizing it.
/// Returns `None` for a zero (or non-finite) quaternion.
pub fn quat_from_xyzw(q: [f64; 4]) -> Option<Quat> {
    let raw = Quaternion::new(q[3], q[0], q[1], q[2]);
    let norm_squared = raw.norm_squared();
    if !norm_squared.is_finite() || norm_squared < MIN_QUAT_NORM_SQUARED {
        return None;
    }
    Some(UnitQuaternion::from_quaternion(raw))
}

/// Read a quaternion group `[x, y, z, w]` starting at `start`.
#[inline]
pub fn quat_at(values: &[f64], start: usize) -> Option<Option<Quat>> {
    values
        .get(start..start + 4)
        .map(|s| quat_from_xyzw([s[0], s[1], s[2], s[3]]))
}

/// Components as `[x, y, z, w]`.
#[inline]
pub fn quat_to_xyzw(q: &Quat) -> [f64; 4] {
    [q.i, q.j, q.k, q.w]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn xyzw_order_is_respected() {
        // 180 degrees about Z
        let q = quat_from_xyzw([0.0, 0.0, 1.0, 0.0]).unwrap();
        let v = q * canonical_axis();
        assert_relative_eq!(v, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
        assert_eq!(quat_to_xyzw(&q), [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn non_unit_input_is_normalized() {
        let q = quat_from_xyzw([0.0, 0.0, 0.0, 2.0]).unwrap();
        assert_relative_eq!(q.into_inner().norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_quaternion_is_rejected() {
        assert!(quat_from_xyzw([0.0; 4]).is_none());
        assert!(quat_from_xyzw([f64::NAN, 0.0, 0.0, 1.0]).is_none());
    }

    #[test]
    fn slices_are_bounds_checked() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(vec3_at(&values, 1), Some(Vec3::new(2.0, 3.0, 4.0)));
        assert_eq!(vec3_at(&values, 2), None);
        assert!(quat_at(&values, 1).is_none());
    }
}
