//! Vector/quaternion/matrix algebra used throughout the engine.
//!
//! Built on `nalgebra`'s types rather than hand-rolled ones, matching how the
//! rest of this codebase's physics lives on `nalgebra::Vector3`/`UnitQuaternion`.
//! The free functions below exist only where the engine's contract diverges
//! from `nalgebra`'s defaults (division by a zero scalar must yield a zero
//! vector, not `inf`/`NaN`).

use nalgebra::{Matrix3, UnitQuaternion, Vector3 as NaVector3};

pub type Vector3 = NaVector3<f64>;
pub type Quaternion = UnitQuaternion<f64>;
pub type Matrix3x3 = Matrix3<f64>;

/// Divide a vector by a scalar, returning the zero vector instead of
/// `inf`/`NaN` components when `scalar` is zero.
#[inline]
pub fn divide_scalar(v: Vector3, scalar: f64) -> Vector3 {
    if scalar == 0.0 {
        Vector3::zeros()
    } else {
        v / scalar
    }
}

#[inline]
pub fn multiply_scalar(v: Vector3, scalar: f64) -> Vector3 {
    v * scalar
}

#[inline]
pub fn magnitude(v: Vector3) -> f64 {
    v.norm()
}

#[inline]
pub fn dot(a: Vector3, b: Vector3) -> f64 {
    a.dot(&b)
}

/// Rotate `v` by `q` (body-to-world if `q` is the body orientation).
#[inline]
pub fn rotate_vector(q: &Quaternion, v: Vector3) -> Vector3 {
    q * v
}

#[inline]
pub fn is_unit_quaternion(q: &Quaternion, tolerance: f64) -> bool {
    (q.as_vector().norm() - 1.0).abs() <= tolerance
}

/// Matrix-vector product (row-dot), exposed as a free function so callers
/// reading `matrix_vector(m, v)` at a force-accumulation call site don't need
/// to know whether `m` is `nalgebra`'s row-major or column-major storage.
#[inline]
pub fn matrix_vector(m: &Matrix3x3, v: Vector3) -> Vector3 {
    m * v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divide_by_zero_scalar_returns_zero_vector() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(divide_scalar(v, 0.0), Vector3::zeros());
    }

    #[test]
    fn divide_by_nonzero_scalar() {
        let v = Vector3::new(2.0, 4.0, 6.0);
        assert_eq!(divide_scalar(v, 2.0), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn identity_quaternion_is_unit() {
        let q = Quaternion::identity();
        assert!(is_unit_quaternion(&q, 1e-9));
    }
}
