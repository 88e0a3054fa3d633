// Copyright 2025 the Diorama Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small vector and matrix helpers on top of `glam`.

use glam::{Mat3, Mat4, Vec3};

/// Within this cosine of the reference axis a direction counts as parallel to it.
const PARALLEL_COS: f32 = 1.0 - 1e-3;

/// Below this determinant a matrix is treated as singular.
const SINGULAR_DET: f32 = 1e-6;

/// One of the three local axes of a basis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Axis {
    /// The local X axis.
    X,
    /// The local Y axis.
    Y,
    /// The local Z axis.
    Z,
}

impl Axis {
    /// Unit vector along this axis.
    pub const fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }

    // (default reference, fallback reference) used to complete the basis
    const fn references(self) -> (Vec3, Vec3) {
        match self {
            Self::X => (Vec3::Y, Vec3::Z),
            Self::Y => (Vec3::Z, Vec3::X),
            Self::Z => (Vec3::Y, Vec3::X),
        }
    }
}

/// Build a right-handed orthonormal rotation whose `axis` column is `direction`.
///
/// The remaining two columns are derived from a reference vector. When `direction`
/// is (near-)parallel to the default reference, a second reference is used so the
/// cross product never degenerates.
///
/// A zero `direction` yields the identity.
pub fn basis_from_direction(direction: Vec3, axis: Axis) -> Mat3 {
    let d = direction.normalize_or_zero();
    if d == Vec3::ZERO {
        return Mat3::IDENTITY;
    }
    let (default_ref, fallback_ref) = axis.references();
    let reference = if d.dot(default_ref).abs() > PARALLEL_COS {
        fallback_ref
    } else {
        default_ref
    };
    match axis {
        Axis::X => {
            let z = d.cross(reference).normalize();
            let y = z.cross(d);
            Mat3::from_cols(d, y, z)
        }
        Axis::Y => {
            let x = d.cross(reference).normalize();
            let z = x.cross(d);
            Mat3::from_cols(x, d, z)
        }
        Axis::Z => {
            let x = reference.cross(d).normalize();
            let y = d.cross(x);
            Mat3::from_cols(x, y, d)
        }
    }
}

/// Direction-only ("normal") matrix of `m`: the inverse-transpose of its upper 3x3.
///
/// Returns the identity for singular matrices.
pub fn direction_matrix(m: Mat4) -> Mat3 {
    let m3 = Mat3::from_mat4(m);
    if m3.determinant().abs() < SINGULAR_DET {
        Mat3::IDENTITY
    } else {
        m3.inverse().transpose()
    }
}

/// Signed angle in radians rotating `from` onto `to` around `axis`.
///
/// The sign follows the right-hand rule about `axis`. Zero vectors yield `0.0`.
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f32 {
    let cross = from.cross(to);
    let sin = cross.dot(axis.normalize_or_zero());
    let cos = from.dot(to);
    if sin == 0.0 && cos == 0.0 {
        return 0.0;
    }
    sin.atan2(cos)
}

/// Returns true if `a` and `b` are within `epsilon` of each other.
pub fn approx_eq(a: Vec3, b: Vec3, epsilon: f32) -> bool {
    a.distance_squared(b) <= epsilon * epsilon
}
