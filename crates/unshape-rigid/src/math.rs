//! Extensions over glam for degenerate input.
//!
//! Dividing a vector by zero is an error; normalising a zero quaternion
//! yields identity. Zero vectors normalise to zero through glam's
//! `normalize_or_zero`.

use glam::{Quat, Vec3};

use crate::{PhysicsError, PhysicsResult};

/// Vector operations with defined behaviour on degenerate input.
pub trait VecExt: Sized {
    /// Divide by a scalar, failing when the scalar is zero.
    fn checked_div(self, scalar: f32) -> PhysicsResult<Self>;
}

impl VecExt for Vec3 {
    fn checked_div(self, scalar: f32) -> PhysicsResult<Self> {
        if scalar == 0.0 {
            return Err(PhysicsError::DivisionByZero);
        }
        Ok(self / scalar)
    }
}

/// Quaternion operations with defined behaviour on degenerate input.
pub trait QuatExt: Sized {
    /// Normalise, returning identity for a zero-length (or non-finite) quaternion.
    fn normalize_or_identity(self) -> Self;
}

impl QuatExt for Quat {
    fn normalize_or_identity(self) -> Self {
        let length = self.length();
        if length == 0.0 || !length.is_finite() {
            Quat::IDENTITY
        } else {
            self / length
        }
    }
}
