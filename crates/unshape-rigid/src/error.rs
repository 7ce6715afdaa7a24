//! Error types for unshape-rigid.

use thiserror::Error;

use crate::{BodyHandle, ColliderHandle};

/// Errors that can occur while manipulating bodies or the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhysicsError {
    /// A vector was divided by a zero scalar.
    #[error("division of a vector by zero")]
    DivisionByZero,

    /// The body handle does not refer to a body stored in the world.
    #[error("unknown body: {0:?}")]
    UnknownBody(BodyHandle),

    /// The collider handle does not refer to a collider stored in the world.
    #[error("unknown collider: {0:?}")]
    UnknownCollider(ColliderHandle),
}

/// Result type for physics operations.
pub type PhysicsResult<T> = Result<T, PhysicsError>;
