//! Rigid body physics simulation for resin.
//!
//! Provides discrete-time rigid body dynamics with collision detection and
//! response:
//! - `RigidBody` - dynamic, kinematic or static body with mass and material
//! - `Collider` - collision shapes (box, sphere) attached to a body
//! - `PhysicsWorld` - fixed-timestep simulation container with gravity,
//!   iterative contact resolution and spatial queries
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use unshape_rigid::{Collider, PhysicsWorld, RigidBody};
//!
//! let mut world = PhysicsWorld::default();
//!
//! let ground = world.create_body(RigidBody::new_static());
//! let ground_shape = world.create_collider(Collider::cuboid(ground, Vec3::new(10.0, 0.5, 10.0)));
//! world.add_collider(ground_shape).unwrap();
//!
//! let ball = world.create_body(RigidBody::new(1.0).with_position(Vec3::Y * 3.0));
//! let ball_shape = world.create_collider(Collider::sphere(ball, 0.5));
//! world.add_collider(ball_shape).unwrap();
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//!
//! let y = world.body(ball).unwrap().position.y;
//! assert!(y > 0.9 && y < 1.1);
//! ```
//!
//! Boxes are treated as axis-aligned for collision purposes and angular
//! motion uses the body's scalar mass instead of an inertia tensor. There is
//! no continuous collision detection, so fast bodies can tunnel through thin
//! colliders.

pub mod collider;
pub mod collision;
mod error;
pub mod math;
pub mod rigidbody;
pub mod world;

pub use collider::{Aabb, Collider, Shape};
pub use collision::Collision;
pub use error::{PhysicsError, PhysicsResult};
pub use math::{QuatExt, VecExt};
pub use rigidbody::RigidBody;
pub use world::{PerformanceInfo, Physics, PhysicsConfig, PhysicsWorld, Profile, RayHit};

slotmap::new_key_type! {
    /// Handle to a rigid body stored in a [`PhysicsWorld`].
    pub struct BodyHandle;

    /// Handle to a collider stored in a [`PhysicsWorld`].
    pub struct ColliderHandle;
}
