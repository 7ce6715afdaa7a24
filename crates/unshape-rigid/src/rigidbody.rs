//! Rigid body dynamics.
//!
//! Provides the core `RigidBody` type with mass, material properties, pending
//! forces and torques, and semi-implicit Euler integration.

use glam::{Quat, Vec3};

use crate::PhysicsResult;
use crate::math::{QuatExt, VecExt};

/// A rigid body in the physics simulation.
///
/// Angular motion uses the scalar inverse mass in place of an inertia tensor,
/// so torques and angular velocities are only an approximation of true
/// rotational dynamics.
#[derive(Clone, Debug)]
pub struct RigidBody {
    /// Position in world space.
    pub position: Vec3,
    /// Linear velocity.
    pub velocity: Vec3,
    /// Linear acceleration computed during the last integration.
    pub acceleration: Vec3,
    /// Orientation as a unit quaternion.
    pub rotation: Quat,
    /// Angular velocity (axis scaled by radians per second).
    pub angular_velocity: Vec3,
    /// Angular acceleration computed during the last integration.
    pub angular_acceleration: Vec3,
    /// Restitution (bounciness) 0-1.
    pub restitution: f32,
    /// Friction coefficient.
    pub friction: f32,
    /// Quadratic linear drag coefficient.
    pub linear_drag: f32,
    /// Quadratic angular drag coefficient.
    pub angular_drag: f32,
    /// Whether world gravity is applied to this body.
    pub use_gravity: bool,
    mass: f32,
    inv_mass: f32,
    is_static: bool,
    is_kinematic: bool,
    /// Forces applied since the last integration.
    pub(crate) forces: Vec<Vec3>,
    /// Torques applied since the last integration.
    pub(crate) torques: Vec<Vec3>,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RigidBody {
    /// Create a new dynamic rigid body with the given mass.
    ///
    /// A non-positive mass yields an inverse mass of zero.
    pub fn new(mass: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            angular_velocity: Vec3::ZERO,
            angular_acceleration: Vec3::ZERO,
            restitution: 0.3,
            friction: 0.5,
            linear_drag: 0.01,
            angular_drag: 0.01,
            use_gravity: true,
            mass,
            inv_mass: inverse_of(mass),
            is_static: false,
            is_kinematic: false,
            forces: Vec::new(),
            torques: Vec::new(),
        }
    }

    /// Create a static (immovable) rigid body.
    pub fn new_static() -> Self {
        let mut body = Self::new(0.0);
        body.make_static();
        body
    }

    /// Builder: set initial position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Builder: set initial velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder: set restitution.
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    /// Builder: set friction coefficient.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Builder: set linear and angular drag.
    pub fn with_drag(mut self, linear: f32, angular: f32) -> Self {
        self.linear_drag = linear;
        self.angular_drag = angular;
        self
    }

    /// Builder: enable or disable gravity.
    pub fn with_gravity(mut self, use_gravity: bool) -> Self {
        self.use_gravity = use_gravity;
        self
    }

    /// Mass of the body.
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass (0 for static, kinematic, or massless bodies).
    pub fn inverse_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Whether the body is static.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Whether the body is kinematic.
    pub fn is_kinematic(&self) -> bool {
        self.is_kinematic
    }

    /// Set the mass, recomputing the inverse mass for the current mode.
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
        self.inv_mass = if self.is_static || self.is_kinematic {
            0.0
        } else {
            inverse_of(mass)
        };
    }

    /// Make the body static: infinite mass and no motion.
    pub fn make_static(&mut self) {
        self.is_static = true;
        self.is_kinematic = false;
        self.inv_mass = 0.0;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    /// Make the body kinematic: infinite mass, but it keeps moving with its velocity.
    pub fn make_kinematic(&mut self) {
        self.is_kinematic = true;
        self.is_static = false;
        self.inv_mass = 0.0;
    }

    /// Make the body dynamic with the given mass.
    pub fn make_dynamic(&mut self, mass: f32) {
        self.is_static = false;
        self.is_kinematic = false;
        self.set_mass(mass);
    }

    /// Apply a force at the center of mass for the next integration.
    pub fn add_force(&mut self, force: Vec3) {
        if !self.is_static {
            self.forces.push(force);
        }
    }

    /// Apply a force at a world-space point (generates torque).
    pub fn add_force_at_point(&mut self, force: Vec3, point: Vec3) {
        if !self.is_static {
            self.forces.push(force);
            let r = point - self.position;
            self.torques.push(r.cross(force));
        }
    }

    /// Apply torque for the next integration.
    pub fn add_torque(&mut self, torque: Vec3) {
        if !self.is_static {
            self.torques.push(torque);
        }
    }

    /// Kinetic energy, with the angular term using mass in place of inertia.
    pub fn kinetic_energy(&self) -> f32 {
        if self.is_static {
            return 0.0;
        }
        0.5 * self.mass * (self.velocity.length_squared() + self.angular_velocity.length_squared())
    }

    /// Linear momentum.
    pub fn momentum(&self) -> Vec3 {
        if self.is_static {
            return Vec3::ZERO;
        }
        self.velocity * self.mass
    }

    /// Set velocity from a linear momentum. Fails for a body with zero mass.
    pub fn set_momentum(&mut self, momentum: Vec3) -> PhysicsResult<()> {
        if self.is_static {
            return Ok(());
        }
        self.velocity = momentum.checked_div(self.mass)?;
        Ok(())
    }

    /// Teleport the body.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Set orientation; a zero quaternion becomes identity.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize_or_identity();
    }

    /// Advance the body by `dt` using semi-implicit Euler.
    pub(crate) fn integrate(&mut self, dt: f32) {
        if self.is_static {
            return;
        }

        let mut force: Vec3 = self.forces.iter().copied().sum();
        let mut torque: Vec3 = self.torques.iter().copied().sum();

        if !self.is_kinematic {
            force -= self.velocity * self.velocity.length() * self.linear_drag;
            torque -= self.angular_velocity * self.angular_velocity.length() * self.angular_drag;
        }

        self.acceleration = force * self.inv_mass;
        self.angular_acceleration = torque * self.inv_mass;

        self.velocity += self.acceleration * dt;
        self.angular_velocity += self.angular_acceleration * dt;
        self.position += self.velocity * dt;

        if self.angular_velocity != Vec3::ZERO {
            let axis = self.angular_velocity.normalize_or_zero();
            let angle = self.angular_velocity.length() * dt;
            let delta = Quat::from_axis_angle(axis, angle);
            self.rotation = (self.rotation * delta).normalize_or_identity();
        }

        self.forces.clear();
        self.torques.clear();
    }
}

fn inverse_of(mass: f32) -> f32 {
    if mass > 0.0 { 1.0 / mass } else { 0.0 }
}
