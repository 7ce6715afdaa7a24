//! Physics simulation world.
//!
//! Contains the `PhysicsWorld` container that drives rigid body simulation:
//! fixed-timestep sub-updates, all-pairs collision detection, iterative
//! contact resolution, and spatial queries.

use glam::Vec3;
use slotmap::SlotMap;
use tracing::{debug, trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collider::Aabb;
use crate::{
    BodyHandle, Collider, ColliderHandle, Collision, PhysicsError, PhysicsResult, RigidBody,
};

// ============================================================================
// Configuration
// ============================================================================

/// Tuned bundle of solver constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Profile {
    /// 60 Hz, 8 resolution passes.
    #[default]
    Standard,
    /// 120 Hz, 12 resolution passes, for tall stacks and crowded scenes.
    Dense,
}

/// Configuration for physics simulation.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Physics {
    /// Gravity acceleration.
    pub gravity: Vec3,
    /// Fixed sub-update length in seconds.
    pub timestep: f32,
    /// Maximum sub-updates run by a single `step` call.
    pub max_substeps: u32,
    /// Maximum contact resolution passes per sub-update.
    pub iterations: u32,
    /// Soft cap on registered colliders.
    pub max_objects: usize,
    /// Distance added around each AABB during broad phase.
    pub broad_phase_margin: f32,
    /// Contacts at or below this depth are ignored.
    pub min_penetration: f32,
    /// Penetration left uncorrected by positional correction.
    pub slop: f32,
    /// Fraction of the remaining penetration corrected per resolution.
    pub separation_percent: f32,
    /// Tangential speeds below this skip friction.
    pub friction_threshold: f32,
}

impl Default for Physics {
    fn default() -> Self {
        Self::for_profile(Profile::Standard)
    }
}

impl Physics {
    /// Configuration for the given profile.
    pub fn for_profile(profile: Profile) -> Self {
        let mut config = Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            timestep: 0.0,
            max_substeps: 0,
            iterations: 0,
            max_objects: 1000,
            broad_phase_margin: 0.01,
            min_penetration: 0.001,
            slop: 0.005,
            separation_percent: 0.9,
            friction_threshold: 1e-6,
        };
        config.apply_profile(profile);
        config
    }

    /// Configuration tuned for dense scenes.
    pub fn dense() -> Self {
        Self::for_profile(Profile::Dense)
    }

    /// Overwrite the profile-controlled constants, leaving the rest untouched.
    pub fn apply_profile(&mut self, profile: Profile) {
        let (iterations, timestep, max_substeps) = match profile {
            Profile::Standard => (8, 1.0 / 60.0, 5),
            Profile::Dense => (12, 1.0 / 120.0, 8),
        };
        self.iterations = iterations;
        self.timestep = timestep;
        self.max_substeps = max_substeps;
    }
}

/// Name of [`Physics`] as taken by [`PhysicsWorld::new`].
pub type PhysicsConfig = Physics;

/// Counters describing the current load of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerformanceInfo {
    /// Registered colliders.
    pub object_count: usize,
    /// Contacts found by the most recent detection pass.
    pub collision_count: usize,
    /// Soft cap on registered colliders.
    pub max_objects: usize,
    /// Resolution passes per sub-update.
    pub iterations: u32,
}

/// Closest hit returned by [`PhysicsWorld::raycast`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Body owning the hit collider.
    pub body: BodyHandle,
    /// Collider whose bounds were hit.
    pub collider: ColliderHandle,
    /// Distance from the ray origin.
    pub distance: f32,
    /// Hit point in world space.
    pub point: Vec3,
}

/// Position and velocity changes produced by resolving one contact.
#[derive(Clone, Copy, Debug, Default)]
struct ContactResponse {
    position_a: Vec3,
    position_b: Vec3,
    velocity_a: Vec3,
    velocity_b: Vec3,
    impulse_applied: bool,
}

// ============================================================================
// World
// ============================================================================

/// The physics simulation world.
///
/// Bodies and colliders are stored in arenas and addressed by generational
/// handles. Storing an item does not make it part of the simulation; only
/// registered bodies are integrated and only registered colliders collide.
pub struct PhysicsWorld {
    bodies: SlotMap<BodyHandle, RigidBody>,
    colliders: SlotMap<ColliderHandle, Collider>,
    registered_bodies: Vec<BodyHandle>,
    registered_colliders: Vec<ColliderHandle>,
    collisions: Vec<Collision>,
    /// Configuration.
    pub config: Physics,
    accumulator: f32,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Physics::default())
    }
}

impl PhysicsWorld {
    /// Create a new physics world.
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            colliders: SlotMap::with_key(),
            registered_bodies: Vec::new(),
            registered_colliders: Vec::new(),
            collisions: Vec::new(),
            config,
            accumulator: 0.0,
        }
    }

    /// Store a body and return its handle. The body is not simulated until registered.
    pub fn create_body(&mut self, body: RigidBody) -> BodyHandle {
        self.bodies.insert(body)
    }

    /// Store a collider and return its handle. It does not collide until registered.
    pub fn create_collider(&mut self, collider: Collider) -> ColliderHandle {
        self.colliders.insert(collider)
    }

    /// Get a body by handle.
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Get a mutable body by handle.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle)
    }

    /// Get a collider by handle.
    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    /// Get a mutable collider by handle.
    pub fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.colliders.get_mut(handle)
    }

    /// Registered bodies in registration order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.registered_bodies
            .iter()
            .filter_map(|&h| self.bodies.get(h).map(|b| (h, b)))
    }

    /// Registered colliders in registration order.
    pub fn colliders(&self) -> impl Iterator<Item = (ColliderHandle, &Collider)> {
        self.registered_colliders
            .iter()
            .filter_map(|&h| self.colliders.get(h).map(|c| (h, c)))
    }

    /// Number of registered bodies.
    pub fn body_count(&self) -> usize {
        self.registered_bodies.len()
    }

    /// Number of registered colliders.
    pub fn collider_count(&self) -> usize {
        self.registered_colliders.len()
    }

    /// Register a stored body for simulation.
    ///
    /// Returns `Ok(false)` if it was already registered.
    pub fn add_rigid_body(&mut self, handle: BodyHandle) -> PhysicsResult<bool> {
        if !self.bodies.contains_key(handle) {
            return Err(PhysicsError::UnknownBody(handle));
        }
        if self.registered_bodies.contains(&handle) {
            return Ok(false);
        }
        self.registered_bodies.push(handle);
        Ok(true)
    }

    /// Unregister a body. The body stays in storage and is no longer integrated.
    ///
    /// Colliders referencing it remain registered, so the body still shows up
    /// in `query_aabb` and `raycast` and contacts can still move it. Remove
    /// those colliders as well to take the body out of the simulation.
    pub fn remove_rigid_body(&mut self, handle: BodyHandle) -> PhysicsResult<bool> {
        if !self.bodies.contains_key(handle) {
            return Err(PhysicsError::UnknownBody(handle));
        }
        Ok(swap_remove_item(&mut self.registered_bodies, handle))
    }

    /// Register a stored collider, also registering its body.
    ///
    /// When `max_objects` colliders are already registered the collider is
    /// rejected: the call returns `Ok(false)` and its body is left untouched.
    pub fn add_collider(&mut self, handle: ColliderHandle) -> PhysicsResult<bool> {
        let body = self
            .colliders
            .get(handle)
            .ok_or(PhysicsError::UnknownCollider(handle))?
            .body;
        if !self.bodies.contains_key(body) {
            return Err(PhysicsError::UnknownBody(body));
        }
        if self.registered_colliders.contains(&handle) {
            return Ok(false);
        }
        if self.registered_colliders.len() >= self.config.max_objects {
            warn!(
                max_objects = self.config.max_objects,
                "collider limit reached, rejecting collider"
            );
            return Ok(false);
        }

        self.registered_colliders.push(handle);
        self.add_rigid_body(body)?;
        Ok(true)
    }

    /// Unregister a collider. Its body stays registered.
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> PhysicsResult<bool> {
        if !self.colliders.contains_key(handle) {
            return Err(PhysicsError::UnknownCollider(handle));
        }
        Ok(swap_remove_item(&mut self.registered_colliders, handle))
    }

    /// Set world gravity.
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    /// Current world gravity.
    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    /// Change the soft collider cap. Already registered colliders are kept.
    pub fn set_max_objects(&mut self, limit: usize) {
        self.config.max_objects = limit;
    }

    /// Switch between the standard and dense solver profiles.
    pub fn configure_dense_scene(&mut self, enabled: bool) {
        let profile = if enabled {
            Profile::Dense
        } else {
            Profile::Standard
        };
        self.config.apply_profile(profile);
        debug!(
            ?profile,
            iterations = self.config.iterations,
            timestep = self.config.timestep,
            "solver profile changed"
        );
    }

    /// Time carried over to the next `step` call.
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Snapshot of the contacts found by the most recent detection pass.
    pub fn collisions(&self) -> Vec<Collision> {
        self.collisions.clone()
    }

    /// Load counters.
    pub fn performance_info(&self) -> PerformanceInfo {
        PerformanceInfo {
            object_count: self.registered_colliders.len(),
            collision_count: self.collisions.len(),
            max_objects: self.config.max_objects,
            iterations: self.config.iterations,
        }
    }

    /// Drop every registration, the contact list and the accumulated time.
    ///
    /// Stored bodies and colliders stay valid and can be registered again.
    pub fn clear(&mut self) {
        self.registered_bodies.clear();
        self.registered_colliders.clear();
        self.collisions.clear();
        self.accumulator = 0.0;
    }

    /// Advance the simulation by `delta_time` seconds of wall-clock time.
    ///
    /// Time is consumed in fixed sub-updates of `config.timestep`, at most
    /// `config.max_substeps` per call. Whatever is left stays in the
    /// accumulator for the next call. Returns the number of sub-updates run.
    ///
    /// `delta_time` is not validated. A negative value stalls the world until
    /// later calls pay the deficit back, and a NaN poisons the accumulator so
    /// no further sub-updates run until [`clear`](Self::clear).
    pub fn step(&mut self, delta_time: f32) -> u32 {
        self.accumulator += delta_time;

        let timestep = self.config.timestep;
        let mut substeps = 0;
        while self.accumulator >= timestep && substeps < self.config.max_substeps {
            self.step_fixed();
            self.accumulator -= timestep;
            substeps += 1;
        }

        if substeps == self.config.max_substeps && self.accumulator >= timestep {
            debug!(
                substeps,
                behind = self.accumulator,
                "substep limit reached, deferring remaining time"
            );
        }
        substeps
    }

    /// Run exactly one fixed sub-update.
    pub fn step_fixed(&mut self) {
        let dt = self.config.timestep;

        self.apply_gravity();
        self.integrate(dt);
        self.detect_collisions();
        self.resolve_collisions();
    }

    /// Add gravity to every registered dynamic body that uses it.
    fn apply_gravity(&mut self) {
        let gravity = self.config.gravity;

        for &handle in &self.registered_bodies {
            if let Some(body) = self.bodies.get_mut(handle) {
                if body.use_gravity && !body.is_static() && !body.is_kinematic() {
                    let mass = body.mass();
                    body.add_force(gravity * mass);
                }
            }
        }
    }

    fn integrate(&mut self, dt: f32) {
        for &handle in &self.registered_bodies {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.integrate(dt);
            }
        }
    }

    /// Detect all collisions between registered colliders, replacing the
    /// previous contact list.
    pub(crate) fn detect_collisions(&mut self) {
        let margin = self.config.broad_phase_margin;
        let min_penetration = self.config.min_penetration;
        let mut collisions = Vec::new();

        for (i, &handle_a) in self.registered_colliders.iter().enumerate() {
            let Some(collider_a) = self.colliders.get(handle_a) else {
                continue;
            };
            let Some(body_a) = self.bodies.get(collider_a.body) else {
                continue;
            };
            let bounds_a = collider_a.aabb(body_a).expanded(margin);

            for &handle_b in &self.registered_colliders[i + 1..] {
                let Some(collider_b) = self.colliders.get(handle_b) else {
                    continue;
                };
                if collider_a.body == collider_b.body {
                    continue;
                }
                let Some(body_b) = self.bodies.get(collider_b.body) else {
                    continue;
                };
                if body_a.is_static() && body_b.is_static() {
                    continue;
                }
                if !bounds_a.intersects(&collider_b.aabb(body_b).expanded(margin)) {
                    continue;
                }

                if let Some(collision) =
                    collider_a.check_collision(body_a, collider_b, body_b, (handle_a, handle_b))
                {
                    if collision.penetration > min_penetration {
                        collisions.push(collision);
                    }
                }
            }
        }

        self.collisions = collisions;
    }

    /// Resolve contacts over several passes, re-detecting between passes.
    ///
    /// Returns the number of passes run.
    pub(crate) fn resolve_collisions(&mut self) -> u32 {
        let iterations = self.config.iterations;
        let mut passes = 0;

        for pass in 0..iterations {
            passes += 1;
            let mut resolved_any = false;
            for index in 0..self.collisions.len() {
                let collision = self.collisions[index];
                resolved_any |= self.resolve_collision(&collision);
            }

            if !resolved_any {
                break;
            }
            if pass + 1 < iterations {
                self.detect_collisions();
            }
        }

        trace!(passes, contacts = self.collisions.len(), "contacts resolved");
        passes
    }

    /// Resolve a single contact. Returns whether an impulse was applied.
    fn resolve_collision(&mut self, collision: &Collision) -> bool {
        if collision.is_trigger || collision.penetration <= self.config.min_penetration {
            return false;
        }

        let response = {
            let (Some(body_a), Some(body_b)) = (
                self.bodies.get(collision.body_a),
                self.bodies.get(collision.body_b),
            ) else {
                return false;
            };
            if body_a.is_static() && body_b.is_static() {
                return false;
            }
            contact_response(body_a, body_b, collision, &self.config)
        };

        if let Some(body_a) = self.bodies.get_mut(collision.body_a) {
            body_a.position += response.position_a;
            body_a.velocity += response.velocity_a;
        }
        if let Some(body_b) = self.bodies.get_mut(collision.body_b) {
            body_b.position += response.position_b;
            body_b.velocity += response.velocity_b;
        }

        response.impulse_applied
    }

    /// Registered bodies whose collider bounds intersect `region`.
    ///
    /// Each body appears once, in collider registration order.
    pub fn query_aabb(&self, region: &Aabb) -> Vec<BodyHandle> {
        let mut found = Vec::new();

        for (_, collider) in self.colliders() {
            let Some(body) = self.bodies.get(collider.body) else {
                continue;
            };
            if collider.aabb(body).intersects(region) && !found.contains(&collider.body) {
                found.push(collider.body);
            }
        }

        found
    }

    /// Closest collider bounds hit by a ray within `max_distance`.
    ///
    /// `direction` need not be normalized; a zero direction never hits.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let mut closest: Option<RayHit> = None;

        for (handle, collider) in self.colliders() {
            let Some(body) = self.bodies.get(collider.body) else {
                continue;
            };
            let Some(distance) = collider.aabb(body).ray_intersection(origin, direction) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            if closest.is_none_or(|hit| distance < hit.distance) {
                closest = Some(RayHit {
                    body: collider.body,
                    collider: handle,
                    distance,
                    point: origin + direction * distance,
                });
            }
        }

        closest
    }
}

/// Positional correction, normal impulse and friction for one contact.
fn contact_response(
    body_a: &RigidBody,
    body_b: &RigidBody,
    collision: &Collision,
    config: &Physics,
) -> ContactResponse {
    let mut response = ContactResponse::default();
    let normal = collision.normal;
    let inv_mass_a = body_a.inverse_mass();
    let inv_mass_b = body_b.inverse_mass();
    let total_inv_mass = inv_mass_a + inv_mass_b;

    // Kinematic and static bodies both have zero inverse mass.
    if total_inv_mass <= 0.0 {
        return response;
    }

    let correction = (collision.penetration - config.slop).max(0.0) * config.separation_percent
        / total_inv_mass;
    response.position_a = -normal * correction * inv_mass_a;
    response.position_b = normal * correction * inv_mass_b;

    let relative_velocity = body_b.velocity - body_a.velocity;
    let velocity_along_normal = relative_velocity.dot(normal);
    if velocity_along_normal >= 0.0 {
        return response;
    }

    let restitution = body_a.restitution.min(body_b.restitution);
    let j = -(1.0 + restitution) * velocity_along_normal / total_inv_mass;
    response.velocity_a = -normal * j * inv_mass_a;
    response.velocity_b = normal * j * inv_mass_b;
    response.impulse_applied = true;

    let tangent = relative_velocity - normal * velocity_along_normal;
    let tangent_speed = tangent.length();
    if tangent_speed < config.friction_threshold {
        return response;
    }
    let tangent = tangent / tangent_speed;

    let mu = (body_a.friction * body_b.friction).sqrt();
    let limit = j.abs() * mu;
    // max/min rather than clamp: a NaN limit must not panic.
    let jt = (-relative_velocity.dot(tangent) / total_inv_mass)
        .max(-limit)
        .min(limit);
    response.velocity_a -= tangent * jt * inv_mass_a;
    response.velocity_b += tangent * jt * inv_mass_b;

    response
}

fn swap_remove_item<T: PartialEq>(items: &mut Vec<T>, item: T) -> bool {
    match items.iter().position(|x| *x == item) {
        Some(index) => {
            items.swap_remove(index);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(
        world: &mut PhysicsWorld,
        body: RigidBody,
        collider: impl FnOnce(BodyHandle) -> Collider,
    ) -> (BodyHandle, ColliderHandle) {
        let b = world.create_body(body);
        let c = world.create_collider(collider(b));
        world.add_collider(c).unwrap();
        (b, c)
    }

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::new(PhysicsConfig::default());
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert_eq!(world.config.iterations, 8);
    }

    #[test]
    fn test_add_collider_registers_body() {
        let mut world = PhysicsWorld::default();
        let (body, collider) = spawn(&mut world, RigidBody::new(1.0), |b| Collider::sphere(b, 1.0));

        assert_eq!(world.body_count(), 1);
        assert_eq!(world.collider_count(), 1);
        assert_eq!(world.bodies().next().map(|(h, _)| h), Some(body));
        assert_eq!(world.add_collider(collider), Ok(false));
        assert_eq!(world.add_rigid_body(body), Ok(false));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_remove_is_unordered() {
        let mut world = PhysicsWorld::default();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let b = world.create_body(RigidBody::new(1.0));
                world.add_rigid_body(b).unwrap();
                b
            })
            .collect();

        assert_eq!(world.remove_rigid_body(handles[0]), Ok(true));
        assert_eq!(world.remove_rigid_body(handles[0]), Ok(false));
        let order: Vec<_> = world.bodies().map(|(h, _)| h).collect();
        assert_eq!(order, vec![handles[3], handles[1], handles[2]]);
        assert!(world.body(handles[0]).is_some());
    }

    #[test]
    fn test_unknown_handles() {
        let mut world = PhysicsWorld::default();
        let body = world.create_body(RigidBody::new(1.0));
        let collider = world.create_collider(Collider::sphere(body, 1.0));

        let mut other = PhysicsWorld::default();
        assert_eq!(other.add_rigid_body(body), Err(PhysicsError::UnknownBody(body)));
        assert_eq!(
            other.add_collider(collider),
            Err(PhysicsError::UnknownCollider(collider))
        );
    }

    #[test]
    fn test_gravity() {
        let mut world = PhysicsWorld::default();
        let (body, _) = spawn(
            &mut world,
            RigidBody::new(1.0).with_position(Vec3::Y * 5.0),
            |b| Collider::sphere(b, 1.0),
        );

        world.step_fixed();
        assert!(world.body(body).unwrap().position.y < 5.0);
    }

    #[test]
    fn test_gravity_skips_kinematic_and_opt_out() {
        let mut world = PhysicsWorld::default();
        let mut kinematic = RigidBody::new(1.0);
        kinematic.make_kinematic();
        let kinematic = world.create_body(kinematic);
        let floating = world.create_body(RigidBody::new(1.0).with_gravity(false));
        world.add_rigid_body(kinematic).unwrap();
        world.add_rigid_body(floating).unwrap();

        world.step_fixed();
        assert_eq!(world.body(kinematic).unwrap().position, Vec3::ZERO);
        assert_eq!(world.body(floating).unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn test_accumulator_carries_remainder() {
        let mut world = PhysicsWorld::default();
        let dt = world.config.timestep;

        assert_eq!(world.step(dt * 0.5), 0);
        assert!((world.accumulator() - dt * 0.5).abs() < 1e-7);
        assert_eq!(world.step(dt * 0.75), 1);
        assert!((world.accumulator() - dt * 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_substep_cap_defers_time() {
        let mut world = PhysicsWorld::default();
        let dt = world.config.timestep;

        assert_eq!(world.step(dt * 10.5), 5);
        assert!((world.accumulator() - dt * 5.5).abs() < 1e-5);
        assert_eq!(world.step(0.0), 5);
        assert!((world.accumulator() - dt * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_dense_profile() {
        let mut world = PhysicsWorld::default();
        world.configure_dense_scene(true);
        assert_eq!(world.config.iterations, 12);
        assert_eq!(world.config.timestep, 1.0 / 120.0);
        assert_eq!(world.config.max_substeps, 8);

        world.configure_dense_scene(false);
        assert_eq!(world.config.iterations, 8);
        assert_eq!(world.config.timestep, 1.0 / 60.0);
    }

    #[test]
    fn test_static_pairs_skipped() {
        let mut world = PhysicsWorld::default();
        spawn(&mut world, RigidBody::new_static(), |b| Collider::cuboid(b, Vec3::ONE));
        spawn(&mut world, RigidBody::new_static(), |b| Collider::cuboid(b, Vec3::ONE));

        world.detect_collisions();
        assert!(world.collisions().is_empty());
    }

    #[test]
    fn test_colliders_on_same_body_do_not_collide() {
        let mut world = PhysicsWorld::default();
        let body = world.create_body(RigidBody::new(1.0).with_gravity(false));
        let a = world.create_collider(Collider::sphere(body, 1.0));
        let b = world.create_collider(Collider::cuboid(body, Vec3::ONE));
        world.add_collider(a).unwrap();
        world.add_collider(b).unwrap();

        world.detect_collisions();
        assert!(world.collisions().is_empty());
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn test_shallow_contacts_filtered() {
        let mut world = PhysicsWorld::default();
        spawn(&mut world, RigidBody::new(1.0), |b| Collider::sphere(b, 1.0));
        spawn(
            &mut world,
            RigidBody::new(1.0).with_position(Vec3::new(1.9995, 0.0, 0.0)),
            |b| Collider::sphere(b, 1.0),
        );

        world.detect_collisions();
        assert!(world.collisions().is_empty());
    }

    #[test]
    fn test_sphere_sphere_separation() {
        let mut world = PhysicsWorld::new(PhysicsConfig {
            gravity: Vec3::ZERO,
            ..Default::default()
        });
        let (a, _) = spawn(&mut world, RigidBody::new(1.0), |b| Collider::sphere(b, 1.0));
        let (b, _) = spawn(
            &mut world,
            RigidBody::new(1.0).with_position(Vec3::X * 1.5),
            |b| Collider::sphere(b, 1.0),
        );

        let distance =
            |w: &PhysicsWorld| (w.body(b).unwrap().position - w.body(a).unwrap().position).length();
        let initial = distance(&world);
        for _ in 0..10 {
            world.step_fixed();
        }
        assert!(distance(&world) > initial);
    }

    #[test]
    fn test_trigger_detected_but_not_resolved() {
        let mut world = PhysicsWorld::new(PhysicsConfig {
            gravity: Vec3::ZERO,
            ..Default::default()
        });
        let (a, _) = spawn(
            &mut world,
            RigidBody::new(1.0).with_velocity(Vec3::X),
            |b| Collider::sphere(b, 1.0).with_trigger(true),
        );
        spawn(
            &mut world,
            RigidBody::new(1.0).with_position(Vec3::X * 1.5),
            |b| Collider::sphere(b, 1.0),
        );

        world.step_fixed();
        let collisions = world.collisions();
        assert_eq!(collisions.len(), 1);
        assert!(collisions[0].is_trigger);
        assert!((world.body(a).unwrap().velocity.x - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_restitution_bounce() {
        let mut world = PhysicsWorld::new(PhysicsConfig {
            gravity: Vec3::ZERO,
            ..Default::default()
        });
        let (a, _) = spawn(
            &mut world,
            RigidBody::new(1.0)
                .with_velocity(Vec3::new(2.0, 0.0, 0.0))
                .with_restitution(1.0)
                .with_drag(0.0, 0.0),
            |b| Collider::sphere(b, 1.0),
        );
        let (b, _) = spawn(
            &mut world,
            RigidBody::new(1.0)
                .with_position(Vec3::X * 1.98)
                .with_restitution(1.0)
                .with_drag(0.0, 0.0),
            |b| Collider::sphere(b, 1.0),
        );

        world.step_fixed();
        // Elastic exchange between equal masses.
        assert!(world.body(a).unwrap().velocity.x.abs() < 1e-4);
        assert!((world.body(b).unwrap().velocity.x - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_friction_slows_sliding_box() {
        let mut world = PhysicsWorld::default();
        spawn(&mut world, RigidBody::new_static().with_friction(0.8), |b| {
            Collider::cuboid(b, Vec3::new(50.0, 0.5, 50.0))
        });
        let (slider, _) = spawn(
            &mut world,
            RigidBody::new(1.0)
                .with_position(Vec3::Y)
                .with_velocity(Vec3::new(3.0, 0.0, 0.0))
                .with_restitution(0.0)
                .with_friction(0.8),
            |b| Collider::cuboid(b, Vec3::splat(0.5)),
        );

        for _ in 0..60 {
            world.step_fixed();
        }
        assert!(world.body(slider).unwrap().velocity.x < 2.0);
    }

    #[test]
    fn test_frictionless_side_keeps_speed() {
        let mut world = PhysicsWorld::default();
        spawn(&mut world, RigidBody::new_static().with_friction(0.0), |b| {
            Collider::cuboid(b, Vec3::new(50.0, 0.5, 50.0))
        });
        let (slider, _) = spawn(
            &mut world,
            RigidBody::new(1.0)
                .with_position(Vec3::Y)
                .with_velocity(Vec3::new(3.0, 0.0, 0.0))
                .with_restitution(0.0)
                .with_friction(1.0)
                .with_drag(0.0, 0.0),
            |b| Collider::cuboid(b, Vec3::splat(0.5)),
        );

        for _ in 0..60 {
            world.step_fixed();
        }
        assert!((world.body(slider).unwrap().velocity.x - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_query_aabb() {
        let mut world = PhysicsWorld::default();
        let (near, _) = spawn(&mut world, RigidBody::new(1.0), |b| Collider::sphere(b, 1.0));
        spawn(
            &mut world,
            RigidBody::new(1.0).with_position(Vec3::X * 10.0),
            |b| Collider::sphere(b, 1.0),
        );
        let extra = world.create_collider(Collider::cuboid(near, Vec3::ONE));
        world.add_collider(extra).unwrap();

        let found = world.query_aabb(&Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)));
        assert_eq!(found, vec![near]);
    }

    #[test]
    fn test_raycast_closest_and_range() {
        let mut world = PhysicsWorld::default();
        let (cube, _) = spawn(
            &mut world,
            RigidBody::new_static().with_position(Vec3::X * 5.0),
            |b| Collider::cuboid(b, Vec3::ONE),
        );
        let (ball, ball_shape) = spawn(
            &mut world,
            RigidBody::new_static().with_position(Vec3::X * 2.5),
            |b| Collider::sphere(b, 0.5),
        );

        let hit = world.raycast(Vec3::ZERO, Vec3::X * 3.0, 100.0).unwrap();
        assert_eq!(hit.body, ball);
        assert_eq!(hit.collider, ball_shape);
        assert_eq!(hit.distance, 2.0);
        assert_eq!(hit.point, Vec3::X * 2.0);

        assert!(world.raycast(Vec3::ZERO, Vec3::X, 1.5).is_none());
        assert!(world.raycast(Vec3::ZERO, Vec3::ZERO, 100.0).is_none());

        world.remove_collider(ball_shape).unwrap();
        assert_eq!(world.raycast(Vec3::ZERO, Vec3::X, 100.0).unwrap().body, cube);
    }

    #[test]
    fn test_clear() {
        let mut world = PhysicsWorld::default();
        let (body, collider) = spawn(&mut world, RigidBody::new(1.0), |b| Collider::sphere(b, 1.0));
        world.step(0.001);
        world.clear();

        assert_eq!(world.body_count(), 0);
        assert_eq!(world.collider_count(), 0);
        assert_eq!(world.accumulator(), 0.0);
        assert!(world.body(body).is_some());
        assert_eq!(world.add_collider(collider), Ok(true));
    }

    #[test]
    fn test_performance_info() {
        let mut world = PhysicsWorld::new(PhysicsConfig {
            gravity: Vec3::ZERO,
            ..Default::default()
        });
        spawn(&mut world, RigidBody::new(1.0), |b| Collider::sphere(b, 1.0));
        spawn(
            &mut world,
            RigidBody::new(1.0).with_position(Vec3::X * 1.5),
            |b| Collider::sphere(b, 1.0),
        );
        world.detect_collisions();

        let info = world.performance_info();
        assert_eq!(
            info,
            PerformanceInfo {
                object_count: 2,
                collision_count: 1,
                max_objects: 1000,
                iterations: 8,
            }
        );
    }

    #[test]
    fn test_stacking() {
        let mut world = PhysicsWorld::default();
        world.configure_dense_scene(true);
        spawn(&mut world, RigidBody::new_static(), |b| {
            Collider::cuboid(b, Vec3::new(10.0, 0.5, 10.0))
        });

        let boxes: Vec<_> = (0..3)
            .map(|i| {
                spawn(
                    &mut world,
                    RigidBody::new(1.0)
                        .with_position(Vec3::Y * (1.0 + i as f32))
                        .with_restitution(0.0),
                    |b| Collider::cuboid(b, Vec3::splat(0.5)),
                )
                .0
            })
            .collect();

        for _ in 0..240 {
            world.step_fixed();
        }

        let heights: Vec<f32> = boxes
            .iter()
            .map(|&b| world.body(b).unwrap().position.y)
            .collect();
        for (i, y) in heights.iter().enumerate() {
            let expected = 1.0 + i as f32;
            assert!((y - expected).abs() < 0.1, "box {} at y = {}", i, y);
        }
        for &b in &boxes {
            assert!(world.body(b).unwrap().velocity.length() < 0.5);
        }
    }

    #[test]
    fn test_step_does_not_validate_delta_time() {
        let mut world = PhysicsWorld::default();
        let dt = world.config.timestep;
        let body = world.create_body(RigidBody::new(1.0));
        world.add_rigid_body(body).unwrap();

        assert_eq!(world.step(-1.0), 0);
        assert_eq!(world.step(dt), 0);
        assert!(world.accumulator() < 0.0);

        world.clear();
        assert_eq!(world.step(f32::NAN), 0);
        assert_eq!(world.step(dt), 0);
        assert!(world.accumulator().is_nan());
        assert_eq!(world.body(body).unwrap().position, Vec3::ZERO);

        world.clear();
        world.add_rigid_body(body).unwrap();
        assert_eq!(world.step(dt), 1);
    }

    #[test]
    fn test_removed_body_keeps_its_colliders() {
        let mut world = PhysicsWorld::new(PhysicsConfig {
            gravity: Vec3::ZERO,
            ..Default::default()
        });
        let (ball, _) = spawn(
            &mut world,
            RigidBody::new(1.0).with_velocity(Vec3::X),
            |b| Collider::sphere(b, 1.0),
        );
        spawn(
            &mut world,
            RigidBody::new(1.0).with_position(Vec3::new(1.5, 0.0, 0.0)),
            |b| Collider::sphere(b, 1.0),
        );

        assert_eq!(world.remove_rigid_body(ball), Ok(true));
        assert_eq!(world.body_count(), 1);

        let region = Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.25));
        assert_eq!(world.query_aabb(&region), vec![ball]);
        let hit = world.raycast(Vec3::new(-5.0, 0.0, 0.0), Vec3::X, 10.0).unwrap();
        assert_eq!(hit.body, ball);

        // Not integrated, but still pushed back by the contact.
        world.step_fixed();
        let body = world.body(ball).unwrap();
        assert!(body.position.x < 0.0);
        assert!(body.velocity.x < 1.0);
    }

    #[test]
    fn test_kinematic_and_static_pair_is_not_resolved() {
        let mut world = PhysicsWorld::default();
        let mut mover = RigidBody::new(1.0);
        mover.make_kinematic();
        let (mover, _) = spawn(&mut world, mover, |b| Collider::cuboid(b, Vec3::ONE));
        let (wall, _) = spawn(
            &mut world,
            RigidBody::new_static().with_position(Vec3::new(1.5, 0.0, 0.0)),
            |b| Collider::cuboid(b, Vec3::ONE),
        );

        world.step_fixed();

        assert_eq!(world.collisions().len(), 1);
        assert_eq!(world.body(mover).unwrap().position, Vec3::ZERO);
        assert_eq!(world.body(mover).unwrap().velocity, Vec3::ZERO);
        assert_eq!(world.body(wall).unwrap().position, Vec3::new(1.5, 0.0, 0.0));
    }

    #[test]
    fn test_kinematic_pair_is_not_resolved() {
        let mut world = PhysicsWorld::default();
        let kinematic = || {
            let mut body = RigidBody::new(1.0);
            body.make_kinematic();
            body
        };
        let (a, _) = spawn(&mut world, kinematic(), |b| Collider::sphere(b, 1.0));
        let (b, _) = spawn(
            &mut world,
            kinematic().with_position(Vec3::new(1.0, 0.0, 0.0)),
            |h| Collider::sphere(h, 1.0),
        );

        world.detect_collisions();
        assert_eq!(world.collisions().len(), 1);
        assert_eq!(world.resolve_collisions(), 1);
        assert_eq!(world.body(a).unwrap().position, Vec3::ZERO);
        assert_eq!(world.body(b).unwrap().position, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_kinematic_body_pushes_dynamic_body() {
        let mut world = PhysicsWorld::new(PhysicsConfig {
            gravity: Vec3::ZERO,
            ..Default::default()
        });
        let mut pusher = RigidBody::new(1.0).with_velocity(Vec3::new(2.0, 0.0, 0.0));
        pusher.make_kinematic();
        let (pusher, _) = spawn(&mut world, pusher, |b| Collider::cuboid(b, Vec3::splat(0.5)));
        let (ball, _) = spawn(
            &mut world,
            RigidBody::new(1.0).with_position(Vec3::new(1.2, 0.0, 0.0)),
            |b| Collider::sphere(b, 0.5),
        );

        for _ in 0..60 {
            world.step_fixed();
            assert_eq!(world.body(pusher).unwrap().velocity, Vec3::new(2.0, 0.0, 0.0));
        }

        let pusher = world.body(pusher).unwrap();
        let ball = world.body(ball).unwrap();
        assert!((pusher.position.x - 2.0).abs() < 1e-3);
        assert!(ball.position.x > pusher.position.x);
        assert!(ball.velocity.x > 0.0);
    }
}
