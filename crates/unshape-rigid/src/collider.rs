//! Collision shapes and their world-space bounds.

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::collision::{self, Collision};
use crate::{BodyHandle, ColliderHandle, RigidBody};

// ============================================================================
// Shapes
// ============================================================================

/// Geometry of a collider, centered on its body's position.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Shape {
    /// Box with the given half-extents along each axis.
    Box {
        /// Half-extents along each axis.
        half_extents: Vec3,
    },
    /// Sphere with the given radius.
    Sphere {
        /// Radius of the sphere.
        radius: f32,
    },
}

impl Shape {
    /// Half-size of the shape's bounding box along each axis.
    pub fn extents(&self) -> Vec3 {
        match *self {
            Shape::Box { half_extents } => half_extents,
            Shape::Sphere { radius } => Vec3::splat(radius),
        }
    }
}

/// A collision shape attached to exactly one rigid body.
#[derive(Clone, Debug)]
pub struct Collider {
    /// Shape geometry.
    pub shape: Shape,
    /// The body this collider follows.
    pub body: BodyHandle,
    /// Triggers report collisions but are never resolved.
    pub is_trigger: bool,
}

impl Collider {
    /// Create a collider with an arbitrary shape.
    pub fn new(body: BodyHandle, shape: Shape) -> Self {
        Self {
            shape,
            body,
            is_trigger: false,
        }
    }

    /// Create a box collider.
    pub fn cuboid(body: BodyHandle, half_extents: Vec3) -> Self {
        Self::new(body, Shape::Box { half_extents })
    }

    /// Create a sphere collider.
    pub fn sphere(body: BodyHandle, radius: f32) -> Self {
        Self::new(body, Shape::Sphere { radius })
    }

    /// Builder: mark the collider as a trigger.
    pub fn with_trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    /// World-space bounding box for the collider on `body`.
    ///
    /// Orientation is ignored: a rotated box keeps its unrotated bounds.
    pub fn aabb(&self, body: &RigidBody) -> Aabb {
        Aabb::from_center_half_extents(body.position, self.shape.extents())
    }

    /// Narrow-phase test against another collider.
    ///
    /// `handles` identify `self` and `other` in the returned contact.
    pub fn check_collision(
        &self,
        body: &RigidBody,
        other: &Collider,
        other_body: &RigidBody,
        handles: (ColliderHandle, ColliderHandle),
    ) -> Option<Collision> {
        let a = collision::Participant {
            body: self.body,
            collider: handles.0,
            position: body.position,
        };
        let b = collision::Participant {
            body: other.body,
            collider: handles.1,
            position: other_body.position,
        };

        let contact = match (self.shape, other.shape) {
            (Shape::Box { half_extents: he_a }, Shape::Box { half_extents: he_b }) => {
                collision::box_box(a, he_a, b, he_b)
            }
            (Shape::Box { half_extents }, Shape::Sphere { radius }) => {
                collision::box_sphere(a, half_extents, b, radius)
            }
            (Shape::Sphere { radius }, Shape::Box { half_extents }) => {
                collision::box_sphere(b, half_extents, a, radius).map(Collision::flip)
            }
            (Shape::Sphere { radius: r_a }, Shape::Sphere { radius: r_b }) => {
                collision::sphere_sphere(a, r_a, b, r_b)
            }
        };

        contact.map(|c| c.with_trigger(self.is_trigger || other.is_trigger))
    }
}

// ============================================================================
// Bounds
// ============================================================================

/// 3D axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a new AABB from min and max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an AABB from center and half-extents.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Returns a copy grown by `margin` on every side.
    pub fn expanded(&self, margin: f32) -> Aabb {
        Aabb::new(self.min - Vec3::splat(margin), self.max + Vec3::splat(margin))
    }

    /// Checks if this AABB intersects another AABB (touching counts).
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Overlap depth along each axis; non-positive components mean separation.
    pub fn overlap(&self, other: &Aabb) -> Vec3 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// Closest point inside the box to `point`.
    pub fn clamp_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// Slab test against a ray with a unit `direction`.
    ///
    /// Returns the distance to the entry point (0 when the origin is inside).
    /// Axis-aligned rays produce infinite inverse components, which the
    /// min/max arithmetic absorbs.
    pub fn ray_intersection(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let inv_dir = direction.recip();

        let t1 = (self.min - origin) * inv_dir;
        let t2 = (self.max - origin) * inv_dir;

        let t_min = t1.x.min(t2.x).max(t1.y.min(t2.y)).max(t1.z.min(t2.z));
        let t_max = t1.x.max(t2.x).min(t1.y.max(t2.y)).min(t1.z.max(t2.z));

        if t_max >= t_min && t_max >= 0.0 {
            Some(t_min.max(0.0))
        } else {
            None
        }
    }
}
