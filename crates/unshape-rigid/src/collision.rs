//! Collision records and narrow-phase tests.
//!
//! Pairwise tests between box and sphere shapes, returning `Collision`
//! records with normals pointing from body A toward body B.

use glam::Vec3;

use crate::collider::Aabb;
use crate::{BodyHandle, ColliderHandle};

/// A contact between two colliders, valid for a single detection pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    /// Body owning the first collider.
    pub body_a: BodyHandle,
    /// Body owning the second collider.
    pub body_b: BodyHandle,
    /// First collider.
    pub collider_a: ColliderHandle,
    /// Second collider.
    pub collider_b: ColliderHandle,
    /// Contact point in world space.
    pub point: Vec3,
    /// Contact normal (from A to B).
    pub normal: Vec3,
    /// Penetration depth, positive while overlapping.
    pub penetration: f32,
    /// Whether either collider is a trigger.
    pub is_trigger: bool,
}

impl Collision {
    /// Flip a collision to swap bodies and invert normal.
    ///
    /// Used to handle symmetric pairs (sphere-box vs box-sphere).
    #[inline]
    pub fn flip(mut self) -> Self {
        self.normal = -self.normal;
        std::mem::swap(&mut self.body_a, &mut self.body_b);
        std::mem::swap(&mut self.collider_a, &mut self.collider_b);
        self
    }

    pub(crate) fn with_trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }
}

/// One side of a narrow-phase test.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Participant {
    pub body: BodyHandle,
    pub collider: ColliderHandle,
    pub position: Vec3,
}

fn contact(a: Participant, b: Participant, point: Vec3, normal: Vec3, penetration: f32) -> Collision {
    Collision {
        body_a: a.body,
        body_b: b.body,
        collider_a: a.collider,
        collider_b: b.collider,
        point,
        normal,
        penetration,
        is_trigger: false,
    }
}

/// Box-box test on world AABBs (orientation ignored).
///
/// The axis of least overlap is the normal; ties go to x, then y, then z.
/// The contact point is the midpoint of the two centers.
pub(crate) fn box_box(a: Participant, he_a: Vec3, b: Participant, he_b: Vec3) -> Option<Collision> {
    let box_a = Aabb::from_center_half_extents(a.position, he_a);
    let box_b = Aabb::from_center_half_extents(b.position, he_b);
    let overlap = box_a.overlap(&box_b);

    if overlap.x <= 0.0 || overlap.y <= 0.0 || overlap.z <= 0.0 {
        return None;
    }

    let (mut normal, penetration) = if overlap.x <= overlap.y && overlap.x <= overlap.z {
        (Vec3::X, overlap.x)
    } else if overlap.y <= overlap.z {
        (Vec3::Y, overlap.y)
    } else {
        (Vec3::Z, overlap.z)
    };

    if normal.dot(b.position - a.position) < 0.0 {
        normal = -normal;
    }

    let point = (a.position + b.position) * 0.5;
    Some(contact(a, b, point, normal, penetration))
}

/// Box-sphere test with the box as body A.
///
/// The normal is zero when the sphere center lies inside the box.
pub(crate) fn box_sphere(
    a: Participant,
    half_extents: Vec3,
    b: Participant,
    radius: f32,
) -> Option<Collision> {
    let bounds = Aabb::from_center_half_extents(a.position, half_extents);
    let closest = bounds.clamp_point(b.position);
    let offset = b.position - closest;
    let distance = offset.length();

    if distance >= radius {
        return None;
    }

    let normal = offset.normalize_or_zero();
    Some(contact(a, b, closest, normal, radius - distance))
}

/// Sphere-sphere test.
pub(crate) fn sphere_sphere(
    a: Participant,
    radius_a: f32,
    b: Participant,
    radius_b: f32,
) -> Option<Collision> {
    let d = b.position - a.position;
    let distance = d.length();
    let radius_sum = radius_a + radius_b;

    if distance >= radius_sum {
        return None;
    }

    let normal = d.normalize_or_zero();
    let penetration = radius_sum - distance;
    let point = a.position + normal * (radius_a - penetration * 0.5);
    Some(contact(a, b, point, normal, penetration))
}
