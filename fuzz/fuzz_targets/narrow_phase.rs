#![no_main]

use glam::Vec3;
use libfuzzer_sys::fuzz_target;
use unshape_rigid::{Aabb, Collider, PhysicsWorld, RigidBody};

fuzz_target!(|data: [f32; 10]| {
    // Detection, resolution and queries should never panic, whatever the geometry.
    let mut world = PhysicsWorld::default();

    let a = world.create_body(RigidBody::new(data[0]).with_position(Vec3::new(data[1], data[2], data[3])));
    let b = world.create_body(RigidBody::new(1.0).with_position(Vec3::new(data[4], data[5], data[6])));
    let shape_a = world.create_collider(Collider::cuboid(a, Vec3::splat(data[7].abs())));
    let shape_b = world.create_collider(Collider::sphere(b, data[8]));
    let _ = world.add_collider(shape_a);
    let _ = world.add_collider(shape_b);

    world.step(data[9]);
    let _ = world.raycast(Vec3::ZERO, Vec3::new(data[1], data[5], data[9]), f32::MAX);
    let _ = world.query_aabb(&Aabb::new(Vec3::splat(-data[9]), Vec3::splat(data[9])));
});
