//! Constraint pendulum example
//!
//! A ball on a rod anchored to the world, released from the side so it
//! swings under gravity.

use std::rc::Rc;
use tumble::prelude::*;

fn main() {
    println!("Tumble - Constraint Pendulum Example");
    println!("====================================\n");

    let mut world = World::default();

    let anchor = Vec3::new(0.0, 5.0, 0.0);
    let length = 3.0;

    // Start the bob off to the side, at rod length from the anchor.
    let bob = world.add_rigid_body(
        RigidBody::new(Shape::sphere(0.3))
            .with_position(anchor + Vec3::new(length, 0.0, 0.0))
            .with_mass(1.0),
    );
    world.add_force_generator(bob, Rc::new(Gravity::new(Vec3::new(0.0, -9.81, 0.0))));
    world.add_constraint(Rc::new(RodToWorld::new(length, bob, Vec3::ZERO, anchor)));

    println!("Anchor at {anchor:?}, rod length {length}");
    println!("Bob released at {:?}\n", anchor + Vec3::new(length, 0.0, 0.0));

    let dt = 1.0 / 60.0;
    let total_time = 6.0;
    let steps = (total_time / dt) as usize;

    for i in 0..steps {
        if let Err(err) = world.step(dt) {
            eprintln!("simulation failed: {err}");
            return;
        }

        if i % 30 == 0 {
            let body = match world.rigid_body(bob) {
                Some(body) => body,
                None => return,
            };
            let stretch = (body.position - anchor).length() - length;
            println!(
                "t={:.2}s: position=({:.3}, {:.3}, {:.3}), rod stretch={:+.4}",
                i as f32 * dt,
                body.position.x,
                body.position.y,
                body.position.z,
                stretch
            );
        }
    }

    let final_pos = world.rigid_body(bob).map(|b| b.position).unwrap_or(Vec3::ZERO);
    println!("\nFinal bob position: ({:.3}, {:.3}, {:.3})", final_pos.x, final_pos.y, final_pos.z);
}
