//! Bouncing spheres example
//!
//! Drops a handful of spheres with different restitutions onto a floor
//! and prints how high each one bounces back.

use std::rc::Rc;
use tumble::prelude::*;

fn main() {
    println!("Tumble - Bouncing Spheres Example");
    println!("=================================\n");

    let mut world = World::default();
    let gravity = Rc::new(Gravity::new(Vec3::new(0.0, -9.81, 0.0)));

    // Static floor, top surface at Y=0.5.
    let _floor = world.add_rigid_body(
        RigidBody::new(Shape::cuboid(Vec3::new(20.0, 0.5, 20.0))).with_mass(0.0),
    );
    println!("Created floor at Y=0 (top surface at Y=0.5)");

    // One sphere per restitution value, spread along X.
    let restitutions = [0.2, 0.5, 0.8];
    let mut balls = Vec::new();
    for (i, &restitution) in restitutions.iter().enumerate() {
        let x = i as f32 * 3.0 - 3.0;
        let ball = world.add_rigid_body(
            RigidBody::new(Shape::sphere(0.5))
                .with_position(Vec3::new(x, 5.0, 0.0))
                .with_mass(1.0)
                .with_restitution(restitution),
        );
        world.add_force_generator(ball, Rc::clone(&gravity) as Rc<dyn ForceGenerator>);
        balls.push((ball, restitution));
        println!("Created ball at X={x:.1} with restitution {restitution}");
    }
    println!();

    let dt = 1.0 / 60.0;
    let total_time = 5.0;
    let steps = (total_time / dt) as usize;
    let mut peak_after_bounce = vec![0.0f32; balls.len()];
    let mut falling = vec![true; balls.len()];

    for i in 0..steps {
        if let Err(err) = world.step(dt) {
            eprintln!("simulation failed: {err}");
            return;
        }

        for (slot, (ball, _)) in balls.iter().enumerate() {
            let body = match world.rigid_body(*ball) {
                Some(body) => body,
                None => continue,
            };
            if falling[slot] && body.linear_velocity.y > 0.0 {
                falling[slot] = false;
            }
            if !falling[slot] {
                peak_after_bounce[slot] = peak_after_bounce[slot].max(body.position.y);
            }
        }

        if i % 60 == 0 {
            let heights: Vec<String> = balls
                .iter()
                .map(|(ball, _)| {
                    let y = world.rigid_body(*ball).map(|b| b.position.y).unwrap_or(0.0);
                    format!("{y:.2}")
                })
                .collect();
            println!("t={:.1}s: heights = [{}]", i as f32 * dt, heights.join(", "));
        }
    }

    println!();
    for (slot, (_, restitution)) in balls.iter().enumerate() {
        println!(
            "restitution {restitution}: first bounce peaked at Y={:.2}",
            peak_after_bounce[slot]
        );
    }
}
