//! # Tumble
//!
//! A discrete-time 3D rigid body physics engine.
//!
//! ## Features
//!
//! - **Rigid Body Dynamics**: Full 3D rigid body simulation with linear and angular motion
//! - **Collision Detection**: Sphere and box primitives with SAT-based box-box contacts
//! - **Broad Phase**: Pluggable bounding-sphere broadphases (brute force, sweep and prune)
//! - **Contact Resolution**: Prioritized sequential-impulse resolver with friction and restitution
//! - **Constraints**: Rod, slider and string links expressed as contact generators
//! - **Force Generators**: Gravity, springs, buoyancy and attraction fields
//! - **Ray Queries**: World ray tests with pluggable hit collectors
//!
//! ## Quick Start
//!
//! ```rust
//! use std::rc::Rc;
//! use tumble::prelude::*;
//!
//! // Create a physics world
//! let mut world = World::default();
//!
//! // Create a static floor
//! let floor = world.add_rigid_body(
//!     RigidBody::new(Shape::cuboid(Vec3::new(10.0, 0.5, 10.0))).with_mass(0.0),
//! );
//!
//! // Create a dynamic ball pulled down by gravity
//! let ball = world.add_rigid_body(
//!     RigidBody::new(Shape::sphere(0.5))
//!         .with_position(Vec3::new(0.0, 5.0, 0.0))
//!         .with_mass(1.0),
//! );
//! world.add_force_generator(ball, Rc::new(Gravity::new(Vec3::new(0.0, -9.81, 0.0))));
//!
//! // Simulation loop
//! let dt = 1.0 / 60.0;
//! for _ in 0..600 {
//!     world.step(dt).unwrap();
//! }
//! let pos = world.rigid_body(ball).unwrap().position;
//! println!("Ball position: {pos:?}");
//! # let _ = floor;
//! ```

pub mod collision;
pub mod constraints;
pub mod dynamics;
mod error;
pub mod geometry;
pub mod ray;
pub mod solver;
mod world;

pub use error::PhysicsError;
pub use world::{CollisionCallback, World, WorldConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collision::{
        filter_allows, group, mask, BodyHandle, Broadphase, Contact, NaiveBroadphase,
        PotentialContact, SweepAndPrune,
    };
    pub use crate::constraints::{
        Constraint, RodToBody, RodToWorld, SliderToBody, SliderToWorld, StringToBody,
        StringToWorld,
    };
    pub use crate::dynamics::{
        AttractionCylinder, AttractionSphere, Buoyancy, ForceGenerator, Gravity, RigidBody,
        Spring,
    };
    pub use crate::error::PhysicsError;
    pub use crate::geometry::{BoundingSphere, BoxShape, Shape, Sphere};
    pub use crate::ray::{Ray, RayHit, RayResult, RayResultAll, RayResultAny, RayResultClosest};
    pub use crate::solver::{ContactResolver, Dispatcher};
    pub use crate::world::{World, WorldConfig};
    pub use glam::{Mat3, Quat, Vec3};
}
