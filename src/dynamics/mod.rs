mod forces;
mod rigid_body;

pub use forces::{
    AttractionCylinder, AttractionSphere, Buoyancy, ForceGenerator, Gravity, Spring,
};
pub use rigid_body::RigidBody;
