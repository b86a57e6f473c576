//! Constraints expressed as contact generators.
//!
//! A constraint inspects body state and, when violated, emits contacts
//! that the resolver corrects alongside the collision contacts.

mod rod;
mod slider;
mod string;

pub use rod::{RodToBody, RodToWorld};
pub use slider::{SliderToBody, SliderToWorld};
pub use string::{StringToBody, StringToWorld};

use crate::collision::Contact;
use crate::dynamics::RigidBody;

/// A source of constraint contacts.
///
/// `generate_contacts` is given a buffer with at least one free slot and
/// returns how many contacts it wrote. Implementations must never write
/// past the buffer.
pub trait Constraint {
    fn generate_contacts(&self, bodies: &[RigidBody], contacts: &mut [Contact]) -> usize;
}
