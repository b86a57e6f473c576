pub mod broad_phase;
mod contact;
mod filter;
pub mod narrow_phase;

pub use broad_phase::{Broadphase, NaiveBroadphase, SweepAndPrune};
pub use contact::{BodyHandle, Contact, PotentialContact};
pub use filter::{filter_allows, group, mask};
pub use narrow_phase::resolve_potential_contacts;

pub(crate) use contact::ContactDerivedData;
