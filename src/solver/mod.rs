//! Contact resolution.

mod resolver;

pub use resolver::{ContactResolver, Dispatcher};
