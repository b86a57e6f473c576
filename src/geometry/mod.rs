mod bounding_sphere;
mod shape;

pub use bounding_sphere::BoundingSphere;
pub use shape::{BoxShape, Shape, Sphere};
