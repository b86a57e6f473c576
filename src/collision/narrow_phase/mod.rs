mod box_box;
mod sphere;

pub use box_box::box_and_box;
pub use sphere::{sphere_and_box, sphere_and_sphere};

use crate::collision::filter::filter_allows;
use crate::collision::{Contact, PotentialContact};
use crate::dynamics::RigidBody;
use crate::geometry::Shape;

/// Runs the shape-pair detectors over the broadphase candidates, writing
/// contacts until the buffer is full.
///
/// Pairs rejected by the group/mask filter are skipped. Returns the
/// number of contacts written.
pub fn resolve_potential_contacts(
    potentials: &[PotentialContact],
    bodies: &[RigidBody],
    contacts: &mut [Contact],
) -> usize {
    let mut generated = 0;
    for potential in potentials {
        if generated == contacts.len() {
            return generated;
        }

        let body1 = &bodies[potential.bodies[0].index()];
        let body2 = &bodies[potential.bodies[1].index()];

        if !filter_allows(body1.group, body1.mask, body2.group, body2.mask) {
            continue;
        }

        let out = &mut contacts[generated..];
        generated += match (&body1.shape, &body2.shape) {
            (Shape::Sphere(s1), Shape::Sphere(s2)) => {
                sphere_and_sphere(body1, s1, body2, s2, out)
            }
            (Shape::Sphere(s), Shape::Box(b)) => sphere_and_box(body1, s, body2, b, out),
            (Shape::Box(b), Shape::Sphere(s)) => sphere_and_box(body2, s, body1, b, out),
            (Shape::Box(b1), Shape::Box(b2)) => box_and_box(body1, b1, body2, b2, out),
        };
    }
    generated
}
