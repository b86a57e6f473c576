use glam::Vec3;

use crate::collision::{Contact, ContactDerivedData};
use crate::dynamics::RigidBody;
use crate::error::PhysicsError;

/// Iteration cap shared by the penetration and velocity passes.
const RESOLUTION_ITERATIONS: usize = 50;

/// Resolves a batch of contacts against the body arena.
///
/// The world calls this once per step with every contact the narrowphase
/// and the constraints generated.
pub trait Dispatcher {
    /// Resolves `contacts`, mutating body positions, orientations and
    /// velocities in place.
    fn resolve_contacts(
        &self,
        contacts: &mut [Contact],
        bodies: &mut [RigidBody],
        dt: f32,
    ) -> Result<(), PhysicsError>;
}

/// The default dispatcher: a prioritized sequential-impulse resolver.
///
/// Two passes, each picking the worst remaining contact, resolving it and
/// propagating the change to every contact sharing a body: first
/// penetration depth, then closing velocity.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactResolver;

impl Dispatcher for ContactResolver {
    fn resolve_contacts(
        &self,
        contacts: &mut [Contact],
        bodies: &mut [RigidBody],
        dt: f32,
    ) -> Result<(), PhysicsError> {
        let mut derived = Vec::with_capacity(contacts.len());
        for contact in contacts.iter_mut() {
            derived.push(contact.calculate_derived_data(bodies, dt)?);
        }

        adjust_positions(contacts, &mut derived, bodies);
        adjust_velocities(contacts, &mut derived, bodies, dt);
        Ok(())
    }
}

/// Worst-first penetration resolution with propagation to contacts that
/// share a body with the one just resolved.
fn adjust_positions(
    contacts: &mut [Contact],
    derived: &mut [ContactDerivedData],
    bodies: &mut [RigidBody],
) {
    let mut linear_change = [Vec3::ZERO; 2];
    let mut angular_change = [Vec3::ZERO; 2];

    for _ in 0..RESOLUTION_ITERATIONS {
        let mut worst = contacts.len();
        let mut penetration = 0.0f32;
        for (i, contact) in contacts.iter().enumerate() {
            if contact.penetration > penetration {
                worst = i;
                penetration = contact.penetration;
            }
        }
        if worst == contacts.len() {
            break;
        }

        let worst_bodies = contacts[worst].bodies;
        let Some(handle0) = worst_bodies[0] else { continue };
        {
            let (body0, body1) = body_pair_mut(bodies, handle0.index(), worst_bodies[1]);
            contacts[worst].resolve_penetration(
                &derived[worst],
                body0,
                body1,
                &mut linear_change,
                &mut angular_change,
            );
        }

        for i in 0..contacts.len() {
            for b in 0..2 {
                let Some(handle) = contacts[i].bodies[b] else { continue };
                for d in 0..2 {
                    if Some(handle) == worst_bodies[d] {
                        let delta_position = angular_change[d]
                            .cross(derived[i].relative_contact_position[b])
                            + linear_change[d];

                        contacts[i].penetration += delta_position.dot(contacts[i].normal)
                            * (b as f32 * 2.0 - 1.0);
                    }
                }
            }
        }
    }
}

/// Worst-first velocity resolution, recomputing the desired delta
/// velocity of every contact that shares a body with the resolved one.
fn adjust_velocities(
    contacts: &mut [Contact],
    derived: &mut [ContactDerivedData],
    bodies: &mut [RigidBody],
    dt: f32,
) {
    let mut velocity_change = [Vec3::ZERO; 2];
    let mut rotation_change = [Vec3::ZERO; 2];

    for _ in 0..RESOLUTION_ITERATIONS {
        let mut worst = contacts.len();
        let mut delta_velocity = 0.0f32;
        for (i, data) in derived.iter().enumerate() {
            if data.desired_delta_velocity > delta_velocity {
                worst = i;
                delta_velocity = data.desired_delta_velocity;
            }
        }
        if worst == contacts.len() {
            break;
        }

        let worst_bodies = contacts[worst].bodies;
        let Some(handle0) = worst_bodies[0] else { continue };
        {
            let (body0, body1) = body_pair_mut(bodies, handle0.index(), worst_bodies[1]);
            contacts[worst].resolve_velocity(
                &derived[worst],
                body0,
                body1,
                &mut velocity_change,
                &mut rotation_change,
            );
        }

        for i in 0..contacts.len() {
            for b in 0..2 {
                let Some(handle) = contacts[i].bodies[b] else { continue };
                for d in 0..2 {
                    if Some(handle) == worst_bodies[d] {
                        let delta_velocity = velocity_change[d]
                            + rotation_change[d].cross(derived[i].relative_contact_position[b]);

                        let contact_delta =
                            derived[i].contact_to_world.transpose() * delta_velocity;
                        let sign = if b == 0 { 1.0 } else { -1.0 };
                        derived[i].contact_velocity += contact_delta * sign;

                        let contact = &mut contacts[i];
                        let Some(slot0) = contact.bodies[0] else { continue };
                        let body0 = &bodies[slot0.index()];
                        let body1 = contact.bodies[1].map(|h| &bodies[h.index()]);
                        contact.calculate_desired_delta_velocity(
                            &mut derived[i],
                            body0,
                            body1,
                            dt,
                        );
                    }
                }
            }
        }
    }
}

/// Splits the arena into a mutable borrow of the primary body and, when
/// present, the secondary body.
fn body_pair_mut(
    bodies: &mut [RigidBody],
    first: usize,
    second: Option<crate::collision::BodyHandle>,
) -> (&mut RigidBody, Option<&mut RigidBody>) {
    match second {
        None => (&mut bodies[first], None),
        Some(handle) => {
            let second = handle.index();
            debug_assert_ne!(first, second);
            if first < second {
                let (left, right) = bodies.split_at_mut(second);
                (&mut left[first], Some(&mut right[0]))
            } else {
                let (left, right) = bodies.split_at_mut(first);
                (&mut right[0], Some(&mut left[second]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::BodyHandle;
    use crate::geometry::Shape;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn sphere_at(position: Vec3, radius: f32) -> RigidBody {
        RigidBody::new(Shape::sphere(radius)).with_position(position)
    }

    #[test]
    fn test_touching_exactly_is_a_no_op() {
        // Two spheres in contact with zero penetration and no closing
        // velocity: the resolver must not move anything.
        let mut bodies = vec![
            sphere_at(Vec3::new(0.0, 2.0, 0.0), 1.0),
            sphere_at(Vec3::ZERO, 1.0),
        ];
        let mut contacts = [Contact {
            bodies: [Some(BodyHandle::new(0)), Some(BodyHandle::new(1))],
            point: Vec3::new(0.0, 1.0, 0.0),
            normal: Vec3::Y,
            penetration: 0.0,
            friction: 0.0,
            restitution: 1.0,
        }];

        ContactResolver
            .resolve_contacts(&mut contacts, &mut bodies, 0.016)
            .unwrap();

        assert!(vec_approx_eq(bodies[0].position, Vec3::new(0.0, 2.0, 0.0)));
        assert!(vec_approx_eq(bodies[1].position, Vec3::ZERO));
        assert!(vec_approx_eq(bodies[0].linear_velocity, Vec3::ZERO));
        assert!(vec_approx_eq(bodies[1].linear_velocity, Vec3::ZERO));
    }

    #[test]
    fn test_penetration_split_by_inertia() {
        // A 9.5-radius sphere centered at (0, 10, 0) over a unit sphere
        // at the origin: penetration 0.5, equal inverse masses. The
        // contact is dead-center so the split is purely linear.
        let mut bodies = vec![
            sphere_at(Vec3::new(0.0, 10.0, 0.0), 9.5),
            sphere_at(Vec3::ZERO, 1.0),
        ];
        let mut contacts = [Contact {
            bodies: [Some(BodyHandle::new(0)), Some(BodyHandle::new(1))],
            point: Vec3::new(0.0, 5.0, 0.0),
            normal: Vec3::Y,
            penetration: 0.5,
            friction: 0.0,
            restitution: 0.0,
        }];

        ContactResolver
            .resolve_contacts(&mut contacts, &mut bodies, 0.016)
            .unwrap();

        assert!(vec_approx_eq(bodies[0].position, Vec3::new(0.0, 10.25, 0.0)));
        assert!(vec_approx_eq(bodies[1].position, Vec3::new(0.0, -0.25, 0.0)));
    }

    #[test]
    fn test_restitution_one_swaps_velocities() {
        // Equal spheres in a head-on collision with restitution 1
        // exchange velocities.
        let mut bodies = vec![
            sphere_at(Vec3::new(0.0, 2.0, 0.0), 1.0)
                .with_velocity(Vec3::new(0.0, -1.0, 0.0)),
            sphere_at(Vec3::ZERO, 1.0).with_velocity(Vec3::new(0.0, 1.0, 0.0)),
        ];
        let mut contacts = [Contact {
            bodies: [Some(BodyHandle::new(0)), Some(BodyHandle::new(1))],
            point: Vec3::new(0.0, 1.0, 0.0),
            normal: Vec3::Y,
            penetration: 0.0,
            friction: 0.0,
            restitution: 1.0,
        }];

        ContactResolver
            .resolve_contacts(&mut contacts, &mut bodies, 0.016)
            .unwrap();

        assert!(vec_approx_eq(bodies[0].linear_velocity, Vec3::new(0.0, 1.0, 0.0)));
        assert!(vec_approx_eq(bodies[1].linear_velocity, Vec3::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn test_anchor_contact_moves_single_body() {
        // Contact against an immovable anchor: only the body moves, by
        // the full penetration.
        let mut bodies = vec![sphere_at(Vec3::new(0.0, 0.8, 0.0), 1.0)];
        let mut contacts = [Contact {
            bodies: [Some(BodyHandle::new(0)), None],
            point: Vec3::new(0.0, -0.2, 0.0),
            normal: Vec3::Y,
            penetration: 0.2,
            friction: 0.0,
            restitution: 0.0,
        }];

        ContactResolver
            .resolve_contacts(&mut contacts, &mut bodies, 0.016)
            .unwrap();

        assert!(vec_approx_eq(bodies[0].position, Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn test_both_immovable_is_an_error() {
        let mut bodies = vec![
            sphere_at(Vec3::new(0.0, 1.0, 0.0), 1.0).with_mass(0.0),
            sphere_at(Vec3::ZERO, 1.0).with_mass(0.0),
        ];
        let mut contacts = [Contact {
            bodies: [Some(BodyHandle::new(0)), Some(BodyHandle::new(1))],
            point: Vec3::new(0.0, 0.5, 0.0),
            normal: Vec3::Y,
            penetration: 1.0,
            friction: 0.0,
            restitution: 0.0,
        }];

        let result = ContactResolver.resolve_contacts(&mut contacts, &mut bodies, 0.016);
        assert_eq!(result, Err(PhysicsError::ImmovableContactPair));
    }

    #[test]
    fn test_immovable_body_stays_put() {
        // A dynamic sphere resting into an immovable one: only the
        // dynamic sphere is pushed out.
        let mut bodies = vec![
            sphere_at(Vec3::new(0.0, 1.8, 0.0), 1.0),
            sphere_at(Vec3::ZERO, 1.0).with_mass(0.0),
        ];
        let mut contacts = [Contact {
            bodies: [Some(BodyHandle::new(0)), Some(BodyHandle::new(1))],
            point: Vec3::new(0.0, 0.9, 0.0),
            normal: Vec3::Y,
            penetration: 0.2,
            friction: 0.0,
            restitution: 0.0,
        }];

        ContactResolver
            .resolve_contacts(&mut contacts, &mut bodies, 0.016)
            .unwrap();

        assert!(vec_approx_eq(bodies[1].position, Vec3::ZERO));
        assert!(vec_approx_eq(bodies[0].position, Vec3::new(0.0, 2.0, 0.0)));
    }
}
