use glam::{Mat3, Vec3};

use crate::dynamics::RigidBody;
use crate::error::PhysicsError;

/// Contact velocities below this limit have their restitution removed, so
/// resting contacts do not jitter.
pub(crate) const VELOCITY_LIMIT: f32 = 0.25;

/// Small-angle clamp applied to angular position corrections.
pub(crate) const ANGULAR_LIMIT: f32 = 0.2;

/// A handle to a body in the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u32);

impl BodyHandle {
    /// Invalid/null body handle
    pub const INVALID: Self = Self(u32::MAX);

    /// Creates a new body handle.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index of this handle.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns true if this handle is valid.
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for BodyHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

/// A pair of bodies whose bounding volumes overlap, produced by the
/// broadphase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PotentialContact {
    /// The overlapping bodies
    pub bodies: [BodyHandle; 2],
}

/// A single point of contact between a body and either another body or an
/// immovable anchor.
///
/// The normal always points from the body in slot 1 toward the body in
/// slot 0. A `None` in slot 1 means the contact is against something that
/// cannot move, like a constraint anchor.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// The participating bodies
    pub bodies: [Option<BodyHandle>; 2],
    /// Contact point in world space
    pub point: Vec3,
    /// Unit contact normal in world space
    pub normal: Vec3,
    /// Penetration depth, positive when overlapping
    pub penetration: f32,
    /// Friction used when resolving this contact
    pub friction: f32,
    /// Restitution used when resolving this contact
    pub restitution: f32,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            bodies: [None, None],
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            penetration: 0.0,
            friction: 0.0,
            restitution: 0.0,
        }
    }
}

/// Per-contact data derived at the start of resolution.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ContactDerivedData {
    /// Basis matrix whose X column is the contact normal
    pub contact_to_world: Mat3,
    /// Contact point relative to each body's center
    pub relative_contact_position: [Vec3; 2],
    /// Closing velocity in contact space
    pub contact_velocity: Vec3,
    /// Velocity change the resolver should produce along the normal
    pub desired_delta_velocity: f32,
}

impl Contact {
    /// Normalizes the body slots: slot 0 always holds a movable body and
    /// the normal points toward it.
    ///
    /// Immovable bodies are dropped from the contact. A contact whose
    /// bodies are both immovable (or both absent) is a setup error.
    pub(crate) fn swap_if_needed(&mut self, bodies: &[RigidBody]) -> Result<(), PhysicsError> {
        if self.bodies[0].is_none() {
            self.normal = -self.normal;
            self.bodies.swap(0, 1);
        }
        let slot0 = self.bodies[0].ok_or(PhysicsError::ImmovableContactPair)?;

        let slot1_immovable = self.bodies[1]
            .map(|h| bodies[h.index()].inv_mass == 0.0)
            .unwrap_or(false);
        if slot1_immovable {
            self.bodies[1] = None;
            if bodies[slot0.index()].inv_mass == 0.0 {
                return Err(PhysicsError::ImmovableContactPair);
            }
        } else if bodies[slot0.index()].inv_mass == 0.0 {
            self.bodies[0] = None;
            if self.bodies[1].is_none() {
                return Err(PhysicsError::ImmovableContactPair);
            }
            self.normal = -self.normal;
            self.bodies.swap(0, 1);
        }
        Ok(())
    }

    /// Computes the resolution data for this contact and removes the
    /// restitution if the closing velocity is below [`VELOCITY_LIMIT`].
    pub(crate) fn calculate_derived_data(
        &mut self,
        bodies: &[RigidBody],
        dt: f32,
    ) -> Result<ContactDerivedData, PhysicsError> {
        self.swap_if_needed(bodies)?;

        let contact_to_world = self.calculate_contact_to_world();

        let body0 = &bodies[self.bodies[0].ok_or(PhysicsError::ImmovableContactPair)?.index()];
        let body1 = self.bodies[1].map(|h| &bodies[h.index()]);

        let mut relative_contact_position = [Vec3::ZERO; 2];
        relative_contact_position[0] = self.point - body0.position;
        if let Some(b1) = body1 {
            relative_contact_position[1] = self.point - b1.position;
        }

        let mut contact_velocity = local_velocity(
            body0,
            relative_contact_position[0],
            &contact_to_world,
            dt,
        );
        if let Some(b1) = body1 {
            contact_velocity -=
                local_velocity(b1, relative_contact_position[1], &contact_to_world, dt);
        }

        let mut data = ContactDerivedData {
            contact_to_world,
            relative_contact_position,
            contact_velocity,
            desired_delta_velocity: 0.0,
        };
        self.calculate_desired_delta_velocity(&mut data, body0, body1, dt);
        Ok(data)
    }

    /// Builds an orthonormal basis with the contact normal as its X axis.
    pub(crate) fn calculate_contact_to_world(&self) -> Mat3 {
        let normal = self.normal;
        let mut tangent0 = Vec3::ZERO;
        let mut tangent1 = Vec3::ZERO;

        if normal.x.abs() > normal.y.abs() {
            let s = 1.0 / (normal.z * normal.z + normal.x * normal.x).sqrt();

            tangent0.x = normal.z * s;
            tangent0.y = 0.0;
            tangent0.z = -normal.x * s;

            tangent1.x = normal.y * tangent0.z;
            tangent1.y = normal.z * tangent0.x - normal.x * tangent0.z;
            tangent1.z = -normal.y * tangent0.x;
        } else {
            let s = 1.0 / (normal.z * normal.z + normal.y * normal.y).sqrt();

            tangent0.x = 0.0;
            tangent0.y = -normal.z * s;
            tangent0.z = normal.y * s;

            tangent1.x = normal.y * tangent0.z - normal.z * tangent0.y;
            tangent1.y = -normal.x * tangent0.z;
            tangent1.z = normal.x * tangent0.y;
        }

        Mat3::from_cols(normal, tangent0, tangent1)
    }

    /// Recomputes the desired delta velocity from the current contact
    /// velocity, zeroing the restitution for slow contacts.
    pub(crate) fn calculate_desired_delta_velocity(
        &mut self,
        data: &mut ContactDerivedData,
        body0: &RigidBody,
        body1: Option<&RigidBody>,
        dt: f32,
    ) {
        // Velocity accumulated from acceleration this frame, removed so
        // resting contacts do not bounce on gravity alone.
        let mut velocity_from_acc = body0.last_frame_acceleration.dot(self.normal) * dt;
        if let Some(b1) = body1 {
            velocity_from_acc = b1.last_frame_acceleration.dot(self.normal) * dt;
        }

        if data.contact_velocity.x.abs() < VELOCITY_LIMIT {
            self.restitution = 0.0;
        }

        data.desired_delta_velocity = -data.contact_velocity.x
            - self.restitution * (data.contact_velocity.x - velocity_from_acc);
    }

    /// Applies the impulse that removes the desired delta velocity,
    /// recording the velocity and rotation changes for propagation.
    pub(crate) fn resolve_velocity(
        &self,
        data: &ContactDerivedData,
        body0: &mut RigidBody,
        body1: Option<&mut RigidBody>,
        velocity_change: &mut [Vec3; 2],
        rotation_change: &mut [Vec3; 2],
    ) {
        // Separating bodies keep separating.
        if data.desired_delta_velocity <= 0.0 {
            return;
        }

        let inertia_tensors = [
            body0.inv_inertia_world,
            body1.as_ref().map(|b| b.inv_inertia_world).unwrap_or(Mat3::ZERO),
        ];

        let impulse_contact = if self.friction == 0.0 {
            self.frictionless_impulse(data, body0, body1.as_deref(), &inertia_tensors)
        } else {
            self.friction_impulse(data, body0, body1.as_deref(), &inertia_tensors)
        };
        let impulse = data.contact_to_world * impulse_contact;

        let impulsive_torque = data.relative_contact_position[0].cross(impulse);
        rotation_change[0] = inertia_tensors[0] * impulsive_torque;
        velocity_change[0] = impulse * body0.inv_mass;

        body0.linear_velocity += velocity_change[0];
        body0.angular_velocity += rotation_change[0];

        if let Some(b1) = body1 {
            let impulsive_torque = impulse.cross(data.relative_contact_position[1]);
            rotation_change[1] = inertia_tensors[1] * impulsive_torque;
            velocity_change[1] = impulse * -b1.inv_mass;

            b1.linear_velocity += velocity_change[1];
            b1.angular_velocity += rotation_change[1];
        }
    }

    /// Moves the bodies apart along the normal in proportion to their
    /// linear and angular inertia, recording the changes for propagation.
    pub(crate) fn resolve_penetration(
        &self,
        data: &ContactDerivedData,
        body0: &mut RigidBody,
        body1: Option<&mut RigidBody>,
        linear_change: &mut [Vec3; 2],
        angular_change: &mut [Vec3; 2],
    ) {
        let mut pair = [Some(body0), body1];

        let mut linear_inertia = [0.0f32; 2];
        let mut angular_inertia = [0.0f32; 2];
        let mut total_inertia = 0.0f32;

        for (i, slot) in pair.iter().enumerate() {
            if let Some(body) = slot {
                // Same construction as the frictionless impulse, reduced
                // to the normal direction.
                let mut angular_inertia_world =
                    data.relative_contact_position[i].cross(self.normal);
                angular_inertia_world = body.inv_inertia_world * angular_inertia_world;
                angular_inertia_world =
                    angular_inertia_world.cross(data.relative_contact_position[i]);
                angular_inertia[i] = angular_inertia_world.dot(self.normal);

                linear_inertia[i] = body.inv_mass;
                total_inertia += linear_inertia[i] + angular_inertia[i];
            }
        }

        let inverse_inertia = 1.0 / total_inertia;

        for (i, slot) in pair.iter_mut().enumerate() {
            let Some(body) = slot else { continue };

            let sign = if i == 1 { -1.0 } else { 1.0 };
            let mut angular_move = sign * self.penetration * angular_inertia[i] * inverse_inertia;
            let mut linear_move = sign * self.penetration * linear_inertia[i] * inverse_inertia;

            // Limit the angular projection for bodies with a large mass
            // but a small inertia tensor.
            let projection = data.relative_contact_position[i]
                - self.normal * data.relative_contact_position[i].dot(self.normal);
            let max_magnitude = ANGULAR_LIMIT * projection.length();

            if angular_move < -max_magnitude {
                let total_move = angular_move + linear_move;
                angular_move = -max_magnitude;
                linear_move = total_move - angular_move;
            } else if angular_move > max_magnitude {
                let total_move = angular_move + linear_move;
                angular_move = max_magnitude;
                linear_move = total_move - angular_move;
            }

            if angular_move == 0.0 {
                angular_change[i] = Vec3::ZERO;
            } else {
                let target_direction = data.relative_contact_position[i].cross(self.normal);
                angular_change[i] = (body.inv_inertia_world * target_direction)
                    * (angular_move / angular_inertia[i] / 10.0);
            }

            linear_change[i] = self.normal * linear_move;

            body.position += self.normal * linear_move;
            body.add_scaled_orientation(angular_change[i], 1.0);

            // Reflect the moves in the derived data so the next detection
            // round does not see the same penetration.
            body.calculate_derived_data();
        }
    }

    fn frictionless_impulse(
        &self,
        data: &ContactDerivedData,
        body0: &RigidBody,
        body1: Option<&RigidBody>,
        inertia_tensors: &[Mat3; 2],
    ) -> Vec3 {
        // Velocity change in world space per unit of impulse along the
        // contact normal.
        let mut delta_vel_world = data.relative_contact_position[0].cross(self.normal);
        delta_vel_world = inertia_tensors[0] * delta_vel_world;
        delta_vel_world = delta_vel_world.cross(data.relative_contact_position[0]);

        let mut delta_velocity = delta_vel_world.dot(self.normal);
        delta_velocity += body0.inv_mass;

        if let Some(b1) = body1 {
            let mut delta_vel_world = data.relative_contact_position[1].cross(self.normal);
            delta_vel_world = inertia_tensors[1] * delta_vel_world;
            delta_vel_world = delta_vel_world.cross(data.relative_contact_position[1]);

            delta_velocity += delta_vel_world.dot(self.normal);
            delta_velocity += b1.inv_mass;
        }

        Vec3::new(data.desired_delta_velocity / delta_velocity, 0.0, 0.0)
    }

    fn friction_impulse(
        &self,
        data: &ContactDerivedData,
        body0: &RigidBody,
        body1: Option<&RigidBody>,
        inertia_tensors: &[Mat3; 2],
    ) -> Vec3 {
        let mut inverse_mass = body0.inv_mass;

        let mut impulse_to_torque = skew_symmetric(data.relative_contact_position[0]);
        let mut delta_vel_world = impulse_to_torque * inertia_tensors[0] * impulse_to_torque * -1.0;

        if let Some(b1) = body1 {
            impulse_to_torque = skew_symmetric(data.relative_contact_position[1]);
            let delta_vel_world2 = impulse_to_torque * inertia_tensors[1] * impulse_to_torque * -1.0;

            delta_vel_world += delta_vel_world2;
            inverse_mass += b1.inv_mass;
        }

        // Change to contact coordinates and add the linear response on
        // the diagonal.
        let mut delta_velocity =
            data.contact_to_world.transpose() * delta_vel_world * data.contact_to_world;
        delta_velocity.x_axis.x += inverse_mass;
        delta_velocity.y_axis.y += inverse_mass;
        delta_velocity.z_axis.z += inverse_mass;

        let impulse_matrix = delta_velocity.inverse();

        let vel_kill = Vec3::new(
            data.desired_delta_velocity,
            -data.contact_velocity.y,
            -data.contact_velocity.z,
        );

        let mut impulse_contact = impulse_matrix * vel_kill;

        let planar_impulse =
            (impulse_contact.y * impulse_contact.y + impulse_contact.z * impulse_contact.z).sqrt();

        // Outside the friction cone: clamp to sliding friction.
        // The abs covers -0.0.
        if planar_impulse > (impulse_contact.x * self.friction).abs() {
            impulse_contact.y /= planar_impulse;
            impulse_contact.z /= planar_impulse;

            impulse_contact.x = delta_velocity.x_axis.x
                + delta_velocity.y_axis.x * self.friction * impulse_contact.y
                + delta_velocity.z_axis.x * self.friction * impulse_contact.z;

            impulse_contact.x = data.desired_delta_velocity / impulse_contact.x;
            impulse_contact.y *= self.friction * impulse_contact.x;
            impulse_contact.z *= self.friction * impulse_contact.x;
        }

        impulse_contact
    }
}

fn local_velocity(body: &RigidBody, relative_position: Vec3, basis: &Mat3, dt: f32) -> Vec3 {
    let velocity = body.angular_velocity.cross(relative_position) + body.linear_velocity;
    let contact_velocity = basis.transpose() * velocity;

    // Planar velocity due to this frame's forces; with enough friction it
    // is removed during velocity resolution.
    let mut acc_velocity = basis.transpose() * (body.last_frame_acceleration * dt);
    acc_velocity.x = 0.0;

    contact_velocity + acc_velocity
}

fn skew_symmetric(v: Vec3) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(0.0, v.z, -v.y),
        Vec3::new(-v.z, 0.0, v.x),
        Vec3::new(v.y, -v.x, 0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_contact_basis_is_orthonormal() {
        let normals = [
            Vec3::Y,
            Vec3::X,
            Vec3::Z,
            Vec3::new(1.0, 2.0, 3.0).normalize(),
            Vec3::new(-0.3, 0.1, 0.9).normalize(),
        ];
        for normal in normals {
            let contact = Contact {
                normal,
                ..Contact::default()
            };
            let basis = contact.calculate_contact_to_world();
            assert!(vec_approx_eq(basis.x_axis, normal));
            assert!(basis.x_axis.dot(basis.y_axis).abs() < 1e-5);
            assert!(basis.x_axis.dot(basis.z_axis).abs() < 1e-5);
            assert!(basis.y_axis.dot(basis.z_axis).abs() < 1e-5);
            assert!((basis.y_axis.length() - 1.0).abs() < 1e-5);
            assert!((basis.z_axis.length() - 1.0).abs() < 1e-5);
            // The second tangent is the cross product of the other two.
            assert!(vec_approx_eq(basis.z_axis, basis.x_axis.cross(basis.y_axis)));
        }
    }

    #[test]
    fn test_swap_moves_anchor_to_slot_one() {
        let bodies = vec![RigidBody::new(Shape::sphere(1.0))];
        let mut contact = Contact {
            bodies: [None, Some(BodyHandle::new(0))],
            normal: Vec3::Y,
            ..Contact::default()
        };

        contact.swap_if_needed(&bodies).unwrap();
        assert_eq!(contact.bodies[0], Some(BodyHandle::new(0)));
        assert_eq!(contact.bodies[1], None);
        assert_eq!(contact.normal, -Vec3::Y);
    }

    #[test]
    fn test_swap_drops_immovable_body() {
        let bodies = vec![
            RigidBody::new(Shape::sphere(1.0)).with_mass(0.0),
            RigidBody::new(Shape::sphere(1.0)),
        ];
        let mut contact = Contact {
            bodies: [Some(BodyHandle::new(0)), Some(BodyHandle::new(1))],
            normal: Vec3::Y,
            ..Contact::default()
        };

        contact.swap_if_needed(&bodies).unwrap();
        assert_eq!(contact.bodies[0], Some(BodyHandle::new(1)));
        assert_eq!(contact.bodies[1], None);
        assert_eq!(contact.normal, -Vec3::Y);
    }

    #[test]
    fn test_swap_both_immovable_is_error() {
        let bodies = vec![
            RigidBody::new(Shape::sphere(1.0)).with_mass(0.0),
            RigidBody::new(Shape::sphere(1.0)).with_mass(0.0),
        ];
        let mut contact = Contact {
            bodies: [Some(BodyHandle::new(0)), Some(BodyHandle::new(1))],
            normal: Vec3::Y,
            ..Contact::default()
        };

        assert_eq!(
            contact.swap_if_needed(&bodies),
            Err(PhysicsError::ImmovableContactPair)
        );
    }

    #[test]
    fn test_slow_contact_loses_restitution() {
        let bodies = vec![RigidBody::new(Shape::sphere(1.0))];
        let mut contact = Contact {
            bodies: [Some(BodyHandle::new(0)), None],
            normal: Vec3::Y,
            restitution: 1.0,
            ..Contact::default()
        };

        let data = contact.calculate_derived_data(&bodies, 0.016).unwrap();
        assert_eq!(contact.restitution, 0.0);
        assert_eq!(data.desired_delta_velocity, 0.0);
    }

    #[test]
    fn test_fast_contact_keeps_restitution() {
        let bodies = vec![RigidBody::new(Shape::sphere(1.0)).with_velocity(Vec3::new(0.0, -2.0, 0.0))];
        let mut contact = Contact {
            bodies: [Some(BodyHandle::new(0)), None],
            point: Vec3::new(0.0, -1.0, 0.0),
            normal: Vec3::Y,
            restitution: 0.5,
            ..Contact::default()
        };

        let data = contact.calculate_derived_data(&bodies, 0.016).unwrap();
        assert_eq!(contact.restitution, 0.5);
        // closing at -2, bounce adds half of it back
        assert!((data.desired_delta_velocity - 3.0).abs() < 1e-5);
    }
}
