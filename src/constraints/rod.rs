use glam::Vec3;

use crate::collision::{BodyHandle, Contact};
use crate::constraints::Constraint;
use crate::dynamics::RigidBody;

/// Tolerance under which the attachment distance counts as equal to the
/// rod length.
const LENGTH_TOLERANCE: f32 = 1e-5;

/// A rigid link of fixed length between a body and a point in the world.
///
/// Generates a contact whenever the attachment drifts off the rod length,
/// in either direction.
#[derive(Debug, Clone, Copy)]
pub struct RodToWorld {
    /// The length of the rod.
    pub length: f32,
    /// The body this rod is attached to.
    pub body: BodyHandle,
    /// The attachment point in the body's local space.
    pub local_point: Vec3,
    /// The world point the rod is anchored to.
    pub world_point: Vec3,
}

impl RodToWorld {
    pub fn new(length: f32, body: BodyHandle, local_point: Vec3, world_point: Vec3) -> Self {
        Self {
            length,
            body,
            local_point,
            world_point,
        }
    }
}

impl Constraint for RodToWorld {
    fn generate_contacts(&self, bodies: &[RigidBody], contacts: &mut [Contact]) -> usize {
        if contacts.is_empty() {
            return 0;
        }

        let body_point = bodies[self.body.index()].point_in_world(self.local_point);
        let dir = self.world_point - body_point;

        let length_sq = dir.length_squared();
        if (length_sq - self.length * self.length).abs() <= LENGTH_TOLERANCE {
            return 0;
        }

        contacts[0] = Contact {
            bodies: [Some(self.body), None],
            point: body_point,
            normal: dir.normalize(),
            penetration: length_sq.sqrt() - self.length,
            friction: 0.0,
            restitution: 0.0,
        };
        1
    }
}

/// A rigid link of fixed length between two bodies.
#[derive(Debug, Clone, Copy)]
pub struct RodToBody {
    /// The length of the rod.
    pub length: f32,
    /// The bodies involved in the constraint.
    pub bodies: [BodyHandle; 2],
    /// The attachment points, each in its body's local space.
    pub local_points: [Vec3; 2],
}

impl RodToBody {
    pub fn new(
        length: f32,
        body0: BodyHandle,
        body1: BodyHandle,
        local_point0: Vec3,
        local_point1: Vec3,
    ) -> Self {
        Self {
            length,
            bodies: [body0, body1],
            local_points: [local_point0, local_point1],
        }
    }
}

impl Constraint for RodToBody {
    fn generate_contacts(&self, bodies: &[RigidBody], contacts: &mut [Contact]) -> usize {
        if contacts.is_empty() {
            return 0;
        }

        let world_points = [
            bodies[self.bodies[0].index()].point_in_world(self.local_points[0]),
            bodies[self.bodies[1].index()].point_in_world(self.local_points[1]),
        ];
        let dir = world_points[0] - world_points[1];

        let length_sq = dir.length_squared();
        if (length_sq - self.length * self.length).abs() <= LENGTH_TOLERANCE {
            return 0;
        }

        contacts[0] = Contact {
            bodies: [Some(self.bodies[0]), Some(self.bodies[1])],
            point: world_points[0],
            normal: dir.normalize(),
            penetration: length_sq.sqrt() - self.length,
            friction: 0.0,
            restitution: 0.0,
        };
        1
    }
}
