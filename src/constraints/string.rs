use glam::Vec3;

use crate::collision::{BodyHandle, Contact};
use crate::constraints::Constraint;
use crate::dynamics::RigidBody;

/// An inextensible string between a body and a point in the world.
///
/// Slack below the string length generates nothing; only pulling taut
/// produces a contact.
#[derive(Debug, Clone, Copy)]
pub struct StringToWorld {
    /// The world point the string is anchored to.
    pub world_point: Vec3,
    /// The attachment point in the body's local space.
    pub local_point: Vec3,
    /// The body this string is attached to.
    pub body: BodyHandle,
    /// The length of the string.
    pub length: f32,
    /// Restitution of the generated contacts, between 0 and 1.
    pub restitution: f32,
}

impl StringToWorld {
    pub fn new(
        world_point: Vec3,
        local_point: Vec3,
        body: BodyHandle,
        length: f32,
        restitution: f32,
    ) -> Self {
        Self {
            world_point,
            local_point,
            body,
            length,
            restitution,
        }
    }
}

impl Constraint for StringToWorld {
    fn generate_contacts(&self, bodies: &[RigidBody], contacts: &mut [Contact]) -> usize {
        if contacts.is_empty() {
            return 0;
        }

        let body = &bodies[self.body.index()];
        let body_point = body.point_in_world(self.local_point);
        let dir = self.world_point - body_point;

        let length_sq = dir.length_squared();
        if length_sq <= self.length * self.length {
            return 0;
        }

        contacts[0] = Contact {
            bodies: [Some(self.body), None],
            point: body_point,
            normal: dir.normalize(),
            penetration: length_sq.sqrt() - self.length,
            friction: 0.0,
            restitution: (self.restitution + body.restitution) / 2.0,
        };
        1
    }
}

/// An inextensible string between two bodies.
#[derive(Debug, Clone, Copy)]
pub struct StringToBody {
    /// The attachment points, each in its body's local space.
    pub local_points: [Vec3; 2],
    /// The bodies involved in the constraint.
    pub bodies: [BodyHandle; 2],
    /// The length of the string.
    pub length: f32,
    /// Restitution of the generated contacts, between 0 and 1.
    pub restitution: f32,
}

impl StringToBody {
    pub fn new(
        local_points: [Vec3; 2],
        bodies: [BodyHandle; 2],
        length: f32,
        restitution: f32,
    ) -> Self {
        Self {
            local_points,
            bodies,
            length,
            restitution,
        }
    }
}

impl Constraint for StringToBody {
    fn generate_contacts(&self, bodies: &[RigidBody], contacts: &mut [Contact]) -> usize {
        if contacts.is_empty() {
            return 0;
        }

        let body0 = &bodies[self.bodies[0].index()];
        let body1 = &bodies[self.bodies[1].index()];
        let world_points = [
            body0.point_in_world(self.local_points[0]),
            body1.point_in_world(self.local_points[1]),
        ];
        let dir = world_points[1] - world_points[0];

        let length_sq = dir.length_squared();
        if length_sq <= self.length * self.length {
            return 0;
        }

        contacts[0] = Contact {
            bodies: [Some(self.bodies[0]), Some(self.bodies[1])],
            point: world_points[1],
            normal: dir.normalize(),
            penetration: length_sq.sqrt() - self.length,
            friction: 0.0,
            restitution: (self.restitution + body0.restitution + body1.restitution) / 3.0,
        };
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;

    fn sphere_at(handle: u32, position: Vec3) -> RigidBody {
        let mut body = RigidBody::new(Shape::sphere(1.0)).with_position(position);
        body.handle = BodyHandle::new(handle);
        body
    }

    #[test]
    fn test_slack_string_is_silent() {
        let bodies = vec![sphere_at(0, Vec3::new(0.0, -1.0, 0.0))];
        let string = StringToWorld::new(Vec3::ZERO, Vec3::ZERO, BodyHandle::new(0), 2.0, 0.4);

        let mut contacts = [Contact::default(); 1];
        assert_eq!(string.generate_contacts(&bodies, &mut contacts), 0);
    }

    #[test]
    fn test_string_at_length_is_silent() {
        let bodies = vec![sphere_at(0, Vec3::new(0.0, -2.0, 0.0))];
        let string = StringToWorld::new(Vec3::ZERO, Vec3::ZERO, BodyHandle::new(0), 2.0, 0.4);

        let mut contacts = [Contact::default(); 1];
        assert_eq!(string.generate_contacts(&bodies, &mut contacts), 0);
    }

    #[test]
    fn test_taut_string_pulls_back() {
        let bodies = vec![sphere_at(0, Vec3::new(0.0, -3.0, 0.0))];
        let string = StringToWorld::new(Vec3::ZERO, Vec3::ZERO, BodyHandle::new(0), 2.0, 0.4);

        let mut contacts = [Contact::default(); 1];
        assert_eq!(string.generate_contacts(&bodies, &mut contacts), 1);

        let c = &contacts[0];
        assert_eq!(c.bodies, [Some(BodyHandle::new(0)), None]);
        assert!((c.normal - Vec3::Y).length() < 1e-6);
        assert!((c.penetration - 1.0).abs() < 1e-5);
        assert!((c.restitution - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_string_between_bodies() {
        let bodies = vec![
            sphere_at(0, Vec3::ZERO),
            sphere_at(1, Vec3::new(0.0, -3.0, 0.0)),
        ];
        let string = StringToBody::new(
            [Vec3::ZERO, Vec3::ZERO],
            [BodyHandle::new(0), BodyHandle::new(1)],
            2.0,
            0.6,
        );

        let mut contacts = [Contact::default(); 1];
        assert_eq!(string.generate_contacts(&bodies, &mut contacts), 1);

        let c = &contacts[0];
        assert_eq!(c.bodies, [Some(BodyHandle::new(0)), Some(BodyHandle::new(1))]);
        assert!((c.point - Vec3::new(0.0, -3.0, 0.0)).length() < 1e-6);
        assert!((c.normal + Vec3::Y).length() < 1e-6);
        assert!((c.restitution - 0.2).abs() < 1e-6);
    }
}
