use glam::Vec3;

use crate::collision::{BodyHandle, Contact};
use crate::constraints::Constraint;
use crate::dynamics::RigidBody;

/// A link that can slide freely between a minimum and a maximum length,
/// anchored to a point in the world.
///
/// Inside the bounds no contact is generated. The bounds are exclusive:
/// sitting exactly on either one is still inside.
#[derive(Debug, Clone, Copy)]
pub struct SliderToWorld {
    /// The world point the slider is anchored to.
    pub world_point: Vec3,
    /// The attachment point in the body's local space.
    pub local_point: Vec3,
    /// The body this slider is attached to.
    pub body: BodyHandle,
    /// Minimum allowed distance. Must be smaller than `max_length`.
    pub min_length: f32,
    /// Maximum allowed distance.
    pub max_length: f32,
    /// Restitution of the generated contacts, between 0 and 1.
    pub restitution: f32,
}

impl SliderToWorld {
    pub fn new(
        world_point: Vec3,
        local_point: Vec3,
        body: BodyHandle,
        min_length: f32,
        max_length: f32,
        restitution: f32,
    ) -> Self {
        Self {
            world_point,
            local_point,
            body,
            min_length,
            max_length,
            restitution,
        }
    }
}

impl Constraint for SliderToWorld {
    fn generate_contacts(&self, bodies: &[RigidBody], contacts: &mut [Contact]) -> usize {
        if contacts.is_empty() {
            return 0;
        }

        let body = &bodies[self.body.index()];
        let body_point = body.point_in_world(self.local_point);
        let dir = self.world_point - body_point;
        let length_sq = dir.length_squared();

        if length_sq > self.max_length * self.max_length {
            contacts[0] = Contact {
                bodies: [Some(self.body), None],
                point: body_point,
                normal: dir.normalize(),
                penetration: length_sq.sqrt() - self.max_length,
                friction: 0.0,
                restitution: (self.restitution + body.restitution) / 2.0,
            };
            return 1;
        }

        if length_sq < self.min_length * self.min_length {
            contacts[0] = Contact {
                bodies: [Some(self.body), None],
                point: body_point,
                // point away from the anchor
                normal: -dir.normalize(),
                penetration: length_sq.sqrt() - self.min_length,
                friction: 0.0,
                restitution: (self.restitution + body.restitution) / 2.0,
            };
            return 1;
        }
        0
    }
}

/// A slider between two bodies.
#[derive(Debug, Clone, Copy)]
pub struct SliderToBody {
    /// The bodies involved in the constraint.
    pub bodies: [BodyHandle; 2],
    /// The attachment points, each in its body's local space.
    pub local_points: [Vec3; 2],
    /// Minimum allowed distance. Must be smaller than `max_length`.
    pub min_length: f32,
    /// Maximum allowed distance.
    pub max_length: f32,
    /// Restitution of the generated contacts, between 0 and 1.
    pub restitution: f32,
}

impl SliderToBody {
    pub fn new(
        bodies: [BodyHandle; 2],
        local_points: [Vec3; 2],
        min_length: f32,
        max_length: f32,
        restitution: f32,
    ) -> Self {
        Self {
            bodies,
            local_points,
            min_length,
            max_length,
            restitution,
        }
    }
}

impl Constraint for SliderToBody {
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

        if length_sq > self.max_length * self.max_length {
            contacts[0] = Contact {
                bodies: [Some(self.bodies[0]), Some(self.bodies[1])],
                point: world_points[1],
                normal: dir.normalize(),
                penetration: length_sq.sqrt() - self.max_length,
                friction: 0.0,
                restitution: (self.restitution + body0.restitution + body1.restitution) / 3.0,
            };
            return 1;
        }

        if length_sq < self.min_length * self.min_length {
            contacts[0] = Contact {
                bodies: [Some(self.bodies[0]), Some(self.bodies[1])],
                point: world_points[1],
                normal: -dir.normalize(),
                penetration: length_sq.sqrt() - self.min_length,
                friction: 0.0,
                restitution: (self.restitution + body0.restitution + body1.restitution) / 3.0,
            };
            return 1;
        }
        0
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
    fn test_slider_inside_bounds_is_silent() {
        let bodies = vec![sphere_at(0, Vec3::new(0.0, -2.0, 0.0))];
        let slider =
            SliderToWorld::new(Vec3::ZERO, Vec3::ZERO, BodyHandle::new(0), 1.0, 3.0, 0.5);

        let mut contacts = [Contact::default(); 1];
        assert_eq!(slider.generate_contacts(&bodies, &mut contacts), 0);
    }

    #[test]
    fn test_slider_bounds_are_exclusive() {
        // Exactly on the maximum and exactly on the minimum both count as
        // inside.
        let slider =
            SliderToWorld::new(Vec3::ZERO, Vec3::ZERO, BodyHandle::new(0), 1.0, 3.0, 0.5);
        let mut contacts = [Contact::default(); 1];

        let at_max = vec![sphere_at(0, Vec3::new(0.0, -3.0, 0.0))];
        assert_eq!(slider.generate_contacts(&at_max, &mut contacts), 0);

        let at_min = vec![sphere_at(0, Vec3::new(0.0, -1.0, 0.0))];
        assert_eq!(slider.generate_contacts(&at_min, &mut contacts), 0);
    }

    #[test]
    fn test_slider_past_max_points_to_anchor() {
        let bodies = vec![sphere_at(0, Vec3::new(0.0, -4.0, 0.0))];
        let slider =
            SliderToWorld::new(Vec3::ZERO, Vec3::ZERO, BodyHandle::new(0), 1.0, 3.0, 0.5);

        let mut contacts = [Contact::default(); 1];
        assert_eq!(slider.generate_contacts(&bodies, &mut contacts), 1);

        let c = &contacts[0];
        assert!((c.normal - Vec3::Y).length() < 1e-6);
        assert!((c.penetration - 1.0).abs() < 1e-5);
        assert!((c.restitution - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_slider_under_min_points_away_from_anchor() {
        let bodies = vec![sphere_at(0, Vec3::new(0.0, -0.5, 0.0))];
        let slider =
            SliderToWorld::new(Vec3::ZERO, Vec3::ZERO, BodyHandle::new(0), 1.0, 3.0, 0.5);

        let mut contacts = [Contact::default(); 1];
        assert_eq!(slider.generate_contacts(&bodies, &mut contacts), 1);

        let c = &contacts[0];
        assert!((c.normal + Vec3::Y).length() < 1e-6);
        assert!((c.penetration + 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_slider_between_bodies() {
        let bodies = vec![
            sphere_at(0, Vec3::ZERO),
            sphere_at(1, Vec3::new(0.0, -4.0, 0.0)),
        ];
        let slider = SliderToBody::new(
            [BodyHandle::new(0), BodyHandle::new(1)],
            [Vec3::ZERO, Vec3::ZERO],
            1.0,
            3.0,
            0.5,
        );

        let mut contacts = [Contact::default(); 1];
        assert_eq!(slider.generate_contacts(&bodies, &mut contacts), 1);

        let c = &contacts[0];
        assert_eq!(c.bodies, [Some(BodyHandle::new(0)), Some(BodyHandle::new(1))]);
        assert!((c.normal + Vec3::Y).length() < 1e-6);
        assert!((c.penetration - 1.0).abs() < 1e-5);
        assert!((c.restitution - 0.5 / 3.0).abs() < 1e-6);
    }
}
