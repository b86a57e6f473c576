use glam::Vec3;

use crate::collision::Contact;
use crate::dynamics::RigidBody;
use crate::geometry::{BoxShape, Sphere};

/// Below this distance the sphere center counts as inside the box and the
/// contact normal is taken from the nearest face instead.
const CENTER_IN_BOX_THRESHOLD: f32 = 1e-2;

/// Generates the contact between two spheres, writing at most one entry.
pub fn sphere_and_sphere(
    body1: &RigidBody,
    s1: &Sphere,
    body2: &RigidBody,
    s2: &Sphere,
    contacts: &mut [Contact],
) -> usize {
    if contacts.is_empty() {
        return 0;
    }

    let midline = body1.position - body2.position;
    let size = midline.length();

    if size > s1.radius + s2.radius {
        return 0;
    }

    let normal = midline / size;
    let point = body2.position + midline * 0.5;

    contacts[0] = Contact {
        bodies: [Some(body1.handle), Some(body2.handle)],
        point,
        normal,
        penetration: s1.radius + s2.radius - size,
        friction: (body1.friction + body2.friction) / 2.0,
        restitution: (body1.restitution + body2.restitution) / 2.0,
    };
    1
}

/// Generates the contact between a sphere and a box, writing at most one
/// entry.
pub fn sphere_and_box(
    sphere_body: &RigidBody,
    sphere: &Sphere,
    box_body: &RigidBody,
    b: &BoxShape,
    contacts: &mut [Contact],
) -> usize {
    if contacts.is_empty() {
        return 0;
    }

    let center = sphere_body.position;
    let local_center = box_body.transform.inverse().transform_point3(center);

    let closest_point = local_center.clamp(-b.half_extents, b.half_extents);

    let distance_sq = (closest_point - local_center).length_squared();
    if distance_sq > sphere.radius * sphere.radius {
        return 0;
    }

    let closest_point_world = box_body.point_in_world(closest_point);

    let mut normal = center - closest_point_world;
    let mut penetration = sphere.radius;

    if normal.abs().max_element() < CENTER_IN_BOX_THRESHOLD {
        // The sphere center is inside the box: push out through the
        // nearest face.
        let mut index = 0;
        let mut sign = 1.0;
        let mut depth = b.half_extents.x - closest_point.x;

        let f = (-b.half_extents.x - closest_point.x).abs();
        if f < depth {
            depth = f;
            index = 0;
            sign = -1.0;
        }
        let f = b.half_extents.y - closest_point.y;
        if f < depth {
            depth = f;
            index = 1;
            sign = 1.0;
        }
        let f = (-b.half_extents.y - closest_point.y).abs();
        if f < depth {
            depth = f;
            index = 1;
            sign = -1.0;
        }
        let f = b.half_extents.z - closest_point.z;
        if f < depth {
            depth = f;
            index = 2;
            sign = 1.0;
        }
        let f = (-b.half_extents.z - closest_point.z).abs();
        if f < depth {
            depth = f;
            index = 2;
            sign = -1.0;
        }

        normal = box_body.axis(index) * sign;
        penetration += depth;
    } else {
        normal = normal.normalize();
        penetration -= distance_sq.sqrt();
    }

    contacts[0] = Contact {
        bodies: [Some(sphere_body.handle), Some(box_body.handle)],
        point: closest_point_world,
        normal,
        penetration,
        friction: (sphere_body.friction + box_body.friction) / 2.0,
        restitution: (sphere_body.restitution + box_body.restitution) / 2.0,
    };
    1
}
