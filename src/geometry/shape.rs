use glam::{Mat3, Vec3};

use crate::dynamics::RigidBody;
use crate::geometry::BoundingSphere;
use crate::ray::{Ray, RayResult};

/// A sphere centered on its body's origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Sphere radius
    pub radius: f32,
}

impl Sphere {
    /// Creates a sphere shape with the given radius.
    #[inline]
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }
}

/// A box centered on its body's origin, aligned with the body's axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShape {
    /// Half-extents along the box's local axes
    pub half_extents: Vec3,
}

impl BoxShape {
    /// Creates a box shape with the given half-extents.
    #[inline]
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }
}

/// The collision shape owned by a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Sphere primitive
    Sphere(Sphere),
    /// Box primitive
    Box(BoxShape),
}

impl Shape {
    /// Creates a sphere shape.
    #[inline]
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere(Sphere::new(radius))
    }

    /// Creates a box shape from half-extents.
    #[inline]
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Box(BoxShape::new(half_extents))
    }

    /// Returns the bounding sphere for a body at `position`.
    ///
    /// Orientation does not matter: the sphere is centered on the body and
    /// large enough for any rotation.
    pub fn bounding_sphere(&self, position: Vec3) -> BoundingSphere {
        match self {
            Shape::Sphere(s) => BoundingSphere::new(position, s.radius),
            // Corner distance, so a rotated box is still enclosed.
            Shape::Box(b) => BoundingSphere::new(position, b.half_extents.length()),
        }
    }

    /// Returns the body-space inertia tensor for the given mass.
    pub fn inertia_tensor(&self, mass: f32) -> Mat3 {
        match self {
            Shape::Sphere(s) => {
                let i = 0.4 * mass * s.radius * s.radius;
                Mat3::from_diagonal(Vec3::splat(i))
            }
            Shape::Box(b) => {
                let sq = b.half_extents * b.half_extents;
                let f = 0.3 * mass;
                Mat3::from_diagonal(Vec3::new(
                    f * (sq.y + sq.z),
                    f * (sq.x + sq.z),
                    f * (sq.x + sq.y),
                ))
            }
        }
    }

    /// Tests `ray` against this shape on `body`, reporting any hit to
    /// `result`. Returns false when the collector asked to stop traversal.
    pub fn ray_test(&self, body: &RigidBody, ray: &Ray, result: &mut dyn RayResult) -> bool {
        match self {
            Shape::Sphere(s) => ray_test_sphere(body, s, ray, result),
            Shape::Box(b) => ray_test_box(body, b, ray, result),
        }
    }
}

fn ray_test_sphere(
    body: &RigidBody,
    sphere: &Sphere,
    ray: &Ray,
    result: &mut dyn RayResult,
) -> bool {
    let to_center = body.position - ray.origin;
    let projection = to_center.dot(ray.direction);
    let distance_sq = to_center.length_squared();
    let radius_sq = sphere.radius * sphere.radius;

    // Sphere behind the ray origin.
    if projection < 0.0 && distance_sq > radius_sq {
        return true;
    }

    let perp_sq = distance_sq - projection * projection;
    if perp_sq > radius_sq {
        return true;
    }

    let half_chord = (radius_sq - perp_sq).sqrt();
    // Entry point from outside, exit point when the origin is inside.
    let t = if distance_sq > radius_sq {
        projection - half_chord
    } else {
        projection + half_chord
    };
    if t > ray.length {
        return true;
    }

    result.add_result(body.handle, ray.at(t))
}

fn ray_test_box(body: &RigidBody, b: &BoxShape, ray: &Ray, result: &mut dyn RayResult) -> bool {
    // Slab test in the box's local frame.
    let inverse = body.transform.inverse();
    let origin = inverse.transform_point3(ray.origin);
    let direction = inverse.transform_vector3(ray.direction);

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        if direction[axis].abs() < f32::EPSILON {
            if origin[axis].abs() > b.half_extents[axis] {
                return true;
            }
            continue;
        }

        let inv_d = 1.0 / direction[axis];
        let mut t1 = (-b.half_extents[axis] - origin[axis]) * inv_d;
        let mut t2 = (b.half_extents[axis] - origin[axis]) * inv_d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return true;
        }
    }

    if t_min < ray.length && t_max > 0.0 {
        return result.add_result(body.handle, ray.at(t_min));
    }
    true
}
