use glam::Vec3;

/// A sphere enclosing a body, used by the broadphase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// Center in world space
    pub center: Vec3,
    /// Radius, always non-negative
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a bounding sphere from a center and radius.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Creates the smallest sphere enclosing both `a` and `b`.
    pub fn from_spheres(a: &BoundingSphere, b: &BoundingSphere) -> Self {
        let offset = b.center - a.center;
        let distance_sq = offset.length_squared();
        let radius_diff = b.radius - a.radius;

        // One sphere already contains the other.
        if radius_diff * radius_diff >= distance_sq {
            if a.radius > b.radius {
                return *a;
            }
            return *b;
        }

        let distance = distance_sq.sqrt();
        let radius = (distance + a.radius + b.radius) * 0.5;
        let mut center = a.center;
        if distance > 0.0 {
            center += offset * ((radius - a.radius) / distance);
        }
        Self { center, radius }
    }

    /// Returns true if the two spheres overlap.
    ///
    /// Touching exactly does not count as overlapping.
    pub fn overlaps(&self, other: &BoundingSphere) -> bool {
        let distance_sq = (self.center - other.center).length_squared();
        let radius_sum = self.radius + other.radius;
        distance_sq < radius_sum * radius_sum
    }

    /// Smallest extent of the sphere along the given axis (0 = x, 1 = y, 2 = z).
    pub fn axis_min(&self, axis: usize) -> f32 {
        self.center[axis] - self.radius
    }

    /// Largest extent of the sphere along the given axis (0 = x, 1 = y, 2 = z).
    pub fn axis_max(&self, axis: usize) -> f32 {
        self.center[axis] + self.radius
    }
}
