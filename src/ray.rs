//! Rays and hit collectors for world queries.

use glam::Vec3;

use crate::collision::BodyHandle;

/// A finite ray: origin, unit direction and length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point in world space
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
    /// Distance the ray travels
    pub length: f32,
}

impl Ray {
    /// Creates a ray from an origin, a direction and a length.
    ///
    /// The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3, length: f32) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
            length,
        }
    }

    /// Creates the ray spanning `from` to `to`.
    ///
    /// When the two points coincide the direction falls back to +Y with
    /// zero length, which hits nothing.
    pub fn from_to(from: Vec3, to: Vec3) -> Self {
        let offset = to - from;
        let length = offset.length();
        if length == 0.0 {
            return Self {
                origin: from,
                direction: Vec3::Y,
                length: 0.0,
            };
        }
        Self {
            origin: from,
            direction: offset / length,
            length,
        }
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// End point of the ray.
    #[inline]
    pub fn destination(&self) -> Vec3 {
        self.at(self.length)
    }
}

/// Receives ray hits during a world ray test.
pub trait RayResult {
    /// Reports a hit on `body` at `point`. Returning false stops the
    /// traversal.
    fn add_result(&mut self, body: BodyHandle, point: Vec3) -> bool;
}

/// A single recorded ray hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The body that was hit
    pub body: BodyHandle,
    /// Hit point in world space
    pub point: Vec3,
}

/// Keeps the first hit found and stops the traversal.
#[derive(Debug, Default)]
pub struct RayResultAny {
    hit: Option<RayHit>,
}

impl RayResultAny {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded hit, if any.
    pub fn hit(&self) -> Option<&RayHit> {
        self.hit.as_ref()
    }
}

impl RayResult for RayResultAny {
    fn add_result(&mut self, body: BodyHandle, point: Vec3) -> bool {
        self.hit = Some(RayHit { body, point });
        false
    }
}

/// Keeps the hit closest to a reference point, usually the ray origin.
#[derive(Debug)]
pub struct RayResultClosest {
    origin: Vec3,
    hit: Option<RayHit>,
    distance_sq: f32,
}

impl RayResultClosest {
    /// Creates a collector measuring distance from `origin`.
    pub fn new(origin: Vec3) -> Self {
        Self {
            origin,
            hit: None,
            distance_sq: f32::INFINITY,
        }
    }

    /// The closest hit seen so far, if any.
    pub fn hit(&self) -> Option<&RayHit> {
        self.hit.as_ref()
    }
}

impl RayResult for RayResultClosest {
    fn add_result(&mut self, body: BodyHandle, point: Vec3) -> bool {
        let distance_sq = (point - self.origin).length_squared();
        if distance_sq < self.distance_sq {
            self.distance_sq = distance_sq;
            self.hit = Some(RayHit { body, point });
        }
        true
    }
}

/// Keeps every hit, sorted by distance from a reference point.
#[derive(Debug)]
pub struct RayResultAll {
    origin: Vec3,
    hits: Vec<RayHit>,
}

impl RayResultAll {
    /// Creates a collector measuring distance from `origin`.
    pub fn new(origin: Vec3) -> Self {
        Self {
            origin,
            hits: Vec::new(),
        }
    }

    /// All hits, nearest first.
    pub fn hits(&self) -> &[RayHit] {
        &self.hits
    }
}

impl RayResult for RayResultAll {
    fn add_result(&mut self, body: BodyHandle, point: Vec3) -> bool {
        let distance_sq = (point - self.origin).length_squared();
        let at = self
            .hits
            .partition_point(|h| (h.point - self.origin).length_squared() <= distance_sq);
        self.hits.insert(at, RayHit { body, point });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_to() {
        let ray = Ray::from_to(Vec3::new(1.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(ray.direction, Vec3::X);
        assert_eq!(ray.length, 3.0);
        assert_eq!(ray.destination(), Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_from_to_degenerate() {
        let p = Vec3::new(2.0, 3.0, 4.0);
        let ray = Ray::from_to(p, p);
        assert_eq!(ray.direction, Vec3::Y);
        assert_eq!(ray.length, 0.0);
        assert_eq!(ray.destination(), p);
    }

    #[test]
    fn test_any_stops() {
        let mut any = RayResultAny::new();
        assert!(!any.add_result(BodyHandle::new(3), Vec3::X));
        assert_eq!(any.hit().unwrap().body, BodyHandle::new(3));
    }

    #[test]
    fn test_closest_keeps_nearest() {
        let mut closest = RayResultClosest::new(Vec3::ZERO);
        assert!(closest.add_result(BodyHandle::new(0), Vec3::new(5.0, 0.0, 0.0)));
        assert!(closest.add_result(BodyHandle::new(1), Vec3::new(2.0, 0.0, 0.0)));
        assert!(closest.add_result(BodyHandle::new(2), Vec3::new(8.0, 0.0, 0.0)));
        assert_eq!(closest.hit().unwrap().body, BodyHandle::new(1));
    }

    #[test]
    fn test_all_sorted() {
        let mut all = RayResultAll::new(Vec3::ZERO);
        all.add_result(BodyHandle::new(0), Vec3::new(5.0, 0.0, 0.0));
        all.add_result(BodyHandle::new(1), Vec3::new(2.0, 0.0, 0.0));
        all.add_result(BodyHandle::new(2), Vec3::new(8.0, 0.0, 0.0));

        let order: Vec<u32> = all.hits().iter().map(|h| h.body.0).collect();
        assert_eq!(order, vec![1, 0, 2]);
    }
}
