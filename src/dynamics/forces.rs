//! Force generators applied to bodies at the start of each step.

use glam::Vec3;

use crate::collision::BodyHandle;
use crate::dynamics::RigidBody;

/// Adds forces to a body each step.
///
/// Generators are registered on the world per body. A generator that pulls
/// toward another body reports it through [`anchor`](Self::anchor) so the
/// world can lend it alongside the target.
pub trait ForceGenerator {
    /// Accumulates this generator's force on `body`.
    ///
    /// `anchor` is the body named by [`anchor`](Self::anchor), if any.
    fn update_force(&self, body: &mut RigidBody, anchor: Option<&RigidBody>, dt: f32);

    /// Handle of the body this generator is anchored to.
    fn anchor(&self) -> Option<BodyHandle> {
        None
    }
}

/// Constant gravitational acceleration.
#[derive(Debug, Clone, Copy)]
pub struct Gravity {
    /// Acceleration vector, e.g. `(0, -9.81, 0)`
    pub gravity: Vec3,
}

impl Gravity {
    /// Creates a gravity generator.
    pub fn new(gravity: Vec3) -> Self {
        Self { gravity }
    }
}

impl ForceGenerator for Gravity {
    fn update_force(&self, body: &mut RigidBody, _anchor: Option<&RigidBody>, _dt: f32) {
        if !body.has_finite_mass() {
            return;
        }
        body.add_force(self.gravity * body.mass());
    }
}

/// A Hookean spring between a point on the target body and either a point
/// on an anchor body or a fixed world point.
#[derive(Debug, Clone, Copy)]
pub struct Spring {
    /// Attachment point in the target body's space
    pub local_point: Vec3,
    /// Body the other end is attached to, or `None` for a world anchor
    pub other: Option<BodyHandle>,
    /// Other attachment point: in the anchor body's space, or a world
    /// point when there is no anchor body
    pub other_point: Vec3,
    /// Spring constant
    pub spring_constant: f32,
    /// Length at which the spring is relaxed
    pub rest_length: f32,
}

impl Spring {
    /// Creates a spring anchored to a point on `other`.
    pub fn new(
        local_point: Vec3,
        other: BodyHandle,
        other_point: Vec3,
        spring_constant: f32,
        rest_length: f32,
    ) -> Self {
        Self {
            local_point,
            other: Some(other),
            other_point,
            spring_constant,
            rest_length,
        }
    }

    /// Creates a spring anchored to a fixed world point.
    pub fn to_world(
        local_point: Vec3,
        world_point: Vec3,
        spring_constant: f32,
        rest_length: f32,
    ) -> Self {
        Self {
            local_point,
            other: None,
            other_point: world_point,
            spring_constant,
            rest_length,
        }
    }
}

impl ForceGenerator for Spring {
    fn update_force(&self, body: &mut RigidBody, anchor: Option<&RigidBody>, _dt: f32) {
        let attach = body.point_in_world(self.local_point);
        let other_end = match anchor {
            Some(other) => other.point_in_world(self.other_point),
            None => self.other_point,
        };

        let offset = attach - other_end;
        let length = offset.length();
        if length == 0.0 {
            return;
        }

        let magnitude = -self.spring_constant * (length - self.rest_length);
        body.add_force_at_point(offset * (magnitude / length), attach);
    }

    fn anchor(&self) -> Option<BodyHandle> {
        self.other
    }
}

/// Buoyancy along the world Y axis for a body floating in a liquid plane.
#[derive(Debug, Clone, Copy)]
pub struct Buoyancy {
    /// Submersion depth at which the force saturates
    pub max_depth: f32,
    /// Displaced volume of the body
    pub volume: f32,
    /// Y coordinate of the liquid surface
    pub water_height: f32,
    /// Density of the liquid
    pub liquid_density: f32,
}

impl Buoyancy {
    /// Creates a buoyancy generator.
    pub fn new(max_depth: f32, volume: f32, water_height: f32, liquid_density: f32) -> Self {
        Self {
            max_depth,
            volume,
            water_height,
            liquid_density,
        }
    }
}

impl ForceGenerator for Buoyancy {
    fn update_force(&self, body: &mut RigidBody, _anchor: Option<&RigidBody>, _dt: f32) {
        if !body.has_finite_mass() {
            return;
        }

        let depth = body.position.y;
        // Fully out of the liquid.
        if depth >= self.water_height + self.max_depth {
            return;
        }

        let mut force = Vec3::ZERO;
        if depth <= self.water_height - self.max_depth {
            // Fully submerged.
            force.y = self.volume * self.liquid_density;
        } else {
            force.y = -self.volume
                * self.liquid_density
                * ((depth - self.max_depth - self.water_height) / (2.0 * self.max_depth));
        }
        body.add_force(force * body.mass());
    }
}

/// Pulls bodies toward (or, with a negative force, away from) a center
/// point while they are inside the influence radius.
#[derive(Debug, Clone, Copy)]
pub struct AttractionSphere {
    /// Center of attraction
    pub center: Vec3,
    /// Influence radius
    pub radius: f32,
    /// Force magnitude per unit mass, negative to repel
    pub force: f32,
}

impl AttractionSphere {
    /// Creates a spherical attractor.
    pub fn new(center: Vec3, radius: f32, force: f32) -> Self {
        Self {
            center,
            radius,
            force,
        }
    }
}

impl ForceGenerator for AttractionSphere {
    fn update_force(&self, body: &mut RigidBody, _anchor: Option<&RigidBody>, _dt: f32) {
        if !body.has_finite_mass() {
            return;
        }

        let offset = self.center - body.position;
        let distance_sq = offset.length_squared();
        if distance_sq == 0.0 || distance_sq > self.radius * self.radius {
            return;
        }
        body.add_force(offset.normalize() * (self.force * body.mass()));
    }
}

/// Pulls bodies toward an axis while they are inside a cylinder around it.
#[derive(Debug, Clone, Copy)]
pub struct AttractionCylinder {
    /// A point on the axis
    pub base: Vec3,
    /// Unit axis direction
    pub direction: Vec3,
    /// Influence radius around the axis
    pub radius: f32,
    /// Cylinder height measured from the base along the axis, `None` for
    /// an unbounded cylinder
    pub height: Option<f32>,
    /// Force magnitude per unit mass, negative to repel
    pub force: f32,
}

impl AttractionCylinder {
    /// Creates a cylindrical attractor around the given axis.
    pub fn new(base: Vec3, direction: Vec3, radius: f32, height: Option<f32>, force: f32) -> Self {
        Self {
            base,
            direction: direction.normalize(),
            radius,
            height,
            force,
        }
    }
}

impl ForceGenerator for AttractionCylinder {
    fn update_force(&self, body: &mut RigidBody, _anchor: Option<&RigidBody>, _dt: f32) {
        if !body.has_finite_mass() {
            return;
        }

        let offset = body.position - self.base;
        let along = offset.dot(self.direction);
        if let Some(height) = self.height {
            if along < 0.0 || along > height {
                return;
            }
        }

        let radial = offset - self.direction * along;
        let distance_sq = radial.length_squared();
        if distance_sq == 0.0 || distance_sq > self.radius * self.radius {
            return;
        }
        body.add_force(-radial.normalize() * (self.force * body.mass()));
    }
}
