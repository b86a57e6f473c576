use glam::{Affine3A, Mat3, Mat4, Quat, Vec3};

use crate::collision::{group, mask, BodyHandle};
use crate::geometry::Shape;

/// A rigid body in the physics simulation.
///
/// State fields are public and may be edited directly; after editing
/// position or orientation outside of [`World::step`](crate::World::step),
/// call [`calculate_derived_data`](Self::calculate_derived_data) so the
/// cached transform and world inertia tensor match.
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// Handle assigned by the world, [`BodyHandle::INVALID`] until added
    pub handle: BodyHandle,

    /// Position in world space
    pub position: Vec3,
    /// Orientation as a unit quaternion
    pub orientation: Quat,
    /// Linear velocity
    pub linear_velocity: Vec3,
    /// Angular velocity in radians per second
    pub angular_velocity: Vec3,
    /// Constant acceleration applied every step, e.g. gravity
    pub acceleration: Vec3,

    /// Inverse mass (0 for an immovable body)
    pub inv_mass: f32,
    /// Body-space inverse inertia tensor
    pub inv_inertia_local: Mat3,
    /// World-space inverse inertia tensor, derived
    pub inv_inertia_world: Mat3,

    /// Proportion of linear velocity kept each second
    pub linear_damping: f32,
    /// Proportion of angular velocity kept each second
    pub angular_damping: f32,

    /// Restitution used for contacts with this body
    pub restitution: f32,
    /// Friction used for contacts with this body
    pub friction: f32,

    /// Collision group bits
    pub group: u16,
    /// Collision mask bits
    pub mask: u16,

    /// The collision shape owned by this body
    pub shape: Shape,

    /// Body-to-world transform, derived
    pub transform: Affine3A,
    /// Acceleration the body saw during its last integration, derived
    pub last_frame_acceleration: Vec3,

    /// Accumulated force, cleared each integration
    pub force: Vec3,
    /// Accumulated torque, cleared each integration
    pub torque: Vec3,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(Shape::sphere(1.0))
    }
}

impl RigidBody {
    /// Creates a body owning `shape`, with unit mass at the origin.
    pub fn new(shape: Shape) -> Self {
        let mut body = Self {
            handle: BodyHandle::INVALID,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            inv_mass: 1.0,
            inv_inertia_local: Mat3::IDENTITY,
            inv_inertia_world: Mat3::IDENTITY,
            linear_damping: 0.995,
            angular_damping: 0.995,
            restitution: 0.0,
            friction: 0.0,
            group: group(0),
            mask: mask(99),
            shape,
            transform: Affine3A::IDENTITY,
            last_frame_acceleration: Vec3::ZERO,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
        };
        body.update_inertia_tensor();
        body.calculate_derived_data();
        body
    }

    /// Sets the position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self.calculate_derived_data();
        self
    }

    /// Sets the orientation.
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self.calculate_derived_data();
        self
    }

    /// Sets the linear velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Sets the angular velocity.
    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Sets the constant acceleration.
    pub fn with_acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Sets the mass and re-derives the inertia tensor from the shape.
    ///
    /// Zero or infinite mass makes the body immovable.
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    /// Replaces the collision shape and re-derives the inertia tensor.
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.set_shape(shape);
        self
    }

    /// Sets linear damping.
    pub fn with_linear_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Sets angular damping.
    pub fn with_angular_damping(mut self, damping: f32) -> Self {
        self.angular_damping = damping;
        self
    }

    /// Sets restitution.
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Sets friction.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    /// Sets the collision group bits.
    pub fn with_group(mut self, group: u16) -> Self {
        self.group = group;
        self
    }

    /// Sets the collision mask bits.
    pub fn with_mask(mut self, mask: u16) -> Self {
        self.mask = mask;
        self
    }

    /// Sets the mass and re-derives the inertia tensor from the shape.
    pub fn set_mass(&mut self, mass: f32) {
        if mass > 0.0 && mass.is_finite() {
            self.inv_mass = 1.0 / mass;
        } else {
            self.inv_mass = 0.0;
        }
        self.update_inertia_tensor();
    }

    /// Replaces the collision shape and re-derives the inertia tensor.
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        self.update_inertia_tensor();
    }

    /// Returns the mass, infinite for an immovable body.
    pub fn mass(&self) -> f32 {
        if self.inv_mass > 0.0 {
            1.0 / self.inv_mass
        } else {
            f32::INFINITY
        }
    }

    /// Returns true if this body can be moved by forces and impulses.
    pub fn has_finite_mass(&self) -> bool {
        self.inv_mass > 0.0
    }

    fn update_inertia_tensor(&mut self) {
        if self.inv_mass == 0.0 {
            self.inv_inertia_local = Mat3::ZERO;
        } else {
            self.inv_inertia_local = self.shape.inertia_tensor(self.mass()).inverse();
        }
        self.update_world_inertia();
    }

    /// Accumulates a force through the center of mass.
    pub fn add_force(&mut self, force: Vec3) {
        self.force += force;
    }

    /// Accumulates a force applied at a world-space point.
    pub fn add_force_at_point(&mut self, force: Vec3, point: Vec3) {
        self.force += force;
        self.torque += (point - self.position).cross(force);
    }

    /// Accumulates a force applied at a body-space point.
    pub fn add_force_at_body_point(&mut self, force: Vec3, point: Vec3) {
        let world_point = self.point_in_world(point);
        self.add_force_at_point(force, world_point);
    }

    /// Accumulates a torque.
    pub fn add_torque(&mut self, torque: Vec3) {
        self.torque += torque;
    }

    /// Clears the force and torque accumulators.
    pub fn clear_accumulators(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    /// Transforms a body-space point into world space.
    #[inline]
    pub fn point_in_world(&self, point: Vec3) -> Vec3 {
        self.transform.transform_point3(point)
    }

    /// Returns one of the body's world-space axes (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn axis(&self, index: usize) -> Vec3 {
        Vec3::from(self.transform.matrix3.col(index))
    }

    /// Column-major world matrix, suitable for rendering.
    pub fn opengl_matrix(&self) -> Mat4 {
        Mat4::from(self.transform)
    }

    /// Rotates the orientation by `rotation * scale` using the quaternion
    /// derivative, then renormalizes.
    pub fn add_scaled_orientation(&mut self, rotation: Vec3, scale: f32) {
        let delta =
            Quat::from_xyzw(rotation.x, rotation.y, rotation.z, 0.0) * self.orientation;
        self.orientation = (self.orientation + delta * (0.5 * scale)).normalize();
    }

    /// Recomputes the transform and the world-space inverse inertia tensor
    /// from position and orientation.
    pub fn calculate_derived_data(&mut self) {
        self.orientation = self.orientation.normalize();
        self.transform = Affine3A::from_rotation_translation(self.orientation, self.position);
        self.update_world_inertia();
    }

    fn update_world_inertia(&mut self) {
        let rot = Mat3::from_quat(self.orientation);
        self.inv_inertia_world = rot * self.inv_inertia_local * rot.transpose();
    }

    /// Advances the body state by `dt` seconds and clears the accumulators.
    ///
    /// An immovable body only refreshes its derived data.
    pub fn integrate(&mut self, dt: f32) {
        if self.inv_mass == 0.0 {
            self.calculate_derived_data();
            self.clear_accumulators();
            return;
        }

        self.last_frame_acceleration = self.acceleration + self.force * self.inv_mass;
        let angular_acceleration = self.inv_inertia_world * self.torque;

        self.linear_velocity += self.last_frame_acceleration * dt;
        self.angular_velocity += angular_acceleration * dt;

        self.linear_velocity *= self.linear_damping.powf(dt);
        self.angular_velocity *= self.angular_damping.powf(dt);

        self.position += self.linear_velocity * dt;
        self.add_scaled_orientation(self.angular_velocity, dt);

        self.calculate_derived_data();
        self.clear_accumulators();
    }
}
