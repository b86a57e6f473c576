use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::collision::{
    resolve_potential_contacts, BodyHandle, Broadphase, Contact, NaiveBroadphase, PotentialContact,
};
use crate::constraints::Constraint;
use crate::dynamics::{ForceGenerator, RigidBody};
use crate::error::PhysicsError;
use crate::ray::{Ray, RayResult};
use crate::solver::{ContactResolver, Dispatcher};

/// Called when a body touches another. `None` means the other side is an
/// immovable anchor, like a constraint attachment.
pub type CollisionCallback = Box<dyn FnMut(Option<BodyHandle>)>;

/// Buffer sizing for the per-step contact pipeline.
#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Broadphase pair slots allocated per body.
    pub potential_contacts_per_body: usize,
    /// Extra contact slots kept free for the constraints after the
    /// narrowphase has written its contacts.
    pub contact_slack: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            potential_contacts_per_body: 4,
            contact_slack: 10,
        }
    }
}

/// The root of a simulation. Owns the bodies, the constraints and force
/// generators attached to them, and the collision pipeline stages.
pub struct World {
    config: WorldConfig,
    bodies: Vec<RigidBody>,
    free_bodies: Vec<usize>,
    broadphase: Box<dyn Broadphase>,
    dispatcher: Box<dyn Dispatcher>,
    constraints: Vec<Rc<dyn Constraint>>,
    force_generators: Vec<(BodyHandle, Rc<dyn ForceGenerator>)>,
    callbacks: HashMap<BodyHandle, CollisionCallback>,
    // step buffers, reused across frames
    potential_contacts: Vec<PotentialContact>,
    contacts: Vec<Contact>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Box::new(NaiveBroadphase::new()), Box::new(ContactResolver))
    }
}

impl World {
    /// Creates a world using the given broadphase and dispatcher.
    pub fn new(broadphase: Box<dyn Broadphase>, dispatcher: Box<dyn Dispatcher>) -> Self {
        Self {
            config: WorldConfig::default(),
            bodies: Vec::new(),
            free_bodies: Vec::new(),
            broadphase,
            dispatcher,
            constraints: Vec::new(),
            force_generators: Vec::new(),
            callbacks: HashMap::new(),
            potential_contacts: Vec::new(),
            contacts: Vec::new(),
        }
    }

    /// Creates a world with explicit buffer sizing.
    pub fn with_config(
        broadphase: Box<dyn Broadphase>,
        dispatcher: Box<dyn Dispatcher>,
        config: WorldConfig,
    ) -> Self {
        let mut world = Self::new(broadphase, dispatcher);
        world.config = config;
        world
    }

    /// Adds a body to the world and returns its handle.
    pub fn add_rigid_body(&mut self, mut body: RigidBody) -> BodyHandle {
        let index = match self.free_bodies.pop() {
            Some(index) => index,
            None => {
                self.bodies.push(RigidBody::default());
                self.bodies.len() - 1
            }
        };

        let handle = BodyHandle::new(index as u32);
        body.handle = handle;
        self.broadphase
            .insert(handle, body.shape.bounding_sphere(body.position));
        self.bodies[index] = body;

        debug!(handle = handle.0, "body added");
        handle
    }

    /// Removes a body, along with its callback and any force generators
    /// attached to it.
    pub fn remove_rigid_body(&mut self, handle: BodyHandle) {
        let index = handle.index();
        if index >= self.bodies.len() || self.bodies[index].handle != handle {
            return;
        }

        self.broadphase.remove(handle);
        self.bodies[index] = RigidBody::default();
        self.free_bodies.push(index);
        self.force_generators.retain(|(body, _)| *body != handle);
        self.callbacks.remove(&handle);

        debug!(handle = handle.0, "body removed");
    }

    /// Borrows a body.
    pub fn rigid_body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies
            .get(handle.index())
            .filter(|body| body.handle == handle)
    }

    /// Mutably borrows a body.
    pub fn rigid_body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies
            .get_mut(handle.index())
            .filter(|body| body.handle == handle)
    }

    /// Number of live bodies.
    pub fn num_bodies(&self) -> usize {
        self.bodies.len() - self.free_bodies.len()
    }

    /// Handles of all live bodies.
    pub fn rigid_bodies(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies
            .iter()
            .filter(|body| body.handle.is_valid())
            .map(|body| body.handle)
    }

    /// Adds a constraint. Adding the same `Rc` twice is a no-op.
    pub fn add_constraint(&mut self, constraint: Rc<dyn Constraint>) {
        if !self
            .constraints
            .iter()
            .any(|c| Rc::ptr_eq(c, &constraint))
        {
            self.constraints.push(constraint);
        }
    }

    /// Removes a constraint.
    pub fn remove_constraint(&mut self, constraint: &Rc<dyn Constraint>) {
        self.constraints.retain(|c| !Rc::ptr_eq(c, constraint));
    }

    /// Attaches a force generator to a body. Attaching the same pair
    /// twice is a no-op.
    pub fn add_force_generator(&mut self, body: BodyHandle, generator: Rc<dyn ForceGenerator>) {
        if !self
            .force_generators
            .iter()
            .any(|(b, g)| *b == body && Rc::ptr_eq(g, &generator))
        {
            self.force_generators.push((body, generator));
        }
    }

    /// Detaches a force generator from a body.
    pub fn remove_force_generator(&mut self, body: BodyHandle, generator: &Rc<dyn ForceGenerator>) {
        self.force_generators
            .retain(|(b, g)| *b != body || !Rc::ptr_eq(g, generator));
    }

    /// Replaces the broadphase, reinserting every live body.
    pub fn set_broadphase(&mut self, mut broadphase: Box<dyn Broadphase>) {
        for body in self.bodies.iter().filter(|body| body.handle.is_valid()) {
            broadphase.insert(body.handle, body.shape.bounding_sphere(body.position));
        }
        self.broadphase = broadphase;
    }

    /// Replaces the dispatcher.
    pub fn set_dispatcher(&mut self, dispatcher: Box<dyn Dispatcher>) {
        self.dispatcher = dispatcher;
    }

    /// Registers a callback fired whenever `body` is part of a contact.
    pub fn set_collision_callback(&mut self, body: BodyHandle, callback: CollisionCallback) {
        self.callbacks.insert(body, callback);
    }

    /// Removes the callback of `body`, if any.
    pub fn clear_collision_callback(&mut self, body: BodyHandle) {
        self.callbacks.remove(&body);
    }

    /// Casts `ray` against every body, reporting hits to `result` until
    /// the collector asks to stop.
    pub fn ray_test(&self, ray: &Ray, result: &mut dyn RayResult) {
        for body in self.bodies.iter().filter(|body| body.handle.is_valid()) {
            if !body.shape.ray_test(body, ray, result) {
                return;
            }
        }
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Applies force generators, integrates the bodies, runs the
    /// collision pipeline and the constraints, fires collision callbacks,
    /// then hands all contacts to the dispatcher.
    pub fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        self.apply_force_generators(dt);

        for body in &mut self.bodies {
            if body.handle.is_valid() {
                body.integrate(dt);
            }
        }

        // Bodies moved, rebuild the broadphase.
        self.broadphase.clear();
        for body in self.bodies.iter().filter(|body| body.handle.is_valid()) {
            self.broadphase
                .insert(body.handle, body.shape.bounding_sphere(body.position));
        }

        self.potential_contacts.clear();
        self.potential_contacts.resize(
            self.bodies.len() * self.config.potential_contacts_per_body,
            PotentialContact::default(),
        );
        let candidates = self
            .broadphase
            .generate_potential_contacts(&mut self.potential_contacts);

        self.contacts.clear();
        self.contacts
            .resize(candidates + self.config.contact_slack, Contact::default());
        let mut generated = resolve_potential_contacts(
            &self.potential_contacts[..candidates],
            &self.bodies,
            &mut self.contacts,
        );

        for constraint in &self.constraints {
            if generated >= self.contacts.len() {
                break;
            }
            generated += constraint.generate_contacts(&self.bodies, &mut self.contacts[generated..]);
        }

        trace!(candidates, contacts = generated, "collision pipeline");

        for contact in &self.contacts[..generated] {
            for i in 0..2 {
                let Some(handle) = contact.bodies[i] else { continue };
                if let Some(callback) = self.callbacks.get_mut(&handle) {
                    callback(contact.bodies[1 - i]);
                }
            }
        }

        self.dispatcher
            .resolve_contacts(&mut self.contacts[..generated], &mut self.bodies, dt)
    }

    fn apply_force_generators(&mut self, dt: f32) {
        for entry in 0..self.force_generators.len() {
            let handle = self.force_generators[entry].0;
            let generator = Rc::clone(&self.force_generators[entry].1);
            let index = handle.index();
            if index >= self.bodies.len() || self.bodies[index].handle != handle {
                continue;
            }

            match generator.anchor() {
                Some(anchor) if anchor != handle && anchor.index() < self.bodies.len() => {
                    let (body, other) = body_and_anchor(&mut self.bodies, index, anchor.index());
                    generator.update_force(body, Some(other), dt);
                }
                _ => generator.update_force(&mut self.bodies[index], None, dt),
            }
        }
    }
}

/// Splits the arena into the mutable target body and a shared borrow of
/// its anchor.
fn body_and_anchor(
    bodies: &mut [RigidBody],
    body: usize,
    anchor: usize,
) -> (&mut RigidBody, &RigidBody) {
    if body < anchor {
        let (left, right) = bodies.split_at_mut(anchor);
        (&mut left[body], &right[0])
    } else {
        let (left, right) = bodies.split_at_mut(body);
        (&mut right[0], &left[anchor])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::SweepAndPrune;
    use crate::constraints::StringToWorld;
    use crate::dynamics::Gravity;
    use crate::geometry::Shape;
    use crate::ray::RayResultClosest;
    use glam::Vec3;
    use std::cell::Cell;

    #[test]
    fn test_body_lifecycle() {
        let mut world = World::default();
        assert_eq!(world.num_bodies(), 0);

        let a = world.add_rigid_body(RigidBody::new(Shape::sphere(1.0)));
        let b = world.add_rigid_body(
            RigidBody::new(Shape::sphere(1.0)).with_position(Vec3::new(5.0, 0.0, 0.0)),
        );
        assert_eq!(world.num_bodies(), 2);
        assert!(world.rigid_body(a).is_some());

        world.remove_rigid_body(a);
        assert_eq!(world.num_bodies(), 1);
        assert!(world.rigid_body(a).is_none());
        assert!(world.rigid_body(b).is_some());

        // The freed slot is reused.
        let c = world.add_rigid_body(RigidBody::new(Shape::sphere(1.0)));
        assert_eq!(c.index(), a.index());
        assert_eq!(world.num_bodies(), 2);
    }

    #[test]
    fn test_gravity_pulls_body_down() {
        let mut world = World::default();
        let ball = world.add_rigid_body(
            RigidBody::new(Shape::sphere(0.5)).with_position(Vec3::new(0.0, 10.0, 0.0)),
        );
        world.add_force_generator(ball, Rc::new(Gravity::new(Vec3::new(0.0, -10.0, 0.0))));

        for _ in 0..60 {
            world.step(1.0 / 60.0).unwrap();
        }

        let pos = world.rigid_body(ball).unwrap().position;
        assert!(pos.y < 10.0);
    }

    #[test]
    fn test_anchored_spring_pulls_bodies_together() {
        use crate::dynamics::Spring;

        let mut world = World::default();
        let anchor = world.add_rigid_body(
            RigidBody::new(Shape::sphere(0.2)).with_mass(0.0),
        );
        let ball = world.add_rigid_body(
            RigidBody::new(Shape::sphere(0.2)).with_position(Vec3::new(5.0, 0.0, 0.0)),
        );
        world.add_force_generator(ball, Rc::new(Spring::new(Vec3::ZERO, anchor, Vec3::ZERO, 2.0, 1.0)));

        for _ in 0..600 {
            world.step(1.0 / 60.0).unwrap();
        }

        let distance = world.rigid_body(ball).unwrap().position.length();
        assert!(distance < 5.0, "spring did not pull: d={distance}");
    }

    #[test]
    fn test_ball_rests_on_immovable_floor() {
        let mut world = World::default();
        let floor = world.add_rigid_body(
            RigidBody::new(Shape::cuboid(Vec3::new(10.0, 0.5, 10.0))).with_mass(0.0),
        );
        let ball = world.add_rigid_body(
            RigidBody::new(Shape::sphere(0.5)).with_position(Vec3::new(0.0, 3.0, 0.0)),
        );
        world.add_force_generator(ball, Rc::new(Gravity::new(Vec3::new(0.0, -10.0, 0.0))));

        for _ in 0..300 {
            world.step(1.0 / 60.0).unwrap();
        }

        assert_eq!(world.rigid_body(floor).unwrap().position, Vec3::ZERO);
        let pos = world.rigid_body(ball).unwrap().position;
        assert!(pos.y > 0.5, "ball fell through the floor: y={}", pos.y);
        assert!(pos.y < 3.0, "ball did not fall: y={}", pos.y);
    }

    #[test]
    fn test_string_constraint_limits_fall() {
        let mut world = World::default();
        let ball = world.add_rigid_body(
            RigidBody::new(Shape::sphere(0.2)).with_position(Vec3::new(0.0, -1.0, 0.0)),
        );
        world.add_force_generator(ball, Rc::new(Gravity::new(Vec3::new(0.0, -10.0, 0.0))));
        world.add_constraint(Rc::new(StringToWorld::new(
            Vec3::ZERO,
            Vec3::ZERO,
            ball,
            2.0,
            0.0,
        )));

        for _ in 0..600 {
            world.step(1.0 / 60.0).unwrap();
        }

        let pos = world.rigid_body(ball).unwrap().position;
        assert!(pos.y >= -2.5, "string did not hold: y={}", pos.y);
    }

    #[test]
    fn test_collision_callback_fires() {
        let fired = Rc::new(Cell::new(false));
        let seen = Rc::new(Cell::new(BodyHandle::INVALID));

        let mut world = World::default();
        let a = world.add_rigid_body(
            RigidBody::new(Shape::sphere(1.0)).with_position(Vec3::new(0.0, 1.5, 0.0)),
        );
        let b = world.add_rigid_body(RigidBody::new(Shape::sphere(1.0)));

        let fired_in_callback = Rc::clone(&fired);
        let seen_in_callback = Rc::clone(&seen);
        world.set_collision_callback(
            a,
            Box::new(move |other| {
                fired_in_callback.set(true);
                if let Some(other) = other {
                    seen_in_callback.set(other);
                }
            }),
        );

        world.step(1.0 / 60.0).unwrap();

        assert!(fired.get());
        assert_eq!(seen.get(), b);
    }

    #[test]
    fn test_swapping_broadphase_keeps_bodies() {
        let mut world = World::default();
        world.add_rigid_body(RigidBody::new(Shape::sphere(1.0)));
        world.add_rigid_body(
            RigidBody::new(Shape::sphere(1.0)).with_position(Vec3::new(1.0, 0.0, 0.0)),
        );

        world.set_broadphase(Box::new(SweepAndPrune::new()));
        world.step(1.0 / 60.0).unwrap();
        assert_eq!(world.num_bodies(), 2);
    }

    #[test]
    fn test_ray_test_closest() {
        let mut world = World::default();
        let near = world.add_rigid_body(
            RigidBody::new(Shape::sphere(1.0)).with_position(Vec3::new(5.0, 0.0, 0.0)),
        );
        world.add_rigid_body(
            RigidBody::new(Shape::sphere(1.0)).with_position(Vec3::new(10.0, 0.0, 0.0)),
        );

        let ray = Ray::new(Vec3::ZERO, Vec3::X, 100.0);
        let mut closest = RayResultClosest::new(ray.origin);
        world.ray_test(&ray, &mut closest);

        let hit = closest.hit().unwrap();
        assert_eq!(hit.body, near);
        assert!((hit.point - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_removed_body_keeps_others_stepping() {
        let mut world = World::default();
        let a = world.add_rigid_body(RigidBody::new(Shape::sphere(1.0)));
        let b = world.add_rigid_body(
            RigidBody::new(Shape::sphere(1.0)).with_position(Vec3::new(5.0, 0.0, 0.0)),
        );
        world.add_force_generator(a, Rc::new(Gravity::new(Vec3::new(0.0, -10.0, 0.0))));

        world.remove_rigid_body(a);
        world.step(1.0 / 60.0).unwrap();
        assert!(world.rigid_body(b).is_some());
    }
}
