use crate::collision::broad_phase::Broadphase;
use crate::collision::{BodyHandle, PotentialContact};
use crate::geometry::BoundingSphere;

/// The simplest broadphase: tests every pair of bounding volumes.
///
/// O(n^2) in the number of bodies, useful as a baseline and for small
/// scenes.
#[derive(Debug, Default)]
pub struct NaiveBroadphase {
    entries: Vec<(BodyHandle, BoundingSphere)>,
}

impl NaiveBroadphase {
    /// Creates an empty naive broadphase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered bodies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no body is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Broadphase for NaiveBroadphase {
    fn insert(&mut self, body: BodyHandle, volume: BoundingSphere) {
        for entry in &mut self.entries {
            if entry.0 == body {
                entry.1 = volume;
                return;
            }
        }
        self.entries.push((body, volume));
    }

    fn remove(&mut self, body: BodyHandle) {
        self.entries.retain(|entry| entry.0 != body);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn generate_potential_contacts(&self, contacts: &mut [PotentialContact]) -> usize {
        let mut count = 0;
        for i in 0..self.entries.len() {
            for j in (i + 1)..self.entries.len() {
                if count == contacts.len() {
                    return count;
                }
                let (a, va) = &self.entries[i];
                let (b, vb) = &self.entries[j];
                if va.overlaps(vb) {
                    contacts[count] = PotentialContact { bodies: [*a, *b] };
                    count += 1;
                }
            }
        }
        count
    }
}
