use crate::collision::broad_phase::Broadphase;
use crate::collision::{BodyHandle, PotentialContact};
use crate::geometry::BoundingSphere;

/// The axis the intervals are projected onto (world X).
const SWEEP_AXIS: usize = 0;

#[derive(Debug, Clone, Copy)]
struct Event {
    value: f32,
    body: BodyHandle,
    is_start: bool,
}

/// Single-axis sweep-and-prune broadphase.
///
/// Each bounding volume becomes a start/end interval on the sweep axis,
/// kept sorted on insert. A linear sweep pairs every starting interval
/// with the currently open ones. Pairs that overlap only on the sweep
/// axis are over-reported and left for the narrowphase to reject.
#[derive(Debug, Default)]
pub struct SweepAndPrune {
    events: Vec<Event>,
}

impl SweepAndPrune {
    /// Creates an empty sweep-and-prune broadphase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered bodies.
    pub fn len(&self) -> usize {
        self.events.len() / 2
    }

    /// Returns true if no body is registered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn insert_event(&mut self, event: Event) {
        // Start events sort before end events at equal values, so a pair
        // touching on the axis is reported rather than missed.
        let at = self.events.partition_point(|e| {
            e.value < event.value || (e.value == event.value && !e.is_start && event.is_start)
        });
        self.events.insert(at, event);
    }
}

impl Broadphase for SweepAndPrune {
    fn insert(&mut self, body: BodyHandle, volume: BoundingSphere) {
        self.remove(body);
        self.insert_event(Event {
            value: volume.axis_min(SWEEP_AXIS),
            body,
            is_start: true,
        });
        self.insert_event(Event {
            value: volume.axis_max(SWEEP_AXIS),
            body,
            is_start: false,
        });
    }

    fn remove(&mut self, body: BodyHandle) {
        self.events.retain(|event| event.body != body);
    }

    fn clear(&mut self) {
        self.events.clear();
    }

    fn generate_potential_contacts(&self, contacts: &mut [PotentialContact]) -> usize {
        let mut count = 0;
        let mut active: Vec<BodyHandle> = Vec::new();

        for event in &self.events {
            if event.is_start {
                for &other in &active {
                    if count == contacts.len() {
                        return count;
                    }
                    contacts[count] = PotentialContact {
                        bodies: [other, event.body],
                    };
                    count += 1;
                }
                active.push(event.body);
            } else {
                active.retain(|&open| open != event.body);
            }
        }
        count
    }
}
