mod naive;
mod sap;

pub use naive::NaiveBroadphase;
pub use sap::SweepAndPrune;

use crate::collision::{BodyHandle, PotentialContact};
use crate::geometry::BoundingSphere;

/// Finds pairs of bodies whose bounding volumes overlap.
///
/// The world rebuilds the broadphase every step: `clear` followed by one
/// `insert` per body. Implementations may report pairs that do not
/// actually touch, but must never omit a pair whose volumes overlap.
pub trait Broadphase {
    /// Registers a body with its bounding volume. Inserting a handle that
    /// is already present replaces its volume.
    fn insert(&mut self, body: BodyHandle, volume: BoundingSphere);

    /// Unregisters a body. Unknown handles are ignored.
    fn remove(&mut self, body: BodyHandle);

    /// Drops every registered body.
    fn clear(&mut self);

    /// Writes overlapping pairs into `contacts`, returning how many were
    /// written. Pairs past the buffer capacity are silently dropped.
    fn generate_potential_contacts(&self, contacts: &mut [PotentialContact]) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use proptest::prelude::*;

    fn sphere(x: f32, y: f32, z: f32, r: f32) -> BoundingSphere {
        BoundingSphere::new(Vec3::new(x, y, z), r)
    }

    /// Every pair the brute-force oracle finds must be reported.
    fn assert_sound(broadphase: &dyn Broadphase, volumes: &[BoundingSphere]) {
        let mut buffer = vec![PotentialContact::default(); volumes.len() * volumes.len()];
        let count = broadphase.generate_potential_contacts(&mut buffer);

        let reported: std::collections::HashSet<(u32, u32)> = buffer[..count]
            .iter()
            .map(|pc| {
                let (a, b) = (pc.bodies[0].0, pc.bodies[1].0);
                (a.min(b), a.max(b))
            })
            .collect();

        for i in 0..volumes.len() {
            for j in (i + 1)..volumes.len() {
                if volumes[i].overlaps(&volumes[j]) {
                    assert!(
                        reported.contains(&(i as u32, j as u32)),
                        "missing overlapping pair ({i}, {j})"
                    );
                }
            }
        }
    }

    fn populate(broadphase: &mut dyn Broadphase, volumes: &[BoundingSphere]) {
        for (i, volume) in volumes.iter().enumerate() {
            broadphase.insert(BodyHandle::new(i as u32), *volume);
        }
    }

    #[test]
    fn test_soundness_fixed_sets() {
        let volumes = vec![
            sphere(0.0, 0.0, 0.0, 1.0),
            sphere(1.5, 0.0, 0.0, 1.0),
            sphere(10.0, 0.0, 0.0, 1.0),
            sphere(10.5, 0.2, 0.0, 1.0),
            sphere(0.0, 0.5, 0.5, 0.25),
        ];

        let mut naive = NaiveBroadphase::new();
        populate(&mut naive, &volumes);
        assert_sound(&naive, &volumes);

        let mut sap = SweepAndPrune::new();
        populate(&mut sap, &volumes);
        assert_sound(&sap, &volumes);
    }

    proptest! {
        #[test]
        fn prop_soundness_random_sets(
            spheres in prop::collection::vec(
                (-20.0f32..20.0, -20.0f32..20.0, -20.0f32..20.0, 0.1f32..5.0),
                0..24,
            )
        ) {
            let volumes: Vec<BoundingSphere> = spheres
                .iter()
                .map(|&(x, y, z, r)| sphere(x, y, z, r))
                .collect();

            let mut naive = NaiveBroadphase::new();
            populate(&mut naive, &volumes);
            assert_sound(&naive, &volumes);

            let mut sap = SweepAndPrune::new();
            populate(&mut sap, &volumes);
            assert_sound(&sap, &volumes);
        }
    }

    #[test]
    fn test_truncation() {
        let volumes = vec![
            sphere(0.0, 0.0, 0.0, 2.0),
            sphere(0.5, 0.0, 0.0, 2.0),
            sphere(1.0, 0.0, 0.0, 2.0),
            sphere(1.5, 0.0, 0.0, 2.0),
        ];

        // 6 overlapping pairs, room for 2.
        let mut naive = NaiveBroadphase::new();
        populate(&mut naive, &volumes);
        let mut buffer = vec![PotentialContact::default(); 2];
        assert_eq!(naive.generate_potential_contacts(&mut buffer), 2);

        let mut sap = SweepAndPrune::new();
        populate(&mut sap, &volumes);
        assert_eq!(sap.generate_potential_contacts(&mut buffer), 2);
    }

    #[test]
    fn test_remove() {
        let volumes = vec![sphere(0.0, 0.0, 0.0, 1.0), sphere(1.0, 0.0, 0.0, 1.0)];

        let mut naive = NaiveBroadphase::new();
        populate(&mut naive, &volumes);
        naive.remove(BodyHandle::new(0));
        let mut buffer = vec![PotentialContact::default(); 8];
        assert_eq!(naive.generate_potential_contacts(&mut buffer), 0);

        let mut sap = SweepAndPrune::new();
        populate(&mut sap, &volumes);
        sap.remove(BodyHandle::new(1));
        assert_eq!(sap.generate_potential_contacts(&mut buffer), 0);
    }
}
