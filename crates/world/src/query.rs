//! [`SpatialQuery`] for [`CollisionWorld`].
//!
//! Sphere casts march the ball along the path in steps no longer than half
//! its radius, then bisect the last free and first blocked positions.

use glam::Vec3;
use stride_motion::{LayerMask, ProbeHit, SpatialQuery};

use crate::world::CollisionWorld;

const SWEEP_REFINE_ITERATIONS: usize = 12;
const MIN_SWEEP_STEP: f32 = 0.01;

impl SpatialQuery for CollisionWorld {
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<ProbeHit> {
        let dir = direction.try_normalize()?;
        let hit_at = |distance: f32, normal: Vec3| {
            let center = origin + dir * distance;
            ProbeHit {
                distance,
                point: center - normal * radius,
                normal,
            }
        };

        // Starting inside geometry counts as an immediate hit.
        if let Some(normal) = self.sphere_contact(origin, radius, layers) {
            return Some(hit_at(0.0, normal));
        }

        let step = (radius * 0.5).max(MIN_SWEEP_STEP);
        let mut free = 0.0_f32;

        while free < max_distance {
            let next = (free + step).min(max_distance);
            if self.sphere_contact(origin + dir * next, radius, layers).is_none() {
                free = next;
                continue;
            }

            let mut blocked = next;
            for _ in 0..SWEEP_REFINE_ITERATIONS {
                let mid = (free + blocked) * 0.5;
                if self.sphere_contact(origin + dir * mid, radius, layers).is_some() {
                    blocked = mid;
                } else {
                    free = mid;
                }
            }

            let normal = self
                .sphere_contact(origin + dir * blocked, radius, layers)
                .unwrap_or(-dir);
            return Some(hit_at(free, normal));
        }

        None
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<ProbeHit> {
        let dir = direction.try_normalize()?;
        self.cast_ray(origin, dir, max_distance, layers)
            .map(|(distance, normal)| ProbeHit {
                distance,
                point: origin + dir * distance,
                normal,
            })
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: LayerMask) -> bool {
        self.sphere_contact(center, radius, layers).is_some()
    }
}
