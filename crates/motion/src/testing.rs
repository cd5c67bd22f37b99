//! Deterministic in-memory geometry for unit tests.

use glam::Vec3;

use crate::sensor::{LayerMask, ProbeHit, SpatialQuery};

#[derive(Debug, Clone, Copy)]
struct Aabb {
    min: Vec3,
    max: Vec3,
    layers: LayerMask,
}

impl Aabb {
    fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    /// Slab test. Returns entry distance and face normal.
    fn ray(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<(f32, Vec3)> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let (mut t0, mut t1) = ((lo - o) / d, (hi - o) / d);
            let mut n = Vec3::ZERO;
            n[axis] = -d.signum();
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_min {
                t_min = t0;
                normal = n;
            }
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some((t_min, if normal == Vec3::ZERO { -dir } else { normal }))
    }
}

/// Infinite floor plane plus axis-aligned boxes, all on [`LayerMask::WORLD`].
#[derive(Debug, Clone, Default)]
pub struct FakeWorld {
    floor: Option<f32>,
    boxes: Vec<Aabb>,
}

impl FakeWorld {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_floor(height: f32) -> Self {
        Self {
            floor: Some(height),
            boxes: Vec::new(),
        }
    }

    pub fn with_box(self, min: Vec3, max: Vec3) -> Self {
        self.with_box_on(min, max, LayerMask::WORLD)
    }

    pub fn with_box_on(mut self, min: Vec3, max: Vec3, layers: LayerMask) -> Self {
        self.boxes.push(Aabb { min, max, layers });
        self
    }

    fn floor_for(&self, layers: LayerMask) -> Option<f32> {
        self.floor.filter(|_| layers.intersects(LayerMask::WORLD))
    }
}

impl SpatialQuery for FakeWorld {
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<ProbeHit> {
        // Only the floor matters for downward ground probes here.
        let floor = self.floor_for(layers)?;
        if direction.y >= 0.0 {
            return None;
        }
        let gap = origin.y - radius - floor;
        let distance = (gap / -direction.y).max(0.0);
        (distance <= max_distance).then(|| ProbeHit {
            distance,
            point: Vec3::new(origin.x, floor, origin.z),
            normal: Vec3::Y,
        })
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<ProbeHit> {
        let mut best: Option<(f32, Vec3)> = None;

        if let Some(floor) = self.floor_for(layers) {
            if direction.y < 0.0 && origin.y >= floor {
                let t = (origin.y - floor) / -direction.y;
                if t <= max_distance {
                    best = Some((t, Vec3::Y));
                }
            }
        }

        for aabb in self.boxes.iter().filter(|b| layers.intersects(b.layers)) {
            if let Some((t, normal)) = aabb.ray(origin, direction, max_distance) {
                if best.map_or(true, |(d, _)| t < d) {
                    best = Some((t, normal));
                }
            }
        }

        best.map(|(distance, normal)| ProbeHit {
            distance,
            point: origin + direction * distance,
            normal,
        })
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: LayerMask) -> bool {
        if let Some(floor) = self.floor_for(layers) {
            if center.y - radius < floor {
                return true;
            }
        }
        self.boxes
            .iter()
            .filter(|b| layers.intersects(b.layers))
            .any(|b| b.closest_point(center).distance_squared(center) < radius * radius)
    }
}
