//! Collision world containing all static geometry.
//!
//! Brushes are parry shapes placed in world space and tagged with
//! [`LayerMask`] bits. Queries skip brushes whose layers don't intersect the
//! query mask.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Real, Vector};
use parry3d::query::{contact, Ray, RayCast};
use parry3d::shape::{Ball, SharedShape};
use stride_motion::{CapsuleShape, LayerMask};
use thiserror::Error;

/// Geometry that could not be added to the world.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("convex hull needs at least 4 non-coplanar points, got {0} points")]
    DegenerateHull(usize),

    #[error("invalid triangle mesh: {0}")]
    InvalidMesh(String),
}

/// A piece of collision geometry in the world.
#[derive(Debug, Clone)]
pub struct CollisionBrush {
    pub id: u32,
    pub shape: SharedShape,
    /// Position and orientation in world space.
    pub transform: Isometry<Real>,
    pub layers: LayerMask,
}

/// The collision world.
///
/// Supports axis-aligned boxes, convex hulls, and triangle meshes. Immutable
/// during queries, so it can be shared across threads.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    brushes: Vec<CollisionBrush>,
    next_id: u32,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis-aligned box.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the box in world space
    /// * `half_extents` - Half-size in each axis
    /// * `layers` - Layer bits for query filtering
    pub fn add_box(&mut self, center: Vec3, half_extents: Vec3, layers: LayerMask) -> u32 {
        let shape = SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z);
        let transform = Isometry::translation(center.x, center.y, center.z);
        self.push(shape, transform, layers)
    }

    /// Add a convex hull around `points`.
    pub fn add_convex_hull(&mut self, points: &[Vec3], layers: LayerMask) -> Result<u32, WorldError> {
        if points.len() < 4 {
            return Err(WorldError::DegenerateHull(points.len()));
        }
        let parry_points: Vec<Point<Real>> = points.iter().map(|p| to_point(*p)).collect();
        let shape = SharedShape::convex_hull(&parry_points)
            .ok_or(WorldError::DegenerateHull(points.len()))?;
        Ok(self.push(shape, Isometry::identity(), layers))
    }

    /// Add a triangle mesh.
    ///
    /// # Arguments
    ///
    /// * `vertices` - Mesh vertex positions
    /// * `indices` - Triangle indices (3 per triangle)
    /// * `layers` - Layer bits for query filtering
    pub fn add_triangle_mesh(
        &mut self,
        vertices: &[Vec3],
        indices: &[[u32; 3]],
        layers: LayerMask,
    ) -> Result<u32, WorldError> {
        if indices.is_empty() {
            return Err(WorldError::InvalidMesh("no triangles".to_string()));
        }
        let vertex_count = vertices.len() as u32;
        if let Some(bad) = indices.iter().flatten().find(|i| **i >= vertex_count) {
            return Err(WorldError::InvalidMesh(format!(
                "index {} out of range for {} vertices",
                bad, vertex_count
            )));
        }

        let parry_vertices: Vec<Point<Real>> = vertices.iter().map(|v| to_point(*v)).collect();
        let shape = SharedShape::trimesh(parry_vertices, indices.to_vec())
            .map_err(|err| WorldError::InvalidMesh(format!("{:?}", err)))?;
        Ok(self.push(shape, Isometry::identity(), layers))
    }

    /// Remove a brush. Returns whether it existed.
    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.brushes.len();
        self.brushes.retain(|b| b.id != id);
        self.brushes.len() != before
    }

    pub fn clear(&mut self) {
        self.brushes.clear();
    }

    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    /// Brushes visible to a query on `layers`.
    pub(crate) fn brushes_on(&self, layers: LayerMask) -> impl Iterator<Item = &CollisionBrush> {
        self.brushes.iter().filter(move |b| layers.intersects(b.layers))
    }

    /// Closest ray hit: distance and surface normal.
    pub(crate) fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<(f32, Vec3)> {
        let ray = Ray::new(to_point(origin), to_vector(direction));
        let mut closest: Option<(f32, &CollisionBrush)> = None;

        for brush in self.brushes_on(layers) {
            if let Some(toi) = brush.shape.cast_ray(&brush.transform, &ray, max_distance, true) {
                if closest.map_or(true, |(best, _)| toi < best) {
                    closest = Some((toi, brush));
                }
            }
        }

        closest.map(|(toi, brush)| (toi, hit_normal(&ray, toi, brush)))
    }

    /// Outward surface normal of the first brush a sphere at `center`
    /// touches, or `None` if it touches nothing.
    pub(crate) fn sphere_contact(&self, center: Vec3, radius: f32, layers: LayerMask) -> Option<Vec3> {
        let ball = Ball::new(radius);
        let transform = Isometry::translation(center.x, center.y, center.z);

        self.brushes_on(layers).find_map(|brush| {
            match contact(&transform, &ball, &brush.transform, brush.shape.as_ref(), 0.0) {
                Ok(Some(c)) => Some(-Vec3::new(c.normal1.x, c.normal1.y, c.normal1.z)),
                _ => None,
            }
        })
    }

    /// Push a capsule with feet at `feet` out of solid geometry.
    ///
    /// Returns the corrected feet position.
    pub fn resolve_penetration(&self, feet: Vec3, capsule: CapsuleShape, layers: LayerMask) -> Vec3 {
        let half_segment = (capsule.height * 0.5 - capsule.radius).max(0.0);
        let shape = SharedShape::capsule_y(half_segment, capsule.radius);
        let mut position = feet;

        // A few passes settle corners where two brushes push at once.
        for _ in 0..4 {
            let center = position + Vec3::Y * capsule.center_offset;
            let transform = Isometry::translation(center.x, center.y, center.z);
            let mut correction = Vec3::ZERO;

            for brush in self.brushes_on(layers) {
                if let Ok(Some(c)) = contact(
                    &transform,
                    shape.as_ref(),
                    &brush.transform,
                    brush.shape.as_ref(),
                    0.0,
                ) {
                    let depth = -c.dist;
                    if depth > 0.0 {
                        let outward = -Vec3::new(c.normal1.x, c.normal1.y, c.normal1.z);
                        correction += outward * (depth + 0.001);
                    }
                }
            }

            if correction == Vec3::ZERO {
                break;
            }
            position += correction;
        }

        position
    }

    fn push(&mut self, shape: SharedShape, transform: Isometry<Real>, layers: LayerMask) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.brushes.push(CollisionBrush {
            id,
            shape,
            transform,
            layers,
        });
        log::trace!("Added brush {} on layers {:#x}", id, layers.0);
        id
    }
}

/// Surface normal for a ray hit, falling back to facing the ray.
fn hit_normal(ray: &Ray, toi: f32, brush: &CollisionBrush) -> Vec3 {
    match brush
        .shape
        .cast_ray_and_get_normal(&brush.transform, ray, toi + 0.01, true)
    {
        Some(hit) => Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z),
        None => -Vec3::new(ray.dir.x, ray.dir.y, ray.dir.z).normalize_or_zero(),
    }
}

#[inline]
pub(crate) fn to_point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

#[inline]
pub(crate) fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

// ============================================================================
// Tests
// ============================================================================
