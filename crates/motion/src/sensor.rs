//! Environment queries used by the motion core.
//!
//! The controller never touches geometry directly. Hosts hand it something
//! implementing [`SpatialQuery`] (an engine adapter, the parry-backed
//! `stride_world::CollisionWorld`, or a fake in tests) and the core asks three
//! kinds of question: sphere casts for ground support, raycasts for obstacles,
//! and sphere overlaps for clearance.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::MotionConfig;

/// Layer bits used to filter environment queries.
///
/// Geometry carries one or more layer bits; a query only sees geometry whose
/// layers intersect the query mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);

    /// Static level geometry - floors, walls, terrain.
    pub const WORLD: Self = Self(1 << 0);

    /// Movable props - crates, barrels, vehicles.
    pub const PROPS: Self = Self(1 << 1);

    /// Invisible clip volumes that only block characters.
    pub const PLAYER_CLIP: Self = Self(1 << 2);

    /// Trigger volumes. Never block movement.
    pub const TRIGGER: Self = Self(1 << 3);

    /// Other characters.
    pub const CHARACTER: Self = Self(1 << 4);

    /// Matches every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// Surfaces a character can stand on.
    pub const GROUND: Self = Self(Self::WORLD.0 | Self::PROPS.0 | Self::PLAYER_CLIP.0);

    /// Things a character can vault over or be blocked by.
    pub const OBSTACLE: Self = Self(Self::WORLD.0 | Self::PROPS.0);

    /// Check if every bit of `other` is set.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if any bit of `other` is set.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

}

impl std::ops::BitOr for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for LayerMask {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

/// A single query hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeHit {
    /// Distance travelled along the query direction before contact.
    /// Zero when the probe started in contact.
    pub distance: f32,
    /// Contact point on the hit surface (world space).
    pub point: Vec3,
    /// Surface normal at the contact, pointing away from the surface.
    pub normal: Vec3,
}

/// Geometry queries the motion core needs from its environment.
///
/// Directions are expected to be unit length. Implementations should treat a
/// probe that starts in contact as a hit at distance zero.
pub trait SpatialQuery {
    /// Sweep a sphere from `origin` along `direction`.
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<ProbeHit>;

    /// Cast a ray from `origin` along `direction`.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<ProbeHit>;

    /// Check if a sphere overlaps any geometry on `layers`.
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: LayerMask) -> bool;
}

impl<T: SpatialQuery + ?Sized> SpatialQuery for &T {
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<ProbeHit> {
        (**self).sphere_cast(origin, radius, direction, max_distance, layers)
    }

    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<ProbeHit> {
        (**self).raycast(origin, direction, max_distance, layers)
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: LayerMask) -> bool {
        (**self).overlap_sphere(center, radius, layers)
    }
}

/// An environment with no geometry at all. Everything is open air.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSpace;

impl SpatialQuery for OpenSpace {
    fn sphere_cast(&self, _: Vec3, _: f32, _: Vec3, _: f32, _: LayerMask) -> Option<ProbeHit> {
        None
    }

    fn raycast(&self, _: Vec3, _: Vec3, _: f32, _: LayerMask) -> Option<ProbeHit> {
        None
    }

    fn overlap_sphere(&self, _: Vec3, _: f32, _: LayerMask) -> bool {
        false
    }
}

/// Ground support check.
///
/// Casts a small sphere down from just above the feet. Stateless: calling it
/// twice with the same inputs gives the same answer.
pub struct GroundSensor;

impl GroundSensor {
    /// Probe for supporting ground under `feet`.
    pub fn probe<W: SpatialQuery + ?Sized>(
        feet: Vec3,
        config: &MotionConfig,
        world: &W,
    ) -> Option<ProbeHit> {
        let origin = feet + Vec3::Y * config.ground_probe_lift;
        world.sphere_cast(
            origin,
            config.ground_probe_radius,
            Vec3::NEG_Y,
            config.ground_probe_distance(),
            config.ground_layers,
        )
    }

    /// Is the capsule with feet at `feet` currently supported?
    pub fn is_grounded<W: SpatialQuery + ?Sized>(
        feet: Vec3,
        config: &MotionConfig,
        world: &W,
    ) -> bool {
        Self::probe(feet, config, world).is_some()
    }
}
