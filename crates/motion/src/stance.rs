//! Stance arbitration: crouch, slide, vault, and capsule height.
//!
//! Standing and crouching follow the crouch intent directly. Slides and vaults
//! are timed phases with an `elapsed` counter advanced by the fixed tick. A
//! phase always runs to completion unless [`StanceManager::cancel`] aborts it,
//! and both paths restore collision and clear any forced velocity.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::MotionConfig;
use crate::sensor::SpatialQuery;
use crate::state::{MotionMode, MotionState};

/// A running slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlidePhase {
    pub elapsed: f32,
}

/// A running vault: a scripted move from `start` to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VaultPhase {
    pub elapsed: f32,
    pub start: Vec3,
    pub target: Vec3,
}

impl VaultPhase {
    /// Position along the vault path.
    pub fn position(&self, config: &MotionConfig) -> Vec3 {
        let t = (self.elapsed / config.vault_duration).clamp(0.0, 1.0);
        self.start.lerp(self.target, t)
    }
}

/// Timed sub-state that overrides normal movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimedPhase {
    Slide(SlidePhase),
    Vault(VaultPhase),
}

/// Outcome of advancing a phase by one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseUpdate {
    /// Position the host should place the character at (vaults only).
    pub scripted_position: Option<Vec3>,
    /// The phase finished this tick.
    pub finished: bool,
}

/// What [`StanceManager::cancel`] aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelledPhase {
    Slide,
    Vault,
}

/// Mode arbitration and height easing.
pub struct StanceManager;

impl StanceManager {
    // ========================================================================
    // Crouch
    // ========================================================================

    /// Follow the crouch intent while standing or crouching.
    ///
    /// Slides and vaults ignore it; their end state picks it up instead.
    /// Standing up is refused while something blocks the standing capsule.
    pub fn apply_crouch_intent<W: SpatialQuery + ?Sized>(
        state: &mut MotionState,
        config: &MotionConfig,
        feet: Vec3,
        world: &W,
    ) {
        match (state.mode, state.crouch_held) {
            (MotionMode::Standing, true) => {
                log::debug!("Stance: standing -> crouching");
                state.mode = MotionMode::Crouching;
            }
            (MotionMode::Crouching, false) => {
                if Self::has_headroom(config, feet, world) {
                    log::debug!("Stance: crouching -> standing");
                    state.mode = MotionMode::Standing;
                }
            }
            _ => {}
        }
    }

    /// Whether a standing capsule fits at `feet`.
    pub fn has_headroom<W: SpatialQuery + ?Sized>(
        config: &MotionConfig,
        feet: Vec3,
        world: &W,
    ) -> bool {
        let head = feet + Vec3::Y * (config.standing_height - config.capsule_radius);
        !world.overlap_sphere(head, config.capsule_radius * 0.9, config.obstacle_layers)
    }

    /// Mode once no phase is running.
    fn settle<W: SpatialQuery + ?Sized>(
        state: &mut MotionState,
        config: &MotionConfig,
        feet: Vec3,
        world: &W,
    ) {
        state.mode = if state.crouch_held || !Self::has_headroom(config, feet, world) {
            MotionMode::Crouching
        } else {
            MotionMode::Standing
        };
    }

    // ========================================================================
    // Slide
    // ========================================================================

    /// Whether a slide may start this tick.
    pub fn can_slide(state: &MotionState, config: &MotionConfig) -> bool {
        state.mode == MotionMode::Crouching
            && state.phase.is_none()
            && state.crouch_held
            && state.sprint_held
            && state.slide_armed
            && state.grounded
            && state.horizontal_speed() > config.slide_threshold_speed
            && state.stamina.is_available()
    }

    /// Start a slide if every condition holds.
    pub fn try_start_slide(state: &mut MotionState, config: &MotionConfig) -> bool {
        if !Self::can_slide(state, config) {
            return false;
        }

        log::debug!("Slide start at {:.2} m/s", state.horizontal_speed());
        state.mode = MotionMode::Sliding;
        state.phase = Some(TimedPhase::Slide(SlidePhase { elapsed: 0.0 }));
        state.slide_armed = false;
        true
    }

    /// Advance a running slide by one tick.
    ///
    /// The push follows `forward` every tick, so the slide bends with the view.
    pub fn advance_slide<W: SpatialQuery + ?Sized>(
        state: &mut MotionState,
        config: &MotionConfig,
        forward: Vec3,
        delta_time: f32,
        feet: Vec3,
        world: &W,
    ) -> PhaseUpdate {
        let Some(TimedPhase::Slide(mut slide)) = state.phase else {
            return PhaseUpdate::default();
        };

        slide.elapsed += delta_time;
        if slide.elapsed >= config.slide_duration {
            state.phase = None;
            Self::settle(state, config, feet, world);
            log::debug!("Slide end -> {:?}", state.mode);
            return PhaseUpdate {
                scripted_position: None,
                finished: true,
            };
        }

        state.phase = Some(TimedPhase::Slide(slide));
        state.horizontal_velocity = forward * config.slide_speed;
        PhaseUpdate::default()
    }

    // ========================================================================
    // Vault
    // ========================================================================

    /// Look for a vaultable obstacle ahead.
    ///
    /// Needs a forward hit whose height above the feet is inside the vault
    /// band, a ledge on top of it that is also inside the band, and an empty
    /// clearance sphere above the obstacle. Returns the vault path on success.
    pub fn find_vault<W: SpatialQuery + ?Sized>(
        config: &MotionConfig,
        feet: Vec3,
        forward: Vec3,
        world: &W,
    ) -> Option<VaultPhase> {
        let origin = feet + Vec3::Y * config.vault_probe_height;
        let hit = world.raycast(origin, forward, config.vault_max_distance, config.obstacle_layers)?;

        let hit_height = hit.point.y - feet.y;
        if hit_height <= config.vault_min_height || hit_height >= config.vault_max_height {
            return None;
        }

        let clearance = hit.point + Vec3::Y * (config.vault_max_height + config.vault_clearance_margin);
        if world.overlap_sphere(clearance, config.vault_clearance_radius, config.obstacle_layers) {
            log::trace!("Vault blocked above obstacle at {:?}", hit.point);
            return None;
        }

        // Find the top of the obstacle just past its face.
        let probe_top = config.vault_max_height + config.vault_clearance_margin;
        let ledge_origin = Vec3::new(hit.point.x, feet.y + probe_top, hit.point.z)
            + forward * config.vault_ledge_inset;
        let ledge = world.raycast(ledge_origin, Vec3::NEG_Y, probe_top, config.obstacle_layers)?;
        let ledge_height = ledge.point.y - feet.y;
        if ledge_height <= config.vault_min_height || ledge_height >= config.vault_max_height {
            return None;
        }

        Some(VaultPhase {
            elapsed: 0.0,
            start: feet,
            target: ledge.point + Vec3::Y * config.vault_lift + forward * config.vault_overshoot,
        })
    }

    /// Start a vault if the character is able to and an obstacle allows it.
    pub fn try_start_vault<W: SpatialQuery + ?Sized>(
        state: &mut MotionState,
        config: &MotionConfig,
        feet: Vec3,
        forward: Vec3,
        world: &W,
    ) -> Option<VaultPhase> {
        let able = state.grounded
            && state.phase.is_none()
            && matches!(state.mode, MotionMode::Standing | MotionMode::Crouching)
            && state.has_move_input(config);
        if !able {
            return None;
        }

        let vault = Self::find_vault(config, feet, forward, world)?;
        log::debug!("Vault start {:?} -> {:?}", vault.start, vault.target);

        state.mode = MotionMode::Vaulting;
        state.phase = Some(TimedPhase::Vault(vault));
        state.collision_enabled = false;
        state.vertical_velocity = 0.0;
        state.airborne_velocity = None;
        Some(vault)
    }

    /// Advance a running vault by one tick.
    pub fn advance_vault<W: SpatialQuery + ?Sized>(
        state: &mut MotionState,
        config: &MotionConfig,
        delta_time: f32,
        world: &W,
    ) -> PhaseUpdate {
        let Some(TimedPhase::Vault(mut vault)) = state.phase else {
            return PhaseUpdate::default();
        };

        vault.elapsed += delta_time;
        state.vertical_velocity = 0.0;

        if vault.elapsed >= config.vault_duration {
            let position = vault.target;
            state.phase = None;
            state.collision_enabled = true;
            Self::settle(state, config, vault.target, world);
            log::debug!("Vault end at {:?} -> {:?}", position, state.mode);
            return PhaseUpdate {
                scripted_position: Some(position),
                finished: true,
            };
        }

        state.phase = Some(TimedPhase::Vault(vault));
        PhaseUpdate {
            scripted_position: Some(vault.position(config)),
            finished: false,
        }
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    /// Abort any running phase and restore normal movement.
    ///
    /// Collision comes back on and the slide push is removed. A cancelled
    /// slide stays crouched; standing up is left to
    /// [`apply_crouch_intent`](Self::apply_crouch_intent), which checks headroom.
    pub fn cancel(state: &mut MotionState) -> Option<CancelledPhase> {
        let cancelled = match state.phase.take()? {
            TimedPhase::Slide(_) => {
                state.horizontal_velocity = Vec3::ZERO;
                CancelledPhase::Slide
            }
            TimedPhase::Vault(_) => {
                state.vertical_velocity = 0.0;
                CancelledPhase::Vault
            }
        };

        state.collision_enabled = true;
        state.mode = match cancelled {
            CancelledPhase::Slide => MotionMode::Crouching,
            CancelledPhase::Vault => MotionMode::resting(state.crouch_held),
        };
        log::debug!("Cancelled {:?}", cancelled);
        Some(cancelled)
    }

    // ========================================================================
    // Height
    // ========================================================================

    /// Capsule height the current stance wants.
    pub fn target_height(state: &MotionState, config: &MotionConfig) -> f32 {
        let low = match state.mode {
            MotionMode::Vaulting => state.crouch_held,
            mode => mode.is_low(),
        };
        if low {
            config.crouch_height
        } else {
            config.standing_height
        }
    }

    /// Ease the capsule toward the stance height.
    ///
    /// Feet stay put: the center offset is half the height. The eye moves by
    /// the same amount the capsule top does.
    pub fn ease_height(state: &mut MotionState, config: &MotionConfig, delta_time: f32) {
        let target = Self::target_height(state, config);
        let current = state.capsule_height;
        if current == target {
            return;
        }

        let t = (delta_time * config.crouch_transition_speed).min(1.0);
        let mut height = current + (target - current) * t;
        if (target - height).abs() <= config.height_snap_epsilon {
            height = target;
        }

        state.capsule_height = height;
        state.capsule_center_offset = height * 0.5;
        state.eye_height =
            (state.eye_height + (height - current)).clamp(config.eye_height_min, config.eye_height_max);

        debug_assert!(
            state.capsule_height >= config.crouch_height.min(config.standing_height) - 1e-4
                && state.capsule_height <= config.standing_height.max(config.crouch_height) + 1e-4
        );
    }
}
