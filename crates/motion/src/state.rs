//! Per-character motion state.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::MotionConfig;
use crate::stamina::StaminaMeter;
use crate::stance::TimedPhase;

/// The character's body mode. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MotionMode {
    #[default]
    Standing,
    Crouching,
    Sliding,
    Vaulting,
}

impl MotionMode {
    /// Uses the crouched capsule.
    #[inline]
    pub fn is_low(self) -> bool {
        matches!(self, Self::Crouching | Self::Sliding)
    }

    /// Inside a timed phase that overrides normal movement.
    #[inline]
    pub fn is_scripted(self) -> bool {
        matches!(self, Self::Sliding | Self::Vaulting)
    }

    /// Resting mode for a crouch intent.
    #[inline]
    pub fn resting(crouch_held: bool) -> Self {
        if crouch_held {
            Self::Crouching
        } else {
            Self::Standing
        }
    }
}

/// Everything the controller tracks between ticks.
///
/// Owned by [`CharacterMotionController`](crate::CharacterMotionController);
/// hosts get read access through `state()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionState {
    /// Last move intent, clamped to unit length.
    pub move_input: Vec2,

    /// Last look intent.
    pub look_input: Vec2,

    /// Horizontal velocity (y is always zero).
    pub horizontal_velocity: Vec3,

    /// Vertical velocity, integrated separately.
    pub vertical_velocity: f32,

    pub mode: MotionMode,

    /// Running slide or vault, if any.
    pub phase: Option<TimedPhase>,

    pub stamina: StaminaMeter,

    /// Controller clock (seconds since activation).
    pub clock: f64,

    /// Clock time of the last grounded tick. Cleared when a jump consumes it.
    pub last_grounded_at: Option<f64>,

    /// Clock time of the last jump press. Cleared when a jump consumes it.
    pub last_jump_request_at: Option<f64>,

    /// Jump was pressed since the previous tick.
    pub jump_requested: bool,

    pub grounded: bool,

    /// Sprint speed was selected this tick.
    pub sprinting: bool,

    /// Last vertical velocity seen while airborne, for fall damage.
    pub airborne_velocity: Option<f32>,

    pub crouch_held: bool,
    pub sprint_held: bool,

    /// A fresh crouch press can start a slide. Consumed by the slide.
    pub slide_armed: bool,

    /// Normal collision response is active. False while vaulting.
    pub collision_enabled: bool,

    /// Current capsule height (meters).
    pub capsule_height: f32,

    /// Capsule center above the feet. Always half the height.
    pub capsule_center_offset: f32,

    /// Camera height above the feet, before bob and recoil.
    pub eye_height: f32,
}

impl MotionState {
    /// Standing pose with full stamina.
    pub fn new(config: &MotionConfig) -> Self {
        Self {
            move_input: Vec2::ZERO,
            look_input: Vec2::ZERO,
            horizontal_velocity: Vec3::ZERO,
            vertical_velocity: 0.0,
            mode: MotionMode::Standing,
            phase: None,
            stamina: StaminaMeter::new(config),
            clock: 0.0,
            last_grounded_at: None,
            last_jump_request_at: None,
            jump_requested: false,
            grounded: false,
            sprinting: false,
            airborne_velocity: None,
            crouch_held: false,
            sprint_held: false,
            slide_armed: false,
            collision_enabled: true,
            capsule_height: config.standing_height,
            capsule_center_offset: config.standing_height * 0.5,
            eye_height: config.eye_height,
        }
    }

    /// Combined velocity for the rigid body.
    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.horizontal_velocity + Vec3::Y * self.vertical_velocity
    }

    /// Horizontal speed (meters/second).
    #[inline]
    pub fn horizontal_speed(&self) -> f32 {
        self.horizontal_velocity.length()
    }

    /// Seconds since `stamp`, or `None` if it never happened.
    #[inline]
    pub fn since(&self, stamp: Option<f64>) -> Option<f32> {
        stamp.map(|t| (self.clock - t) as f32)
    }

    /// Has any move input beyond the deadzone.
    #[inline]
    pub fn has_move_input(&self, config: &MotionConfig) -> bool {
        self.move_input.length() >= config.input_deadzone
    }
}
