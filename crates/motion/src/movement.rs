//! Horizontal velocity from move intent.

use glam::Vec3;

use crate::config::MotionConfig;
use crate::look::MoveBasis;
use crate::state::{MotionMode, MotionState};

/// Turns move intent, orientation, and mode into horizontal velocity.
pub struct HorizontalMover;

impl HorizontalMover {
    /// Can sprint speed be selected right now?
    ///
    /// Needs sprint held, stamina left, no crouch, and a stick pushed past
    /// the deadzone on either axis.
    pub fn can_sprint(state: &MotionState, config: &MotionConfig) -> bool {
        let dominant = state.move_input.x.abs().max(state.move_input.y.abs());
        state.sprint_held
            && state.stamina.is_available()
            && !state.mode.is_low()
            && dominant > config.input_deadzone
    }

    /// Target speed for the current mode, highest priority first.
    ///
    /// Returns the speed and whether it is the sprint speed.
    pub fn target_speed(state: &MotionState, config: &MotionConfig) -> (f32, bool) {
        match state.mode {
            MotionMode::Sliding => (config.slide_speed, false),
            MotionMode::Crouching => (config.crouch_speed, false),
            _ if Self::can_sprint(state, config) => (config.sprint_speed, true),
            _ => (config.walk_speed, false),
        }
    }

    /// Blend horizontal velocity toward the target for this tick.
    ///
    /// The velocity moves by at most `rate * delta_time` and never passes the
    /// target. Airborne, both rates are scaled by `air_control`.
    pub fn update(
        state: &mut MotionState,
        config: &MotionConfig,
        basis: &MoveBasis,
        delta_time: f32,
    ) {
        let (speed, sprinting) = Self::target_speed(state, config);
        state.sprinting = sprinting;

        let has_input = state.has_move_input(config);
        let target = if has_input {
            basis.wish_direction(state.move_input) * speed
        } else {
            Vec3::ZERO
        };

        let mut rate = if has_input {
            config.acceleration
        } else {
            config.deceleration
        };
        if !state.grounded {
            rate *= config.air_control;
        }

        state.horizontal_velocity =
            move_towards(state.horizontal_velocity, target, rate * delta_time);
        state.horizontal_velocity.y = 0.0;
    }
}

/// Step `current` toward `target` by at most `max_step`.
pub fn move_towards(current: Vec3, target: Vec3, max_step: f32) -> Vec3 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_step || distance < f32::EPSILON {
        target
    } else {
        current + delta / distance * max_step
    }
}
