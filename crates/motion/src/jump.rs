//! Vertical integration with coyote time and jump buffering.
//!
//! A jump needs two things at once: a press no older than the buffer window
//! and ground contact no older than the coyote window. Both are checked every
//! tick whether or not the character is grounded, so a press just after
//! walking off a ledge still jumps, and a press just before landing jumps on
//! the landing tick.

use crate::config::MotionConfig;
use crate::state::MotionState;

/// Result of one vertical step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VerticalUpdate {
    /// A jump fired this tick.
    pub jumped: bool,
}

/// Turns ground contact and jump intent into vertical velocity.
pub struct VerticalIntegrator;

impl VerticalIntegrator {
    /// Record this tick's ground contact and jump press on the clock.
    ///
    /// Ground state must already be resolved for the tick.
    pub fn stamp(state: &mut MotionState) {
        if state.grounded {
            state.last_grounded_at = Some(state.clock);
        }
        if state.jump_requested {
            state.last_jump_request_at = Some(state.clock);
        }
    }

    /// Can a jump fire right now?
    pub fn can_jump(state: &MotionState, config: &MotionConfig) -> bool {
        let buffered = state
            .since(state.last_jump_request_at)
            .is_some_and(|t| t <= config.jump_buffer_time);
        let coyote = state
            .since(state.last_grounded_at)
            .is_some_and(|t| t <= config.coyote_time);
        buffered && coyote
    }

    /// Advance vertical velocity by `delta_time`.
    pub fn integrate(
        state: &mut MotionState,
        config: &MotionConfig,
        delta_time: f32,
    ) -> VerticalUpdate {
        if Self::can_jump(state, config) {
            state.vertical_velocity = config.jump_force;
            // One press, one jump. One ground contact, one jump.
            state.last_jump_request_at = None;
            state.last_grounded_at = None;
            return VerticalUpdate { jumped: true };
        }

        if state.grounded {
            state.vertical_velocity = config.grounded_stick_velocity;
        } else {
            let multiplier = if state.vertical_velocity < 0.0 {
                config.fall_gravity_multiplier
            } else {
                1.0
            };
            state.vertical_velocity -= config.gravity * multiplier * delta_time;
        }

        VerticalUpdate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 64.0;

    fn advance(state: &mut MotionState, config: &MotionConfig, grounded: bool) -> VerticalUpdate {
        state.clock += DT as f64;
        state.grounded = grounded;
        VerticalIntegrator::stamp(state);
        let result = VerticalIntegrator::integrate(state, config, DT);
        state.jump_requested = false;
        result
    }

    #[test]
    fn test_grounded_sticks() {
        let config = MotionConfig::default();
        let mut state = MotionState::new(&config);
        state.vertical_velocity = -9.0;

        advance(&mut state, &config, true);
        assert_eq!(state.vertical_velocity, config.grounded_stick_velocity);
    }

    #[test]
    fn test_jump_from_ground() {
        let config = MotionConfig::default();
        let mut state = MotionState::new(&config);
        advance(&mut state, &config, true);

        state.jump_requested = true;
        let result = advance(&mut state, &config, true);

        assert!(result.jumped);
        assert_eq!(state.vertical_velocity, config.jump_force);
        assert!(state.last_jump_request_at.is_none(), "Request consumed");
    }

    #[test]
    fn test_consumed_request_does_not_retrigger() {
        let config = MotionConfig::default();
        let mut state = MotionState::new(&config);
        state.jump_requested = true;
        assert!(advance(&mut state, &config, true).jumped);

        // Still "grounded" on the next tick (contact jitter): no second jump.
        assert!(!advance(&mut state, &config, true).jumped);
    }

    #[test]
    fn test_coyote_jump_while_airborne() {
        let config = MotionConfig::default();
        let mut state = MotionState::new(&config);
        advance(&mut state, &config, true);

        // Walk off the ledge and press 7 ticks later (0.109s < 0.12s).
        for _ in 0..6 {
            advance(&mut state, &config, false);
        }
        state.jump_requested = true;
        let result = advance(&mut state, &config, false);

        assert!(result.jumped, "Coyote time should allow the jump");
        assert_eq!(state.vertical_velocity, config.jump_force);
    }

    #[test]
    fn test_late_press_after_leaving_ground_never_jumps() {
        let config = MotionConfig::default();
        let mut state = MotionState::new(&config);
        advance(&mut state, &config, true);

        // 8 ticks = 0.125s, past both windows.
        for _ in 0..7 {
            advance(&mut state, &config, false);
        }
        state.jump_requested = true;
        for _ in 0..64 {
            assert!(!advance(&mut state, &config, false).jumped);
        }
    }

    #[test]
    fn test_buffered_press_fires_on_landing() {
        let config = MotionConfig::default();
        let mut state = MotionState::new(&config);
        state.vertical_velocity = -5.0;
        advance(&mut state, &config, false);

        state.jump_requested = true;
        assert!(!advance(&mut state, &config, false).jumped);
        for _ in 0..4 {
            advance(&mut state, &config, false);
        }

        // Lands 5 ticks after the press: still inside the buffer.
        let result = advance(&mut state, &config, true);
        assert!(result.jumped);
    }

    #[test]
    fn test_stale_buffered_press_is_dropped() {
        let config = MotionConfig::default();
        let mut state = MotionState::new(&config);
        state.vertical_velocity = -5.0;

        state.jump_requested = true;
        advance(&mut state, &config, false);
        for _ in 0..10 {
            advance(&mut state, &config, false);
        }

        assert!(!advance(&mut state, &config, true).jumped);
        assert_eq!(state.vertical_velocity, config.grounded_stick_velocity);
    }

    #[test]
    fn test_gravity_asymmetry() {
        let config = MotionConfig::default();

        let mut rising = MotionState::new(&config);
        rising.vertical_velocity = 5.0;
        advance(&mut rising, &config, false);
        let rise_delta = 5.0 - rising.vertical_velocity;

        let mut falling = MotionState::new(&config);
        falling.vertical_velocity = -5.0;
        advance(&mut falling, &config, false);
        let fall_delta = -5.0 - falling.vertical_velocity;

        let ratio = fall_delta / rise_delta;
        assert!(
            (ratio - config.fall_gravity_multiplier).abs() < 1e-4,
            "ratio {} != {}",
            ratio,
            config.fall_gravity_multiplier
        );
    }
}
