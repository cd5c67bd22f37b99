//! Motion tuning values.
//!
//! Everything the controller needs to feel right lives in one flat struct,
//! grouped by concern. Units are metric (meters, seconds) unless noted.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sensor::LayerMask;

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("`{field}` must be a finite positive number, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("`{field}` must be finite and not negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("`{field}` must be in [0, 1], got {value}")]
    NotUnit { field: &'static str, value: f32 },

    #[error("crouch height {crouch} exceeds standing height {standing}")]
    CrouchTallerThanStanding { crouch: f32, standing: f32 },

    #[error("vault height band is empty: min {min} >= max {max}")]
    EmptyVaultBand { min: f32, max: f32 },

    #[error("pitch limits are inverted: min {min} >= max {max}")]
    InvertedPitchLimits { min: f32, max: f32 },

    #[error("eye height {eye} is outside [{min}, {max}]")]
    EyeHeightOutOfRange { eye: f32, min: f32, max: f32 },
}

/// Configuration for character motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    // ========================================================================
    // Capsule
    // ========================================================================
    /// Capsule radius (meters).
    pub capsule_radius: f32,

    /// Standing capsule height (meters).
    pub standing_height: f32,

    /// Crouching and sliding capsule height (meters).
    pub crouch_height: f32,

    /// Height easing rate (per second).
    pub crouch_transition_speed: f32,

    /// Heights closer than this to the target snap onto it.
    pub height_snap_epsilon: f32,

    /// Camera height above the feet when standing (meters).
    pub eye_height: f32,

    /// Lowest allowed camera height (meters).
    pub eye_height_min: f32,

    /// Highest allowed camera height (meters).
    pub eye_height_max: f32,

    // ========================================================================
    // Horizontal Movement
    // ========================================================================
    /// Walking speed (meters/second).
    pub walk_speed: f32,

    /// Sprinting speed (meters/second).
    pub sprint_speed: f32,

    /// Crouched speed (meters/second).
    pub crouch_speed: f32,

    /// Forward push while sliding (meters/second).
    pub slide_speed: f32,

    /// Rate toward the target velocity with input (meters/second²).
    pub acceleration: f32,

    /// Rate toward rest without input (meters/second²).
    pub deceleration: f32,

    /// Multiplier on both rates while airborne (0.0 - 1.0).
    pub air_control: f32,

    /// Stick magnitude below which input counts as released.
    pub input_deadzone: f32,

    // ========================================================================
    // Vertical Movement
    // ========================================================================
    /// Upward velocity applied on jump (meters/second).
    pub jump_force: f32,

    /// Gravity magnitude (meters/second²).
    pub gravity: f32,

    /// Gravity multiplier while already falling.
    pub fall_gravity_multiplier: f32,

    /// Grace period after leaving ground where a jump still works (seconds).
    pub coyote_time: f32,

    /// How long an early jump press is remembered (seconds).
    pub jump_buffer_time: f32,

    /// Vertical velocity held while standing on ground (meters/second).
    pub grounded_stick_velocity: f32,

    /// Ground is ignored while rising faster than this (meters/second).
    pub ground_ignore_rise_speed: f32,

    // ========================================================================
    // Ground Probe
    // ========================================================================
    /// Extra probe reach below the feet (meters).
    pub ground_check_distance: f32,

    /// Probe sphere radius (meters).
    pub ground_probe_radius: f32,

    /// Probe origin above the feet (meters).
    pub ground_probe_lift: f32,

    /// Layers that count as walkable ground.
    pub ground_layers: LayerMask,

    // ========================================================================
    // Slide
    // ========================================================================
    /// Horizontal speed required to start a slide (meters/second).
    pub slide_threshold_speed: f32,

    /// Slide length (seconds).
    pub slide_duration: f32,

    // ========================================================================
    // Vault
    // ========================================================================
    /// Obstacle probe reach (meters).
    pub vault_max_distance: f32,

    /// Lowest vaultable ledge above the feet (meters).
    pub vault_min_height: f32,

    /// Highest vaultable ledge above the feet (meters).
    pub vault_max_height: f32,

    /// Obstacle probe origin above the feet (meters).
    pub vault_probe_height: f32,

    /// Clearance sphere radius (meters).
    pub vault_clearance_radius: f32,

    /// Clearance sphere sits this far above the max vault height (meters).
    pub vault_clearance_margin: f32,

    /// Ledge probe distance past the obstacle face (meters).
    pub vault_ledge_inset: f32,

    /// Final position lift above the ledge (meters).
    pub vault_lift: f32,

    /// Final position distance past the ledge probe (meters).
    pub vault_overshoot: f32,

    /// Scripted move length (seconds).
    pub vault_duration: f32,

    /// Layers that can be vaulted over or block the clearance check.
    pub obstacle_layers: LayerMask,

    // ========================================================================
    // Stamina
    // ========================================================================
    pub max_stamina: f32,

    /// Units per second while sprinting or sliding.
    pub stamina_drain_rate: f32,

    /// Units per second once recovery starts.
    pub stamina_recover_rate: f32,

    /// Seconds without draining before recovery starts.
    pub stamina_recover_delay: f32,

    // ========================================================================
    // Camera Feedback
    // ========================================================================
    /// Head bob amplitude (meters).
    pub head_bob_amount: f32,

    /// Head bob phase rate at walk speed (radians/second).
    pub head_bob_frequency: f32,

    pub bob_crouch_scale: f32,
    pub bob_sprint_scale: f32,

    /// Horizontal speed needed for bob (meters/second).
    pub bob_speed_threshold: f32,

    /// Rate the bob offset eases back to rest (per second).
    pub bob_return_speed: f32,

    /// Camera offset per degree of recoil (meters).
    pub recoil_amount: f32,

    /// Recoil exponential decay rate (per second).
    pub recoil_return_speed: f32,

    /// Seconds between footsteps while walking.
    pub footstep_interval_walk: f32,

    /// Seconds between footsteps while sprinting.
    pub footstep_interval_sprint: f32,

    /// Seconds between footsteps while crouched.
    pub footstep_interval_crouch: f32,

    /// Horizontal speed needed for footsteps (meters/second).
    pub footstep_min_speed: f32,

    // ========================================================================
    // Look
    // ========================================================================
    /// Degrees per second per unit of look input (x = yaw, y = pitch).
    pub look_sensitivity: Vec2,

    /// Lowest pitch (degrees, negative looks down).
    pub min_pitch_degrees: f32,

    /// Highest pitch (degrees).
    pub max_pitch_degrees: f32,

    /// Flip vertical look input.
    pub invert_look_y: bool,

    // ========================================================================
    // Fall Damage
    // ========================================================================
    /// Landing speed below which no damage is dealt (meters/second).
    pub fall_damage_min_velocity: f32,

    /// Damage per meter/second past the threshold.
    pub fall_damage_multiplier: f32,

    // ========================================================================
    // Simulation
    // ========================================================================
    /// Longest step a single tick integrates (seconds).
    pub max_tick_delta: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            // Capsule
            capsule_radius: 0.4,
            standing_height: 1.8,
            crouch_height: 1.0,
            crouch_transition_speed: 8.0,
            height_snap_epsilon: 1e-3,
            eye_height: 1.6,
            eye_height_min: 0.1,
            eye_height_max: 2.0,

            // Horizontal
            walk_speed: 5.0,
            sprint_speed: 9.0,
            crouch_speed: 2.5,
            slide_speed: 10.0,
            acceleration: 20.0,
            deceleration: 20.0,
            air_control: 0.5,
            input_deadzone: 0.1,

            // Vertical
            jump_force: 7.0,
            gravity: 24.0,
            fall_gravity_multiplier: 2.5,
            coyote_time: 0.12,
            jump_buffer_time: 0.12,
            grounded_stick_velocity: -2.0,
            ground_ignore_rise_speed: 0.1,

            // Ground probe
            ground_check_distance: 0.1,
            ground_probe_radius: 0.2,
            ground_probe_lift: 0.1,
            ground_layers: LayerMask::GROUND,

            // Slide
            slide_threshold_speed: 6.0,
            slide_duration: 0.9,

            // Vault
            vault_max_distance: 1.0,
            vault_min_height: 0.2,
            vault_max_height: 1.1,
            vault_probe_height: 0.5,
            vault_clearance_radius: 0.25,
            vault_clearance_margin: 0.2,
            vault_ledge_inset: 0.1,
            vault_lift: 0.05,
            vault_overshoot: 0.5,
            vault_duration: 0.28,
            obstacle_layers: LayerMask::OBSTACLE,

            // Stamina
            max_stamina: 5.0,
            stamina_drain_rate: 1.0,
            stamina_recover_rate: 0.8,
            stamina_recover_delay: 1.0,

            // Camera
            head_bob_amount: 0.03,
            head_bob_frequency: 8.0,
            bob_crouch_scale: 0.5,
            bob_sprint_scale: 1.3,
            bob_speed_threshold: 0.1,
            bob_return_speed: 10.0,
            recoil_amount: 0.08,
            recoil_return_speed: 6.0,
            footstep_interval_walk: 0.45,
            footstep_interval_sprint: 0.25,
            footstep_interval_crouch: 0.6,
            footstep_min_speed: 0.5,

            // Look
            look_sensitivity: Vec2::splat(30.0),
            min_pitch_degrees: -80.0,
            max_pitch_degrees: 80.0,
            invert_look_y: false,

            // Fall damage
            fall_damage_min_velocity: 6.0,
            fall_damage_multiplier: 5.0,

            max_tick_delta: 0.066,
        }
    }
}

impl MotionConfig {
    /// Snappy, forgiving movement with lots of air control.
    pub fn arcade() -> Self {
        Self {
            walk_speed: 6.5,
            sprint_speed: 11.0,
            crouch_speed: 3.5,
            slide_speed: 13.0,
            acceleration: 40.0,
            deceleration: 30.0,
            air_control: 0.8,
            jump_force: 8.0,
            coyote_time: 0.18,
            jump_buffer_time: 0.18,
            slide_threshold_speed: 7.0,
            slide_duration: 1.1,
            max_stamina: 8.0,
            stamina_recover_delay: 0.5,
            fall_damage_min_velocity: 12.0,
            ..Default::default()
        }
    }

    /// Heavier, slower movement with little air control.
    pub fn tactical() -> Self {
        Self {
            walk_speed: 3.5,
            sprint_speed: 6.5,
            crouch_speed: 1.6,
            slide_speed: 7.5,
            acceleration: 12.0,
            deceleration: 16.0,
            air_control: 0.15,
            jump_force: 5.5,
            coyote_time: 0.08,
            jump_buffer_time: 0.08,
            slide_threshold_speed: 5.0,
            slide_duration: 0.7,
            max_stamina: 4.0,
            stamina_drain_rate: 1.2,
            stamina_recover_delay: 1.5,
            head_bob_amount: 0.02,
            fall_damage_min_velocity: 5.0,
            fall_damage_multiplier: 8.0,
            ..Default::default()
        }
    }

    /// Full ground probe reach below the probe origin.
    #[inline]
    pub fn ground_probe_distance(&self) -> f32 {
        self.ground_check_distance + 0.05
    }

    /// Check the configuration for values the controller cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("capsule_radius", self.capsule_radius),
            ("standing_height", self.standing_height),
            ("crouch_height", self.crouch_height),
            ("crouch_transition_speed", self.crouch_transition_speed),
            ("walk_speed", self.walk_speed),
            ("sprint_speed", self.sprint_speed),
            ("crouch_speed", self.crouch_speed),
            ("slide_speed", self.slide_speed),
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("gravity", self.gravity),
            ("fall_gravity_multiplier", self.fall_gravity_multiplier),
            ("ground_probe_radius", self.ground_probe_radius),
            ("slide_duration", self.slide_duration),
            ("vault_duration", self.vault_duration),
            ("vault_max_distance", self.vault_max_distance),
            ("vault_clearance_radius", self.vault_clearance_radius),
            ("max_stamina", self.max_stamina),
            ("footstep_interval_walk", self.footstep_interval_walk),
            ("footstep_interval_sprint", self.footstep_interval_sprint),
            ("footstep_interval_crouch", self.footstep_interval_crouch),
            ("max_tick_delta", self.max_tick_delta),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let non_negative = [
            ("jump_force", self.jump_force),
            ("coyote_time", self.coyote_time),
            ("jump_buffer_time", self.jump_buffer_time),
            ("ground_check_distance", self.ground_check_distance),
            ("stamina_drain_rate", self.stamina_drain_rate),
            ("stamina_recover_rate", self.stamina_recover_rate),
            ("stamina_recover_delay", self.stamina_recover_delay),
            ("head_bob_amount", self.head_bob_amount),
            ("recoil_return_speed", self.recoil_return_speed),
            ("fall_damage_min_velocity", self.fall_damage_min_velocity),
            ("fall_damage_multiplier", self.fall_damage_multiplier),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if !(0.0..=1.0).contains(&self.air_control) {
            return Err(ConfigError::NotUnit {
                field: "air_control",
                value: self.air_control,
            });
        }

        if self.crouch_height > self.standing_height {
            return Err(ConfigError::CrouchTallerThanStanding {
                crouch: self.crouch_height,
                standing: self.standing_height,
            });
        }

        if self.vault_min_height >= self.vault_max_height {
            return Err(ConfigError::EmptyVaultBand {
                min: self.vault_min_height,
                max: self.vault_max_height,
            });
        }

        if self.min_pitch_degrees >= self.max_pitch_degrees {
            return Err(ConfigError::InvertedPitchLimits {
                min: self.min_pitch_degrees,
                max: self.max_pitch_degrees,
            });
        }

        if !(self.eye_height_min..=self.eye_height_max).contains(&self.eye_height) {
            return Err(ConfigError::EyeHeightOutOfRange {
                eye: self.eye_height,
                min: self.eye_height_min,
                max: self.eye_height_max,
            });
        }

        Ok(())
    }

    /// Footstep spacing for the current gait.
    pub fn footstep_interval(&self, crouched: bool, sprinting: bool) -> f32 {
        if crouched {
            self.footstep_interval_crouch
        } else if sprinting {
            self.footstep_interval_sprint
        } else {
            self.footstep_interval_walk
        }
    }
}

/// Fall damage for a landing at `landing_velocity` (negative when falling).
///
/// Zero unless the landing is strictly faster than the damage threshold.
pub fn fall_damage(landing_velocity: f32, config: &MotionConfig) -> f32 {
    if landing_velocity < -config.fall_damage_min_velocity {
        (landing_velocity.abs() - config.fall_damage_min_velocity) * config.fall_damage_multiplier
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(MotionConfig::default().validate(), Ok(()));
        assert_eq!(MotionConfig::arcade().validate(), Ok(()));
        assert_eq!(MotionConfig::tactical().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_crouch_taller_than_standing() {
        let config = MotionConfig {
            crouch_height: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CrouchTallerThanStanding { .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_speed() {
        let config = MotionConfig {
            walk_speed: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "walk_speed",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_rejects_nan() {
        let config = MotionConfig {
            coyote_time: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { field: "coyote_time", .. })
        ));
    }

    #[test]
    fn test_rejects_empty_vault_band() {
        let config = MotionConfig {
            vault_min_height: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyVaultBand { .. })));
    }

    #[test]
    fn test_rejects_air_control_above_one() {
        let config = MotionConfig {
            air_control: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NotUnit { .. })));
    }

    #[test]
    fn test_error_message_names_field() {
        let err = ConfigError::NotPositive {
            field: "gravity",
            value: -1.0,
        };
        assert!(err.to_string().contains("gravity"));
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: MotionConfig =
            serde_json::from_str(r#"{ "walk_speed": 4.0, "max_stamina": 2.0 }"#)
                .expect("partial config should deserialize");

        assert_eq!(config.walk_speed, 4.0);
        assert_eq!(config.max_stamina, 2.0);
        assert_eq!(config.sprint_speed, MotionConfig::default().sprint_speed);
    }

    #[test]
    fn test_footstep_interval_priority() {
        let config = MotionConfig::default();
        assert_eq!(config.footstep_interval(true, true), config.footstep_interval_crouch);
        assert_eq!(config.footstep_interval(false, true), config.footstep_interval_sprint);
        assert_eq!(config.footstep_interval(false, false), config.footstep_interval_walk);
    }

    // ========================================================================
    // Fall damage
    // ========================================================================

    #[test]
    fn test_fall_damage_zero_at_threshold() {
        let config = MotionConfig::default();
        assert_eq!(fall_damage(-6.0, &config), 0.0);
    }

    #[test]
    fn test_fall_damage_below_threshold() {
        let config = MotionConfig::default();
        // (10 - 6) * 5
        assert_eq!(fall_damage(-10.0, &config), 20.0);
    }

    #[test]
    fn test_fall_damage_ignores_slow_and_rising() {
        let config = MotionConfig::default();
        assert_eq!(fall_damage(-2.0, &config), 0.0);
        assert_eq!(fall_damage(7.0, &config), 0.0);
    }
}
