//! Camera feedback: head bob, recoil, and footstep cues.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::MotionConfig;
use crate::state::MotionMode;

/// Recoil below this length snaps to zero.
const RECOIL_EPSILON: f32 = 1e-5;

/// Motion facts the camera needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BobInput {
    pub grounded: bool,
    pub horizontal_speed: f32,
    pub mode: MotionMode,
    pub sprinting: bool,
}

/// Head bob, recoil decay, and footstep timing.
///
/// Runs at frame rate and only reads motion state; it never feeds back into
/// physics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraFeedback {
    bob_phase: f32,
    bob_offset: Vec3,
    recoil_offset: Vec3,
    /// Seconds since the last footstep. `None` until the first step of a walk.
    stride_timer: Option<f32>,
}

impl CameraFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bob plus recoil, in camera local space.
    #[inline]
    pub fn offset(&self) -> Vec3 {
        self.bob_offset + self.recoil_offset
    }

    #[inline]
    pub fn bob_offset(&self) -> Vec3 {
        self.bob_offset
    }

    #[inline]
    pub fn recoil_offset(&self) -> Vec3 {
        self.recoil_offset
    }

    #[inline]
    pub fn bob_phase(&self) -> f32 {
        self.bob_phase
    }

    /// Kick the camera. `degrees.x` is vertical, `degrees.y` horizontal.
    pub fn inject_recoil(&mut self, degrees: Vec2, config: &MotionConfig) {
        self.recoil_offset += Vec3::new(
            -degrees.x * config.recoil_amount,
            degrees.y * config.recoil_amount,
            0.0,
        );
    }

    /// Advance bob and recoil by one frame.
    ///
    /// Returns `true` when a footstep lands this frame.
    pub fn update(&mut self, input: BobInput, config: &MotionConfig, delta_time: f32) -> bool {
        self.decay_recoil(config, delta_time);

        let bobbing = input.grounded && input.horizontal_speed > config.bob_speed_threshold;
        if bobbing {
            // Both bob terms repeat every TAU.
            self.bob_phase = (self.bob_phase
                + delta_time * (input.horizontal_speed / config.walk_speed) * config.head_bob_frequency)
                .rem_euclid(TAU);

            let mut amplitude = config.head_bob_amount;
            if input.mode.is_low() {
                amplitude *= config.bob_crouch_scale;
            }
            if input.sprinting {
                amplitude *= config.bob_sprint_scale;
            }

            self.bob_offset = Vec3::new(
                self.bob_phase.sin() * amplitude,
                (self.bob_phase * 2.0).cos() * amplitude * 0.5,
                0.0,
            );
        } else {
            let t = (delta_time * config.bob_return_speed).min(1.0);
            self.bob_offset = self.bob_offset.lerp(Vec3::ZERO, t);
        }

        self.advance_stride(input, config, delta_time)
    }

    fn decay_recoil(&mut self, config: &MotionConfig, delta_time: f32) {
        self.recoil_offset *= (-config.recoil_return_speed * delta_time).exp();
        if self.recoil_offset.length() < RECOIL_EPSILON {
            self.recoil_offset = Vec3::ZERO;
        }
    }

    fn advance_stride(&mut self, input: BobInput, config: &MotionConfig, delta_time: f32) -> bool {
        let stepping = input.grounded
            && input.mode != MotionMode::Sliding
            && input.horizontal_speed > config.footstep_min_speed;
        if !stepping {
            self.stride_timer = None;
            return false;
        }

        let interval = config.footstep_interval(input.mode.is_low(), input.sprinting);
        match self.stride_timer.as_mut() {
            None => {
                self.stride_timer = Some(0.0);
                true
            }
            Some(timer) => {
                *timer += delta_time;
                if *timer >= interval {
                    *timer -= interval;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Drop all offsets and timers.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f32 = 1.0 / 120.0;

    fn walking(speed: f32) -> BobInput {
        BobInput {
            grounded: true,
            horizontal_speed: speed,
            mode: MotionMode::Standing,
            sprinting: false,
        }
    }

    #[test]
    fn test_no_bob_when_still() {
        let config = MotionConfig::default();
        let mut camera = CameraFeedback::new();
        camera.update(walking(0.0), &config, FRAME);
        assert_eq!(camera.offset(), Vec3::ZERO);
        assert_eq!(camera.bob_phase(), 0.0);
    }

    #[test]
    fn test_no_bob_airborne() {
        let config = MotionConfig::default();
        let mut camera = CameraFeedback::new();
        let input = BobInput {
            grounded: false,
            ..walking(5.0)
        };
        camera.update(input, &config, FRAME);
        assert_eq!(camera.bob_phase(), 0.0);
    }

    #[test]
    fn test_bob_formula() {
        let config = MotionConfig::default();
        let mut camera = CameraFeedback::new();
        camera.update(walking(config.walk_speed), &config, 0.1);

        let phase = 0.1 * config.head_bob_frequency;
        assert!((camera.bob_phase() - phase).abs() < 1e-6);

        let a = config.head_bob_amount;
        let expected = Vec3::new(phase.sin() * a, (phase * 2.0).cos() * a * 0.5, 0.0);
        assert!((camera.bob_offset() - expected).length() < 1e-6);
    }

    #[test]
    fn test_bob_phase_stays_wrapped() {
        let config = MotionConfig::default();
        let mut camera = CameraFeedback::new();
        // Ten minutes of walking.
        for _ in 0..72_000 {
            camera.update(walking(5.0), &config, FRAME);
            assert!((0.0..TAU).contains(&camera.bob_phase()));
        }

        let phase = camera.bob_phase();
        let a = config.head_bob_amount;
        let expected = Vec3::new(phase.sin() * a, (phase * 2.0).cos() * a * 0.5, 0.0);
        assert!((camera.bob_offset() - expected).length() < 1e-6);
    }

    #[test]
    fn test_bob_amplitude_scaling() {
        let config = MotionConfig::default();
        let peak = |input: BobInput| {
            let mut camera = CameraFeedback::new();
            let mut max: f32 = 0.0;
            for _ in 0..600 {
                camera.update(input, &config, FRAME);
                max = max.max(camera.bob_offset().x.abs());
            }
            max
        };

        let walk = peak(walking(5.0));
        let crouch = peak(BobInput {
            mode: MotionMode::Crouching,
            ..walking(5.0)
        });
        let sprint = peak(BobInput {
            sprinting: true,
            ..walking(5.0)
        });

        assert!((crouch / walk - config.bob_crouch_scale).abs() < 0.02);
        assert!((sprint / walk - config.bob_sprint_scale).abs() < 0.02);
    }

    #[test]
    fn test_bob_returns_to_rest() {
        let config = MotionConfig::default();
        let mut camera = CameraFeedback::new();
        for _ in 0..30 {
            camera.update(walking(5.0), &config, FRAME);
        }
        assert!(camera.bob_offset().length() > 0.0);

        for _ in 0..600 {
            camera.update(walking(0.0), &config, FRAME);
        }
        assert!(camera.bob_offset().length() < 1e-4);
    }

    #[test]
    fn test_recoil_injection_and_decay() {
        let config = MotionConfig::default();
        let mut camera = CameraFeedback::new();
        camera.inject_recoil(Vec2::new(2.0, 1.0), &config);

        let kick = camera.recoil_offset();
        assert!((kick - Vec3::new(-0.16, 0.08, 0.0)).length() < 1e-6);

        camera.update(walking(0.0), &config, 0.1);
        let expected = kick * (-config.recoil_return_speed * 0.1).exp();
        assert!((camera.recoil_offset() - expected).length() < 1e-6);

        for _ in 0..1000 {
            camera.update(walking(0.0), &config, FRAME);
        }
        assert_eq!(camera.recoil_offset(), Vec3::ZERO);
    }

    #[test]
    fn test_recoil_stacks_with_bob() {
        let config = MotionConfig::default();
        let mut camera = CameraFeedback::new();
        camera.update(walking(5.0), &config, FRAME);
        camera.inject_recoil(Vec2::new(1.0, 0.0), &config);
        assert_eq!(camera.offset(), camera.bob_offset() + camera.recoil_offset());
    }

    // ========================================================================
    // Footsteps
    // ========================================================================

    fn count_steps(input: BobInput, seconds: f32) -> usize {
        let config = MotionConfig::default();
        let mut camera = CameraFeedback::new();
        let frames = (seconds / FRAME).round() as usize;
        (0..frames)
            .filter(|_| camera.update(input, &config, FRAME))
            .count()
    }

    #[test]
    fn test_footstep_cadence() {
        // First step immediately, then every interval.
        assert_eq!(count_steps(walking(5.0), 0.9), 2);
        assert_eq!(
            count_steps(
                BobInput {
                    sprinting: true,
                    ..walking(9.0)
                },
                1.0
            ),
            4
        );
        assert_eq!(
            count_steps(
                BobInput {
                    mode: MotionMode::Crouching,
                    ..walking(2.5)
                },
                1.0
            ),
            2
        );
    }

    #[test]
    fn test_no_footsteps_when_slow_or_sliding() {
        assert_eq!(count_steps(walking(0.3), 2.0), 0);
        assert_eq!(
            count_steps(
                BobInput {
                    mode: MotionMode::Sliding,
                    ..walking(10.0)
                },
                2.0
            ),
            0
        );
    }
}
