//! View orientation.
//!
//! Yaw and pitch are stored in radians. Yaw 0 faces +X and increases toward
//! +Z, matching the horizontal basis used for movement.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::MotionConfig;

/// Horizontal movement axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveBasis {
    pub forward: Vec3,
    pub right: Vec3,
}

impl MoveBasis {
    /// Basis for a yaw angle.
    pub fn from_yaw(yaw: f32) -> Self {
        let (sin_yaw, cos_yaw) = yaw.sin_cos();
        Self {
            forward: Vec3::new(cos_yaw, 0.0, sin_yaw),
            right: Vec3::new(-sin_yaw, 0.0, cos_yaw),
        }
    }

    /// Project arbitrary view axes onto the ground plane and renormalize.
    ///
    /// Looking straight up or down leaves nothing to project; `fallback_yaw`
    /// supplies the basis then.
    pub fn from_view(forward: Vec3, right: Vec3, fallback_yaw: f32) -> Self {
        let flat_forward = Vec3::new(forward.x, 0.0, forward.z);
        let flat_right = Vec3::new(right.x, 0.0, right.z);
        match (flat_forward.try_normalize(), flat_right.try_normalize()) {
            (Some(forward), Some(right)) => Self { forward, right },
            _ => Self::from_yaw(fallback_yaw),
        }
    }

    /// World-space direction for a move intent.
    #[inline]
    pub fn wish_direction(&self, input: Vec2) -> Vec3 {
        self.forward * input.y + self.right * input.x
    }
}

/// Yaw and pitch driven by look intents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LookController {
    yaw: f32,
    pitch: f32,
}

impl LookController {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw: wrap_angle(yaw), pitch }
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Apply one frame of look input.
    pub fn update(&mut self, input: Vec2, config: &MotionConfig, delta_time: f32) {
        let vertical = if config.invert_look_y { -input.y } else { input.y };
        self.apply_yaw((input.x * config.look_sensitivity.x * delta_time).to_radians());
        self.apply_pitch((vertical * config.look_sensitivity.y * delta_time).to_radians(), config);
    }

    /// Rotate around the vertical axis (radians).
    pub fn apply_yaw(&mut self, delta: f32) {
        self.yaw = wrap_angle(self.yaw + delta);
    }

    /// Tilt up or down (radians), respecting the pitch limits.
    pub fn apply_pitch(&mut self, delta: f32, config: &MotionConfig) {
        self.pitch = (self.pitch + delta).clamp(
            config.min_pitch_degrees.to_radians(),
            config.max_pitch_degrees.to_radians(),
        );
    }

    /// Full view direction including pitch.
    pub fn look_direction(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw)
    }

    /// Movement axes for the current view.
    pub fn basis(&self) -> MoveBasis {
        let right = MoveBasis::from_yaw(self.yaw).right;
        MoveBasis::from_view(self.look_direction(), right, self.yaw)
    }
}

/// Wrap an angle into (-PI, PI].
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_yaw_zero_faces_x() {
        let basis = MoveBasis::from_yaw(0.0);
        assert!(approx(basis.forward, Vec3::X));
        assert!(approx(basis.right, Vec3::Z));
    }

    #[test]
    fn test_pitch_does_not_change_ground_axes() {
        let config = MotionConfig::default();
        let mut look = LookController::new(0.3, 0.0);
        let level = look.basis();

        look.apply_pitch(1.2, &config);
        let tilted = look.basis();

        assert!(approx(level.forward, tilted.forward));
        assert!((tilted.forward.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_vertical_view_falls_back_to_yaw() {
        let basis = MoveBasis::from_view(Vec3::Y, Vec3::ZERO, 0.0);
        assert!(approx(basis.forward, Vec3::X));
    }

    #[test]
    fn test_pitch_clamped() {
        let config = MotionConfig::default();
        let mut look = LookController::default();

        look.apply_pitch(10.0, &config);
        assert!((look.pitch() - 80f32.to_radians()).abs() < 1e-6);

        look.apply_pitch(-20.0, &config);
        assert!((look.pitch() + 80f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_look_input_up_raises_pitch_unless_inverted() {
        let mut config = MotionConfig::default();
        let mut look = LookController::default();

        look.update(Vec2::new(0.0, 1.0), &config, 0.1);
        assert!(look.pitch() > 0.0);

        config.invert_look_y = true;
        let mut inverted = LookController::default();
        inverted.update(Vec2::new(0.0, 1.0), &config, 0.1);
        assert!(inverted.pitch() < 0.0);
    }

    #[test]
    fn test_yaw_sensitivity() {
        let config = MotionConfig::default();
        let mut look = LookController::default();
        // 30 deg/s for one second.
        look.update(Vec2::new(1.0, 0.0), &config, 1.0);
        assert!((look.yaw() - 30f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn test_yaw_wraps() {
        let mut look = LookController::new(3.0, 0.0);
        look.apply_yaw(1.0);
        assert!(look.yaw() > -PI && look.yaw() <= PI);
        assert!((look.yaw() - (4.0 - TAU)).abs() < 1e-5);
    }

    #[test]
    fn test_wish_direction() {
        let basis = MoveBasis::from_yaw(0.0);
        let dir = basis.wish_direction(Vec2::new(1.0, 1.0));
        assert!(approx(dir, Vec3::new(1.0, 0.0, 1.0)));
    }
}
