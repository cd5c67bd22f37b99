//! Stamina resource gating sprint and slide.

use serde::{Deserialize, Serialize};

use crate::config::MotionConfig;

/// Bounded stamina pool with delayed regeneration.
///
/// Each update either drains or (after the recovery delay) regenerates, never
/// both. The value is clamped to `[0, max_stamina]` on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaminaMeter {
    value: f32,
    /// Seconds since the last draining update.
    since_drain: f32,
}

impl StaminaMeter {
    /// Create a full meter.
    pub fn new(config: &MotionConfig) -> Self {
        Self {
            value: config.max_stamina,
            since_drain: 0.0,
        }
    }

    /// Current stamina.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Current stamina as a fraction of the maximum.
    pub fn fraction(&self, config: &MotionConfig) -> f32 {
        (self.value / config.max_stamina).clamp(0.0, 1.0)
    }

    /// Whether there is any stamina left to spend.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.value > 0.0
    }

    /// Seconds since stamina was last drained.
    #[inline]
    pub fn since_drain(&self) -> f32 {
        self.since_drain
    }

    /// Advance the meter by `delta_time`.
    pub fn update(&mut self, draining: bool, config: &MotionConfig, delta_time: f32) {
        if draining {
            self.value -= config.stamina_drain_rate * delta_time;
            self.since_drain = 0.0;
        } else if self.since_drain >= config.stamina_recover_delay {
            self.value += config.stamina_recover_rate * delta_time;
        } else {
            self.since_drain += delta_time;
        }

        self.value = self.value.clamp(0.0, config.max_stamina);
        debug_assert!((0.0..=config.max_stamina).contains(&self.value));
    }
}
