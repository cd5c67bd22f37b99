//! The character motion controller.
//!
//! # Tick order
//!
//! Every fixed tick runs the same steps in the same order:
//!
//! 1. Advance the clock.
//! 2. Resolve ground contact, then landing (and fall damage).
//! 3. Stamp ground and jump timers.
//! 4. Stamina.
//! 5. Crouch intent, slide start, running phase, vault start.
//! 6. Horizontal velocity (skipped during slides and on vault ticks).
//! 7. Vertical velocity (skipped on vault ticks).
//! 8. Capsule height.
//!
//! Ground is resolved before the jump check, so a tick that lands with a jump
//! still buffered lands first and then jumps, provided both windows hold.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::{BobInput, CameraFeedback};
use crate::config::{fall_damage, ConfigError, MotionConfig};
use crate::jump::VerticalIntegrator;
use crate::look::LookController;
use crate::movement::HorizontalMover;
use crate::sensor::{GroundSensor, SpatialQuery};
use crate::stance::{CancelledPhase, StanceManager, TimedPhase};
use crate::state::{MotionMode, MotionState};

/// Capsule dimensions for the collision-shape collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapsuleShape {
    pub height: f32,
    /// Center above the feet.
    pub center_offset: f32,
    pub radius: f32,
}

/// Everything the host applies to the body after a fixed tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionFrame {
    /// Horizontal and vertical velocity combined.
    pub velocity: Vec3,
    pub horizontal_velocity: Vec3,
    pub vertical_velocity: f32,
    pub capsule: CapsuleShape,
    /// False while a vault moves the body by script.
    pub collision_enabled: bool,
    /// Feet position to teleport to this tick, overriding velocity.
    pub scripted_position: Option<Vec3>,
    pub grounded: bool,
    pub mode: MotionMode,
}

/// Discrete things that happened, for audio, animation, and health.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionEvent {
    Jumped,
    /// Touched down after being airborne.
    Landed { impact_velocity: f32 },
    /// A landing hard enough to hurt. Applying it is up to the host.
    FallDamage { magnitude: f32 },
    SlideStarted,
    SlideEnded,
    VaultStarted { target: Vec3 },
    VaultEnded,
    /// A slide or vault was aborted by [`CharacterMotionController::cancel_phase`].
    PhaseCancelled,
    Footstep { sprinting: bool },
}

/// First-person character motion core.
///
/// Hosts feed intents through the setters, call [`tick`](Self::tick) at a
/// fixed rate with the body's feet position and a [`SpatialQuery`], apply the
/// returned [`MotionFrame`], and call [`tick_variable`](Self::tick_variable)
/// once per rendered frame for look and camera offsets.
#[derive(Debug, Clone)]
pub struct CharacterMotionController {
    config: MotionConfig,
    state: MotionState,
    look: LookController,
    camera: CameraFeedback,
    events: Vec<MotionEvent>,
}

impl CharacterMotionController {
    /// Create a controller in the standing pose with full stamina.
    ///
    /// The configuration is expected to be valid; use
    /// [`try_new`](Self::try_new) for untrusted input.
    pub fn new(config: MotionConfig) -> Self {
        debug_assert_eq!(config.validate(), Ok(()));
        Self {
            state: MotionState::new(&config),
            config,
            look: LookController::default(),
            camera: CameraFeedback::new(),
            events: Vec::new(),
        }
    }

    /// Create a controller after validating the configuration.
    pub fn try_new(config: MotionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn with_default_config() -> Self {
        Self::new(MotionConfig::default())
    }

    #[inline]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> &MotionState {
        &self.state
    }

    #[inline]
    pub fn look(&self) -> &LookController {
        &self.look
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Set the move intent. Longer than unit length is clamped.
    pub fn set_move_intent(&mut self, input: Vec2) {
        self.state.move_input = if input.is_finite() {
            input.clamp_length_max(1.0)
        } else {
            Vec2::ZERO
        };
    }

    pub fn set_look_intent(&mut self, input: Vec2) {
        self.state.look_input = if input.is_finite() { input } else { Vec2::ZERO };
    }

    pub fn on_jump_pressed(&mut self) {
        self.state.jump_requested = true;
    }

    pub fn on_sprint_pressed(&mut self) {
        self.state.sprint_held = true;
    }

    pub fn on_sprint_released(&mut self) {
        self.state.sprint_held = false;
    }

    pub fn on_crouch_pressed(&mut self) {
        self.state.crouch_held = true;
        self.state.slide_armed = true;
    }

    pub fn on_crouch_released(&mut self) {
        self.state.crouch_held = false;
    }

    /// Kick the camera. `degrees.x` is vertical, `degrees.y` horizontal.
    pub fn inject_recoil(&mut self, degrees: Vec2) {
        self.camera.inject_recoil(degrees, &self.config);
    }

    /// Rotate the view by `delta` radians of yaw, e.g. from a cutscene.
    pub fn apply_yaw(&mut self, delta: f32) {
        self.look.apply_yaw(delta);
    }

    /// Tilt the view by `delta` radians of pitch, clamped to the limits.
    pub fn apply_pitch(&mut self, delta: f32) {
        self.look.apply_pitch(delta, &self.config);
    }

    // ========================================================================
    // Outputs
    // ========================================================================

    /// Bob and recoil offset for the camera, local space.
    #[inline]
    pub fn camera_offset(&self) -> Vec3 {
        self.camera.offset()
    }

    /// Camera height above the feet.
    #[inline]
    pub fn eye_height(&self) -> f32 {
        self.state.eye_height
    }

    /// Camera local position: eye height plus bob and recoil.
    pub fn camera_local_position(&self) -> Vec3 {
        Vec3::Y * self.state.eye_height + self.camera.offset()
    }

    #[inline]
    pub fn stamina(&self) -> f32 {
        self.state.stamina.value()
    }

    #[inline]
    pub fn mode(&self) -> MotionMode {
        self.state.mode
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.state.grounded
    }

    pub fn capsule(&self) -> CapsuleShape {
        CapsuleShape {
            height: self.state.capsule_height,
            center_offset: self.state.capsule_center_offset,
            radius: self.config.capsule_radius,
        }
    }

    /// Take all events raised since the last call.
    pub fn drain_events(&mut self) -> Vec<MotionEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Abort a running slide or vault, restoring collision and normal movement.
    pub fn cancel_phase(&mut self) -> Option<CancelledPhase> {
        let cancelled = StanceManager::cancel(&mut self.state)?;
        self.events.push(MotionEvent::PhaseCancelled);
        Some(cancelled)
    }

    /// Back to the activation state, e.g. on respawn. View direction is kept.
    pub fn reset(&mut self) {
        self.cancel_phase();
        self.state = MotionState::new(&self.config);
        self.camera.reset();
        self.events.clear();
    }

    // ========================================================================
    // Fixed tick
    // ========================================================================

    /// Advance physics by `delta_time` seconds.
    ///
    /// `feet` is the body's current bottom-center position. Non-finite or
    /// non-positive steps are ignored.
    pub fn tick<W: SpatialQuery + ?Sized>(
        &mut self,
        delta_time: f32,
        feet: Vec3,
        world: &W,
    ) -> MotionFrame {
        if !(delta_time.is_finite() && delta_time > 0.0) {
            return self.frame(None);
        }
        let dt = delta_time.min(self.config.max_tick_delta);
        self.state.clock += f64::from(dt);

        self.update_ground(feet, world);
        VerticalIntegrator::stamp(&mut self.state);
        self.update_stamina(dt);

        let scripted_position = self.update_stance(dt, feet, world);

        let scripted = scripted_position.is_some();
        if !scripted && !self.state.mode.is_scripted() {
            let basis = self.look.basis();
            HorizontalMover::update(&mut self.state, &self.config, &basis, dt);
        } else {
            self.state.sprinting = false;
        }

        if !scripted {
            let vertical = VerticalIntegrator::integrate(&mut self.state, &self.config, dt);
            if vertical.jumped {
                log::debug!("Jump");
                self.events.push(MotionEvent::Jumped);
            }
            if !self.state.grounded || vertical.jumped {
                self.state.airborne_velocity = Some(self.state.vertical_velocity);
            }
        }

        StanceManager::ease_height(&mut self.state, &self.config, dt);
        self.state.jump_requested = false;

        log::trace!(
            "tick t={:.3} mode={:?} grounded={} v={:?} stamina={:.2}",
            self.state.clock,
            self.state.mode,
            self.state.grounded,
            self.state.velocity(),
            self.state.stamina.value()
        );

        self.frame(scripted_position)
    }

    fn update_ground<W: SpatialQuery + ?Sized>(&mut self, feet: Vec3, world: &W) {
        if self.state.mode == MotionMode::Vaulting {
            // Scripted move: keep the pre-vault contact until it ends.
            return;
        }

        let rising = self.state.vertical_velocity > self.config.ground_ignore_rise_speed;
        let grounded = !rising && GroundSensor::is_grounded(feet, &self.config, world);
        let landed = grounded && !self.state.grounded;
        self.state.grounded = grounded;

        if landed {
            if let Some(impact) = self.state.airborne_velocity.take() {
                log::debug!("Landed at {:.2} m/s", impact);
                self.events.push(MotionEvent::Landed {
                    impact_velocity: impact,
                });
                let damage = fall_damage(impact, &self.config);
                if damage > 0.0 {
                    log::debug!("Fall damage {:.2}", damage);
                    self.events.push(MotionEvent::FallDamage { magnitude: damage });
                }
            }
        }
    }

    /// Only forward sprinting drains; strafing or backpedalling at sprint
    /// speed is free.
    fn update_stamina(&mut self, dt: f32) {
        let state = &self.state;
        let sprinting = state.sprint_held
            && state.grounded
            && state.mode == MotionMode::Standing
            && state.move_input.y > self.config.input_deadzone
            && state.stamina.is_available();
        let draining = sprinting || state.mode == MotionMode::Sliding;
        self.state.stamina.update(draining, &self.config, dt);
    }

    fn update_stance<W: SpatialQuery + ?Sized>(
        &mut self,
        dt: f32,
        feet: Vec3,
        world: &W,
    ) -> Option<Vec3> {
        StanceManager::apply_crouch_intent(&mut self.state, &self.config, feet, world);

        if StanceManager::try_start_slide(&mut self.state, &self.config) {
            self.events.push(MotionEvent::SlideStarted);
        }

        let forward = self.look.basis().forward;
        match self.state.phase {
            Some(TimedPhase::Slide(_)) => {
                let update = StanceManager::advance_slide(
                    &mut self.state,
                    &self.config,
                    forward,
                    dt,
                    feet,
                    world,
                );
                if update.finished {
                    self.events.push(MotionEvent::SlideEnded);
                }
                None
            }
            Some(TimedPhase::Vault(_)) => {
                let update = StanceManager::advance_vault(&mut self.state, &self.config, dt, world);
                if update.finished {
                    self.events.push(MotionEvent::VaultEnded);
                }
                update.scripted_position
            }
            None => {
                let vault =
                    StanceManager::try_start_vault(&mut self.state, &self.config, feet, forward, world)?;
                self.events.push(MotionEvent::VaultStarted {
                    target: vault.target,
                });
                Some(vault.start)
            }
        }
    }

    fn frame(&self, scripted_position: Option<Vec3>) -> MotionFrame {
        MotionFrame {
            velocity: self.state.velocity(),
            horizontal_velocity: self.state.horizontal_velocity,
            vertical_velocity: self.state.vertical_velocity,
            capsule: self.capsule(),
            collision_enabled: self.state.collision_enabled,
            scripted_position,
            grounded: self.state.grounded,
            mode: self.state.mode,
        }
    }

    // ========================================================================
    // Variable tick
    // ========================================================================

    /// Advance look and camera feedback by one rendered frame.
    pub fn tick_variable(&mut self, delta_time: f32) {
        if !(delta_time.is_finite() && delta_time > 0.0) {
            return;
        }

        self.look.update(self.state.look_input, &self.config, delta_time);

        let input = BobInput {
            grounded: self.state.grounded,
            horizontal_speed: self.state.horizontal_speed(),
            mode: self.state.mode,
            sprinting: self.state.sprinting,
        };
        if self.camera.update(input, &self.config, delta_time) {
            self.events.push(MotionEvent::Footstep {
                sprinting: self.state.sprinting,
            });
        }
    }
}

impl Default for CharacterMotionController {
    fn default() -> Self {
        Self::with_default_config()
    }
}

// ============================================================================
// Tests
// ============================================================================
