//! Stride Motion
//!
//! First-person character motion: turns move/look/jump/sprint/crouch intents
//! and a handful of environment queries into body velocity, capsule shape, and
//! camera offsets.
//!
//! # Architecture
//!
//! - **Sensing**: [`GroundSensor`] and the [`SpatialQuery`] trait the host implements
//! - **Integration**: [`VerticalIntegrator`] (gravity, coyote time, jump buffer)
//!   and [`HorizontalMover`] (target speed, acceleration)
//! - **Stance**: [`StanceManager`] (crouch, slide, vault, capsule height)
//! - **Resources**: [`StaminaMeter`]
//! - **Feedback**: [`CameraFeedback`] (head bob, recoil, footsteps) and [`LookController`]
//!
//! [`CharacterMotionController`] owns all of it and exposes two entry points:
//! a fixed-rate `tick` for physics and a frame-rate `tick_variable` for the
//! camera. Nothing here spawns threads or performs I/O.

pub mod camera;
pub mod config;
pub mod controller;
pub mod jump;
pub mod look;
pub mod movement;
pub mod sensor;
pub mod stamina;
pub mod stance;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use camera::{BobInput, CameraFeedback};
pub use config::{fall_damage, ConfigError, MotionConfig};
pub use controller::{CapsuleShape, CharacterMotionController, MotionEvent, MotionFrame};
pub use jump::{VerticalIntegrator, VerticalUpdate};
pub use look::{LookController, MoveBasis};
pub use movement::HorizontalMover;
pub use sensor::{GroundSensor, LayerMask, OpenSpace, ProbeHit, SpatialQuery};
pub use stamina::StaminaMeter;
pub use stance::{CancelledPhase, PhaseUpdate, SlidePhase, StanceManager, TimedPhase, VaultPhase};
pub use state::{MotionMode, MotionState};
