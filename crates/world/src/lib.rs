//! Stride World
//!
//! Static collision geometry for driving a
//! [`CharacterMotionController`](stride_motion::CharacterMotionController)
//! outside an engine.
//!
//! # Key Types
//!
//! - [`CollisionWorld`]: parry3d brushes tagged with [`LayerMask`](stride_motion::LayerMask)
//!   bits; implements [`SpatialQuery`](stride_motion::SpatialQuery)
//! - [`KinematicBody`]: applies motion frames and pushes the capsule out of walls

pub mod body;
pub mod query;
pub mod world;

pub use body::KinematicBody;
pub use world::{CollisionBrush, CollisionWorld, WorldError};
