//! Kinematic body that applies [`MotionFrame`]s against a [`CollisionWorld`].
//!
//! Moves by velocity, teleports on scripted positions, and resolves capsule
//! penetration afterwards. No sweeping, so very fast bodies can tunnel thin
//! brushes.

use glam::Vec3;
use stride_motion::{CharacterMotionController, LayerMask, MotionFrame};

use crate::world::CollisionWorld;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    /// Bottom-center of the capsule.
    pub feet: Vec3,
    /// Layers the capsule collides with.
    pub collision_layers: LayerMask,
}

impl KinematicBody {
    pub fn new(feet: Vec3) -> Self {
        Self {
            feet,
            collision_layers: LayerMask::GROUND,
        }
    }

    /// Run one fixed tick of `controller` and apply the result.
    pub fn step(
        &mut self,
        controller: &mut CharacterMotionController,
        delta_time: f32,
        world: &CollisionWorld,
    ) -> MotionFrame {
        let frame = controller.tick(delta_time, self.feet, world);
        let dt = delta_time.min(controller.config().max_tick_delta);
        self.apply(&frame, dt, world);
        frame
    }

    /// Move the body by one frame's output.
    pub fn apply(&mut self, frame: &MotionFrame, delta_time: f32, world: &CollisionWorld) {
        if !(delta_time.is_finite() && delta_time > 0.0) {
            return;
        }

        self.feet = match frame.scripted_position {
            Some(position) => position,
            None => self.feet + frame.velocity * delta_time,
        };

        if frame.collision_enabled {
            self.feet = world.resolve_penetration(self.feet, frame.capsule, self.collision_layers);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
