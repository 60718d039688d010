use glam::Vec3;

use crate::anim::{ChannelId, Repeat};

/// Marks the pet's root entity.
#[derive(Debug, Clone, Copy)]
pub struct PetBody;

/// World transform of the pet root.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    /// Radians around Y. 0 faces the viewer.
    pub yaw: f32,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            scale: 1.0,
        }
    }
}

/// One clip bound to the pet.
#[derive(Debug, Clone, Copy)]
pub struct ClipPlayback {
    pub channel: ChannelId,
    pub repeat: Repeat,
    /// Clip-local time in seconds.
    pub time: f32,
    /// Signed rate multiplier. 0 pauses, negative reverses.
    pub speed: f32,
    /// Blend weight in [0, 1].
    pub weight: f32,
}

/// Present while a clip is fading out.
#[derive(Debug, Clone, Copy)]
pub struct FadeOut {
    /// Weight lost per second.
    pub rate: f32,
}
