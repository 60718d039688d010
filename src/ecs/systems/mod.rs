pub mod playback;

use crate::anim::ChannelId;

/// Run all scene systems for one frame. Clips that finished fading are
/// written to `faded` for the caller to despawn.
pub fn tick(world: &mut hecs::World, dt: f32, faded: &mut Vec<(hecs::Entity, ChannelId)>) {
    // 1. Clip time + fade weights
    playback::advance(world, dt);

    // 2. Collect fully faded clips
    playback::collect_faded(world, faded);
}
