use crate::anim::{ChannelId, Repeat};
use crate::ecs::components::{ClipPlayback, FadeOut};

/// Nominal clip length (seconds) for wrapping looped clips and holding
/// one-shots on their last frame.
const CLIP_LENGTH: f32 = 2.0;

/// Advance clip time and apply fade-out.
pub fn advance(world: &mut hecs::World, dt: f32) {
    for (_, clip) in world.query_mut::<&mut ClipPlayback>() {
        clip.time += clip.speed * dt;
        clip.time = match clip.repeat {
            Repeat::Loop => clip.time.rem_euclid(CLIP_LENGTH),
            Repeat::Once => clip.time.clamp(0.0, CLIP_LENGTH),
        };
    }

    for (_, (clip, fade)) in world.query_mut::<(&mut ClipPlayback, &FadeOut)>() {
        clip.weight = (clip.weight - fade.rate * dt).max(0.0);
    }
}

/// Clips whose weight reached zero.
pub fn collect_faded(world: &hecs::World, out: &mut Vec<(hecs::Entity, ChannelId)>) {
    out.clear();
    for (entity, clip) in world.query::<&ClipPlayback>().iter() {
        if clip.weight <= 0.0 {
            out.push((entity, clip.channel));
        }
    }
}
