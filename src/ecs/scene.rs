use glam::Vec3;
use hecs::Entity;

use crate::anim::{ChannelId, Repeat, SceneGraph, CHANNEL_COUNT};
use crate::ecs::components::{ClipPlayback, FadeOut, PetBody, Transform};
use crate::ecs::systems;

/// ECS-backed scene graph: one root entity for the pet transform and one
/// entity per live clip.
pub struct Scene {
    world: hecs::World,
    body: Entity,
    clips: [Option<Entity>; CHANNEL_COUNT],
    faded: Vec<(Entity, ChannelId)>,
}

impl Scene {
    pub fn new() -> Self {
        let mut world = hecs::World::new();
        let body = world.spawn((PetBody, Transform::default()));
        Self {
            world,
            body,
            clips: [None; CHANNEL_COUNT],
            faded: Vec::with_capacity(CHANNEL_COUNT),
        }
    }

    /// Advance playback and drop clips that finished fading.
    pub fn tick(&mut self, dt: f32) {
        systems::tick(&mut self.world, dt, &mut self.faded);
        for (entity, channel) in self.faded.drain(..) {
            let _ = self.world.despawn(entity);
            if self.clips[channel.index()] == Some(entity) {
                self.clips[channel.index()] = None;
            }
        }
    }

    pub fn transform(&self) -> Transform {
        self.world
            .get::<&Transform>(self.body)
            .map(|t| *t)
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub fn clip(&self, channel: ChannelId) -> Option<ClipPlayback> {
        let entity = self.clips[channel.index()]?;
        self.world.get::<&ClipPlayback>(entity).ok().map(|c| *c)
    }

    #[cfg(test)]
    pub fn is_fading(&self, channel: ChannelId) -> bool {
        self.clips[channel.index()]
            .is_some_and(|e| self.world.get::<&FadeOut>(e).is_ok())
    }

    /// Clips playing at full intent (not fading out).
    #[cfg(test)]
    pub fn playing_channels(&self) -> Vec<ChannelId> {
        ChannelId::ALL
            .into_iter()
            .filter(|c| self.clips[c.index()].is_some() && !self.is_fading(*c))
            .collect()
    }
}

impl SceneGraph for Scene {
    fn set_transform(&mut self, position: Vec3, yaw: f32, scale: f32) {
        if let Ok(t) = self.world.query_one_mut::<&mut Transform>(self.body) {
            *t = Transform {
                position,
                yaw,
                scale,
            };
        }
    }

    fn play_clip(&mut self, channel: ChannelId, speed: f32, repeat: Repeat) {
        let clip = ClipPlayback {
            channel,
            repeat,
            time: 0.0,
            speed,
            weight: 1.0,
        };
        match self.clips[channel.index()] {
            Some(entity) => {
                let _ = self.world.remove_one::<FadeOut>(entity);
                if let Ok(existing) = self.world.query_one_mut::<&mut ClipPlayback>(entity) {
                    *existing = clip;
                }
            }
            None => {
                self.clips[channel.index()] = Some(self.world.spawn((clip,)));
            }
        }
    }

    fn stop_clip(&mut self, channel: ChannelId, blend_out: f32) {
        let Some(entity) = self.clips[channel.index()] else {
            return;
        };
        if blend_out <= 0.0 {
            let _ = self.world.despawn(entity);
            self.clips[channel.index()] = None;
        } else {
            let _ = self.world.insert_one(entity, FadeOut { rate: 1.0 / blend_out });
        }
    }

    fn set_clip_speed(&mut self, channel: ChannelId, speed: f32) {
        let Some(entity) = self.clips[channel.index()] else {
            return;
        };
        if let Ok(clip) = self.world.query_one_mut::<&mut ClipPlayback>(entity) {
            clip.speed = speed;
        }
    }
}
