use glam::Vec3;

use super::{ChannelId, Repeat, SceneGraph};

#[derive(Debug, Clone, PartialEq)]
pub enum SceneCall {
    Play(ChannelId, f32, Repeat),
    Stop(ChannelId, f32),
    Speed(ChannelId, f32),
}

/// Scene fake that records every clip command.
#[derive(Debug, Default)]
pub struct RecordingScene {
    pub calls: Vec<SceneCall>,
    pub position: Vec3,
    pub yaw: f32,
    pub scale: f32,
}

impl SceneGraph for RecordingScene {
    fn set_transform(&mut self, position: Vec3, yaw: f32, scale: f32) {
        self.position = position;
        self.yaw = yaw;
        self.scale = scale;
    }

    fn play_clip(&mut self, channel: ChannelId, speed: f32, repeat: Repeat) {
        self.calls.push(SceneCall::Play(channel, speed, repeat));
    }

    fn stop_clip(&mut self, channel: ChannelId, blend_out: f32) {
        self.calls.push(SceneCall::Stop(channel, blend_out));
    }

    fn set_clip_speed(&mut self, channel: ChannelId, speed: f32) {
        self.calls.push(SceneCall::Speed(channel, speed));
    }
}
