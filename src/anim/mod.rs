#[cfg(test)]
pub mod testing;

use glam::Vec3;

/// Named animation clips the pet can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    Walk,
    RunSlow,
    RunFast,
    Jump,
    IdleBreathe,
    LookAround,
    ArmStretch,
    NeckStretch,
    Yawn,
    ClimbLoop,
    ClimbStart,
    ClimbEnd,
    WaveOne,
    WaveDouble,
    Point,
    Angry,
    Surprise,
}

pub const CHANNEL_COUNT: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Loop,
    Once,
}

/// Channels within a category may cross-fade; across categories they cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Locomotion,
    Jump,
    Climb,
    Idle,
    Gesture,
}

impl ChannelId {
    pub const ALL: [ChannelId; CHANNEL_COUNT] = [
        Self::Walk,
        Self::RunSlow,
        Self::RunFast,
        Self::Jump,
        Self::IdleBreathe,
        Self::LookAround,
        Self::ArmStretch,
        Self::NeckStretch,
        Self::Yawn,
        Self::ClimbLoop,
        Self::ClimbStart,
        Self::ClimbEnd,
        Self::WaveOne,
        Self::WaveDouble,
        Self::Point,
        Self::Angry,
        Self::Surprise,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Clip name as the renderer knows it.
    pub fn name(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::RunSlow => "run-slow",
            Self::RunFast => "run-fast",
            Self::Jump => "jump",
            Self::IdleBreathe => "idle-breathe",
            Self::LookAround => "look-around",
            Self::ArmStretch => "arm-stretch",
            Self::NeckStretch => "neck-stretch",
            Self::Yawn => "yawn",
            Self::ClimbLoop => "climbing-loop",
            Self::ClimbStart => "climbing-start",
            Self::ClimbEnd => "climbing-end",
            Self::WaveOne => "wave-one-hand",
            Self::WaveDouble => "wave-double",
            Self::Point => "point",
            Self::Angry => "angry",
            Self::Surprise => "surprise",
        }
    }

    pub fn repeat(self) -> Repeat {
        match self {
            Self::Walk
            | Self::RunSlow
            | Self::RunFast
            | Self::IdleBreathe
            | Self::ClimbLoop => Repeat::Loop,
            _ => Repeat::Once,
        }
    }

    pub fn category(self) -> Category {
        match self {
            Self::Walk | Self::RunSlow | Self::RunFast => Category::Locomotion,
            Self::Jump => Category::Jump,
            Self::ClimbLoop | Self::ClimbStart | Self::ClimbEnd => Category::Climb,
            Self::IdleBreathe
            | Self::LookAround
            | Self::ArmStretch
            | Self::NeckStretch
            | Self::Yawn => Category::Idle,
            Self::WaveOne | Self::WaveDouble | Self::Point | Self::Angry | Self::Surprise => {
                Category::Gesture
            }
        }
    }
}

/// Renderer-side sink for transform and clip commands.
pub trait SceneGraph {
    fn set_transform(&mut self, position: Vec3, yaw: f32, scale: f32);
    fn play_clip(&mut self, channel: ChannelId, speed: f32, repeat: Repeat);
    /// Fade the clip out over `blend_out` seconds. Zero cuts immediately.
    fn stop_clip(&mut self, channel: ChannelId, blend_out: f32);
    fn set_clip_speed(&mut self, channel: ChannelId, speed: f32);
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    playing: bool,
    speed: f32,
}

/// Tracks which clips are playing and forwards only real changes to the
/// scene. Stopping a stopped channel is a no-op.
pub struct AnimationChannelSet<S: SceneGraph> {
    scene: S,
    slots: [Slot; CHANNEL_COUNT],
    default_speed: f32,
}

impl<S: SceneGraph> AnimationChannelSet<S> {
    pub fn new(scene: S, scale: f32) -> Self {
        Self {
            scene,
            slots: [Slot::default(); CHANNEL_COUNT],
            default_speed: default_speed_for(scale),
        }
    }

    pub fn default_speed(&self) -> f32 {
        self.default_speed
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn is_playing(&self, channel: ChannelId) -> bool {
        self.slots[channel.index()].playing
    }

    #[cfg(test)]
    pub fn speed(&self, channel: ChannelId) -> Option<f32> {
        let slot = self.slots[channel.index()];
        slot.playing.then_some(slot.speed)
    }

    pub fn playing(&self) -> impl Iterator<Item = ChannelId> + '_ {
        ChannelId::ALL.into_iter().filter(|c| self.is_playing(*c))
    }

    #[cfg(test)]
    pub fn play(&mut self, channel: ChannelId) {
        self.play_at(channel, self.default_speed);
    }

    /// Start `channel` at `speed`, or retune it if already playing.
    pub fn play_at(&mut self, channel: ChannelId, speed: f32) {
        let slot = &mut self.slots[channel.index()];
        if slot.playing {
            if slot.speed != speed {
                slot.speed = speed;
                self.scene.set_clip_speed(channel, speed);
            }
            return;
        }
        *slot = Slot {
            playing: true,
            speed,
        };
        self.scene.play_clip(channel, speed, channel.repeat());
    }

    /// Returns whether the channel was playing.
    pub fn stop(&mut self, channel: ChannelId, blend_out: f32) -> bool {
        let slot = &mut self.slots[channel.index()];
        if !slot.playing {
            return false;
        }
        slot.playing = false;
        self.scene.stop_clip(channel, blend_out.max(0.0));
        true
    }

    pub fn stop_all<I>(&mut self, channels: I, blend_out: f32)
    where
        I: IntoIterator<Item = ChannelId>,
    {
        for channel in channels {
            self.stop(channel, blend_out);
        }
    }
}

/// Playback rate that keeps stride frequency consistent under rescaling.
pub fn default_speed_for(scale: f32) -> f32 {
    1.0 / scale.max(0.05).sqrt()
}
