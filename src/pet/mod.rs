pub mod climb;
pub mod physics;

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

/// Which way the pet is looking along the desktop strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Facing for a horizontal displacement. Zero keeps `current`.
    pub fn from_dx(dx: f32, current: Facing) -> Facing {
        if dx > 0.0 {
            Facing::Right
        } else if dx < 0.0 {
            Facing::Left
        } else {
            current
        }
    }

    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Model yaw in radians. 0 faces the viewer.
    pub fn yaw(self) -> f32 {
        match self {
            Facing::Left => -FRAC_PI_2,
            Facing::Right => FRAC_PI_2,
        }
    }
}

/// What the pet is standing on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Ground,
    Window(u64),
    Airborne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Surprise,
    Angry,
    DoubleWave,
    OneHandWave,
    Pointing,
}

impl GestureKind {
    pub const ALL: [GestureKind; 5] = [
        Self::Surprise,
        Self::Angry,
        Self::DoubleWave,
        Self::OneHandWave,
        Self::Pointing,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Ambient idle clips. Stretch variants double as the short "scratch".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleKind {
    ArmStretch,
    NeckStretch,
    Yawn,
    LookAround,
}

/// Top-level behavior. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    Walking,
    SlowRunning,
    FastRunning,
    Jumping,
    Climbing,
    OnWindowTop,
    Falling,
    PerformingGesture(GestureKind),
    PerformingLongIdle(IdleKind),
}

impl MotionState {
    /// Idle for the given support: on a window the pet rests `OnWindowTop`.
    pub fn resting_on(support: Support) -> MotionState {
        match support {
            Support::Window(_) => MotionState::OnWindowTop,
            _ => MotionState::Idle,
        }
    }

    pub fn is_at_rest(self) -> bool {
        matches!(self, MotionState::Idle | MotionState::OnWindowTop)
    }

    /// Ground locomotion tiers plus the boundary hop.
    #[cfg(test)]
    pub fn is_locomotion(self) -> bool {
        matches!(
            self,
            MotionState::Walking
                | MotionState::SlowRunning
                | MotionState::FastRunning
                | MotionState::Jumping
        )
    }
}

/// The controlled entity. World space, bottom-left origin, Y up.
#[derive(Debug, Clone)]
pub struct Pet {
    pub position: Vec3,
    pub facing: Facing,
    pub scale: f32,
    /// Positive is downward. Only meaningful while falling.
    pub vertical_velocity: f32,
    /// Last frame's horizontal speed (px/s, signed).
    pub horizontal_velocity: f32,
    pub yaw: f32,
    pub support: Support,
}

impl Pet {
    pub fn new(x: f32, scale: f32) -> Self {
        Self {
            position: Vec3::new(x, 0.0, 0.0),
            facing: Facing::Right,
            scale,
            vertical_velocity: 0.0,
            horizontal_velocity: 0.0,
            yaw: Facing::Right.yaw(),
            support: Support::Ground,
        }
    }
}

/// Climbing energy, clamped to `[0, max]`.
#[derive(Debug, Clone, Copy)]
pub struct Stamina {
    value: f32,
    max: f32,
}

impl Stamina {
    pub fn full(max: f32) -> Self {
        Self { value: max, max }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set(&mut self, value: f32) {
        self.value = value.clamp(0.0, self.max);
    }

    /// Add `delta` (negative drains) and clamp.
    pub fn apply(&mut self, delta: f32) {
        self.set(self.value + delta);
    }
}
