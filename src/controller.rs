use glam::Vec2;

use crate::anim::{AnimationChannelSet, ChannelId, SceneGraph};
use crate::behavior::{ArbiterInput, BehaviorArbiter, Decision};
use crate::config::PetConfig;
use crate::mouse::MouseHistory;
use crate::pet::climb::ClimbSession;
use crate::pet::physics::ClimbState;
use crate::pet::{GestureKind, IdleKind, MotionState, Pet, Stamina, Support};
use crate::world::{to_world_rects, Monitor, Space, Topology, WindowRect, WorldRect};

/// Climb-loop speed while resting on the wall.
const CLIMB_REST_SPEED: f32 = 0.2;
/// Climb-loop speed while sliding down.
const CLIMB_SLIP_SPEED: f32 = 1.5;
const CLIMB_REACH_FACTOR: f32 = 0.6;
const CLIMB_TIRED_FACTOR: f32 = 0.7;
const CLIMB_MIN_SPEED: f32 = 0.1;
const CLIMB_MAX_SPEED: f32 = 2.0;

/// Owns the pet and everything it needs between frames. The host calls
/// `update` once per tick and feeds snapshots in as they arrive.
pub struct PetController<S: SceneGraph> {
    cfg: PetConfig,
    pet: Pet,
    state: MotionState,
    stamina: Stamina,
    climb: Option<ClimbSession>,
    arbiter: BehaviorArbiter,
    channels: AnimationChannelSet<S>,
    topology: Topology,
    windows: Vec<WorldRect>,
    raw_windows: Vec<WindowRect>,
    mouse: MouseHistory,
    /// Last known host cursor.
    cursor: Option<Vec2>,
    cursor_lost: bool,
    last_time: Option<f64>,
    rng: fastrand::Rng,
}

impl<S: SceneGraph> PetController<S> {
    pub fn new(cfg: PetConfig, desktop_size: Vec2, scene: S, mut rng: fastrand::Rng) -> Self {
        let scale = cfg.character_scale;
        let arbiter = BehaviorArbiter::new(cfg.clone(), &mut rng);
        let mut controller = Self {
            stamina: Stamina::full(cfg.climbing.max_stamina),
            pet: Pet::new(desktop_size.x * 0.5, scale),
            state: MotionState::Idle,
            climb: None,
            arbiter,
            channels: AnimationChannelSet::new(scene, scale),
            topology: Topology::new(desktop_size),
            windows: Vec::new(),
            raw_windows: Vec::new(),
            mouse: MouseHistory::new(),
            cursor: None,
            cursor_lost: false,
            last_time: None,
            rng,
            cfg,
        };
        controller.sync_animation();
        controller.sync_transform();
        log::info!(
            "Pet ready at x={:.0} on a {:.0}x{:.0} desktop",
            controller.pet.position.x,
            desktop_size.x,
            desktop_size.y
        );
        controller
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[cfg(test)]
    pub fn pet(&self) -> &Pet {
        &self.pet
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn stamina(&self) -> f32 {
        self.stamina.value()
    }

    #[cfg(test)]
    pub fn climb(&self) -> Option<&ClimbSession> {
        self.climb.as_ref()
    }

    #[cfg(test)]
    pub fn channels(&self) -> &AnimationChannelSet<S> {
        &self.channels
    }

    pub fn scene(&self) -> &S {
        self.channels.scene()
    }

    pub fn scene_mut(&mut self) -> &mut S {
        self.channels.scene_mut()
    }

    #[cfg(test)]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Window geometry changes fast while the pet stands on or clings to
    /// a window.
    pub fn wants_fast_window_poll(&self) -> bool {
        matches!(self.pet.support, Support::Window(_)) || self.state == MotionState::Climbing
    }

    // -----------------------------------------------------------------------
    // Collaborator input
    // -----------------------------------------------------------------------

    pub fn set_monitors(&mut self, monitors: Vec<Monitor>) {
        log::info!("{} monitor(s)", monitors.len());
        self.topology.set_monitors(monitors);
    }

    pub fn apply_spaces(&mut self, spaces: Vec<Space>, focused: Option<usize>) {
        let was_active = self.topology.active_desktop();
        let count_changed = self.topology.set_spaces(spaces, focused);
        if self.topology.active_desktop() != was_active {
            log::debug!("Active desktop now {}", self.topology.active_desktop());
        }
        if count_changed {
            log::info!(
                "Space count now {} (world width {:.0})",
                self.topology.space_count(),
                self.topology.world_width()
            );
            self.windows = to_world_rects(&self.raw_windows, self.topology.desktop_size());
            self.clamp_to_world();
            self.sync_transform();
        }
    }

    /// Replace the window snapshot. A window the pet stands on or climbs
    /// carries the pet along with it.
    pub fn apply_windows(&mut self, windows: Vec<WindowRect>) {
        let rects = to_world_rects(&windows, self.topology.desktop_size());
        let carrier = match (self.pet.support, self.climb.as_ref()) {
            (_, Some(session)) if self.state == MotionState::Climbing => Some(session.window_id),
            (Support::Window(id), _) if self.state != MotionState::Falling => Some(id),
            _ => None,
        };

        if let Some(id) = carrier {
            let old = self.windows.iter().find(|w| w.id == id);
            let new = rects.iter().find(|w| w.id == id);
            if let (Some(old), Some(new)) = (old, new) {
                let shift = Vec2::new(new.left - old.left, new.top - old.top);
                if shift != Vec2::ZERO {
                    log::debug!("Riding window {id} by ({:.0}, {:.0})", shift.x, shift.y);
                    self.pet.position += shift.extend(0.0);
                    if let Some(session) = self.climb.as_mut() {
                        session.ride(shift.x, shift.y);
                    }
                    self.clamp_to_world();
                    self.sync_transform();
                }
            }
        }

        self.raw_windows = windows;
        self.windows = rects;
    }

    /// Left click. Returns whether the pet started pointing.
    pub fn on_click(&mut self, time: f64) -> bool {
        self.arbiter.trigger_pointing(self.state, time)
    }

    // -----------------------------------------------------------------------
    // Frame
    // -----------------------------------------------------------------------

    /// Advance one frame. `cursor` is the host cursor in screen
    /// coordinates, `None` when it could not be read.
    pub fn update(&mut self, time: f64, screen_size: Vec2, cursor: Option<Vec2>) {
        if screen_size.x > 0.0 && screen_size.y > 0.0 && screen_size != self.topology.desktop_size() {
            log::info!("Desktop resized to {:.0}x{:.0}", screen_size.x, screen_size.y);
            self.topology.set_desktop_size(screen_size);
            self.windows = to_world_rects(&self.raw_windows, screen_size);
            self.clamp_to_world();
        }
        if cursor.is_some() {
            self.cursor = cursor;
        }

        let Some(prev) = self.last_time.replace(time) else {
            return;
        };
        let dt = ((time - prev) as f32).min(self.cfg.polling.max_frame_dt);
        if dt <= 0.0 {
            return;
        }

        let (mouse, target_x) = self.resolve_target();
        let mouse_moved = self
            .mouse
            .latest()
            .map_or(true, |s| s.position.distance_squared(mouse) > f32::EPSILON);
        self.mouse.push(mouse, time);

        let input = ArbiterInput {
            time,
            dt,
            pet: &self.pet,
            state: self.state,
            stamina: self.stamina.value(),
            climb: self.climb.as_ref(),
            mouse,
            target_x,
            mouse_speed: self.mouse.speed(),
            mouse_moved,
            windows: &self.windows,
            desktop_width: self.topology.desktop_size().x,
            world_width: self.topology.world_width(),
        };
        let decision = self.arbiter.decide(&input, &mut self.rng);
        self.apply(decision, dt);
    }

    /// World cursor point and walk target. Without any cursor reading
    /// the pet holds its position.
    fn resolve_target(&mut self) -> (Vec2, f32) {
        let Some(cursor) = self.cursor else {
            let far = self.pet.position.truncate() + Vec2::new(0.0, self.topology.desktop_size().y);
            return (far, self.pet.position.x);
        };
        let target = self.topology.resolve_cursor(cursor);
        if target.on_monitor == self.cursor_lost {
            self.cursor_lost = !target.on_monitor;
            if self.cursor_lost {
                log::warn!(
                    "Cursor ({:.0}, {:.0}) is off every monitor; using desktop {}",
                    cursor.x,
                    cursor.y,
                    target.space_index
                );
            }
        }
        (target.world, target.world.x)
    }

    fn apply(&mut self, decision: Decision, dt: f32) {
        let prev = self.state;

        self.pet.position += decision.delta;
        self.pet.facing = decision.facing;
        self.pet.vertical_velocity = decision.vertical_velocity;
        self.pet.horizontal_velocity = decision.horizontal_velocity;
        self.pet.support = decision.support;
        self.pet.yaw = decision.yaw.unwrap_or(decision.facing.yaw());
        self.state = decision.state;
        self.climb = decision.climb;
        self.clamp_to_world();

        // Stamina
        match (self.state, self.climb.as_ref()) {
            (MotionState::Climbing, Some(session)) => {
                let drain = self.arbiter.physics().stamina_drain(
                    session.speed.abs(),
                    session.total_height,
                    session.climb_state,
                );
                self.stamina.apply(-drain * dt);
            }
            (MotionState::Falling, _) => {}
            _ => self
                .stamina
                .apply(self.cfg.climbing.ground_recovery_rate * dt),
        }

        if prev != self.state {
            log::debug!("{prev:?} -> {:?}", self.state);
        }
        self.sync_animation();
        self.sync_transform();
    }

    fn clamp_to_world(&mut self) {
        let width = self.topology.world_width();
        self.pet.position.x = self.pet.position.x.clamp(0.0, width);
        self.pet.position.y = self.pet.position.y.max(0.0);
    }

    fn sync_transform(&mut self) {
        let Pet {
            position, yaw, scale, ..
        } = self.pet;
        self.channels.scene_mut().set_transform(position, yaw, scale);
    }

    /// Play the clip for the current state and stop every other one.
    /// Clips in the same category cross-fade; other categories cut.
    fn sync_animation(&mut self) {
        let (wanted, speed) = self.desired_clip();
        let (fade, cut): (Vec<ChannelId>, Vec<ChannelId>) = self
            .channels
            .playing()
            .filter(|c| *c != wanted)
            .partition(|c| c.category() == wanted.category());
        self.channels.stop_all(cut, 0.0);
        self.channels.stop_all(fade, self.cfg.transition_duration);
        if !self.channels.is_playing(wanted) {
            log::debug!("Clip {} at {speed:.2}x", wanted.name());
        }
        self.channels.play_at(wanted, speed);
    }

    fn desired_clip(&self) -> (ChannelId, f32) {
        let base = self.channels.default_speed();
        let channel = match self.state {
            MotionState::Idle | MotionState::OnWindowTop => ChannelId::IdleBreathe,
            MotionState::Walking => ChannelId::Walk,
            MotionState::SlowRunning => ChannelId::RunSlow,
            MotionState::FastRunning => ChannelId::RunFast,
            MotionState::Jumping | MotionState::Falling => ChannelId::Jump,
            MotionState::Climbing => {
                let climb_state = self.climb.as_ref().map_or(ClimbState::Steady, |s| s.climb_state);
                return climb_clip(climb_state, base);
            }
            MotionState::PerformingGesture(g) => gesture_clip(g),
            MotionState::PerformingLongIdle(k) => idle_clip(k),
        };
        (channel, base)
    }
}

/// Clip and playback speed for a climb sub-state.
pub fn climb_clip(state: ClimbState, base: f32) -> (ChannelId, f32) {
    let clamp = |s: f32| s.clamp(CLIMB_MIN_SPEED, CLIMB_MAX_SPEED);
    match state {
        ClimbState::Starting => (ChannelId::ClimbStart, clamp(base)),
        ClimbState::PullingUp => (ChannelId::ClimbEnd, clamp(base)),
        ClimbState::Resting => (ChannelId::ClimbLoop, CLIMB_REST_SPEED),
        ClimbState::Slipping => (ChannelId::ClimbLoop, CLIMB_SLIP_SPEED),
        ClimbState::Reaching => (ChannelId::ClimbLoop, clamp(base * CLIMB_REACH_FACTOR)),
        ClimbState::Tired => (ChannelId::ClimbLoop, clamp(base * CLIMB_TIRED_FACTOR)),
        ClimbState::Steady => (ChannelId::ClimbLoop, clamp(base)),
    }
}

fn gesture_clip(kind: GestureKind) -> ChannelId {
    match kind {
        GestureKind::Surprise => ChannelId::Surprise,
        GestureKind::Angry => ChannelId::Angry,
        GestureKind::DoubleWave => ChannelId::WaveDouble,
        GestureKind::OneHandWave => ChannelId::WaveOne,
        GestureKind::Pointing => ChannelId::Point,
    }
}

fn idle_clip(kind: IdleKind) -> ChannelId {
    match kind {
        IdleKind::ArmStretch => ChannelId::ArmStretch,
        IdleKind::NeckStretch => ChannelId::NeckStretch,
        IdleKind::Yawn => ChannelId::Yawn,
        IdleKind::LookAround => ChannelId::LookAround,
    }
}
