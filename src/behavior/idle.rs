use glam::Vec2;

use super::{ArbiterInput, Decision};
use crate::config::{GestureConfig, IdleConfig, PetConfig};
use crate::pet::{Facing, GestureKind, IdleKind, MotionState};

/// Stretches a long idle picks from.
const LONG_IDLE_KINDS: [IdleKind; 3] = [IdleKind::ArmStretch, IdleKind::NeckStretch, IdleKind::Yawn];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Gesture(GestureKind),
    Idle(IdleKind),
}

impl ActivityKind {
    pub fn state(self) -> MotionState {
        match self {
            ActivityKind::Gesture(g) => MotionState::PerformingGesture(g),
            ActivityKind::Idle(k) => MotionState::PerformingLongIdle(k),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Easing yaw toward the viewer before a long idle plays.
    TurningForward { from_yaw: f32, started: f64, until: f64 },
    Playing { until: f64 },
}

/// A timed gesture or idle clip. Completion only resumes breathing if
/// `token` is still the current generation and the pet is still in the
/// activity's state.
#[derive(Debug, Clone, Copy)]
pub struct Activity {
    pub kind: ActivityKind,
    pub phase: Phase,
    pub token: u64,
    /// Long idles play facing the viewer.
    pub faces_viewer: bool,
}

/// Per-gesture cooldowns plus hover tracking for the one-hand wave.
struct GestureTracker {
    last_trigger: [Option<f64>; GestureKind::ALL.len()],
    hover_since: Option<f64>,
}

impl GestureTracker {
    fn new() -> Self {
        Self {
            last_trigger: [None; GestureKind::ALL.len()],
            hover_since: None,
        }
    }

    fn ready(&self, kind: GestureKind, time: f64, cooldown: f32) -> bool {
        self.last_trigger[kind.index()].map_or(true, |at| at + cooldown as f64 <= time)
    }

    fn mark(&mut self, kind: GestureKind, time: f64) {
        self.last_trigger[kind.index()] = Some(time);
    }

    fn track_hover(&mut self, near: bool, time: f64) {
        if near {
            self.hover_since.get_or_insert(time);
        } else {
            self.hover_since = None;
        }
    }

    fn hovered_for(&self, time: f64) -> f64 {
        self.hover_since.map_or(0.0, |since| time - since)
    }
}

fn cooldown(cfg: &GestureConfig, kind: GestureKind) -> f32 {
    match kind {
        GestureKind::Surprise => cfg.surprise_cooldown,
        GestureKind::Angry => cfg.angry_cooldown,
        GestureKind::DoubleWave => cfg.double_wave_cooldown,
        GestureKind::OneHandWave => cfg.one_hand_wave_cooldown,
        GestureKind::Pointing => cfg.pointing_cooldown,
    }
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Tier 7: mouse gestures first, then the ambient idle chain
/// (long idle > scratch > look-around > breathing).
pub(super) struct IdleScheduler {
    idle: IdleConfig,
    gestures: GestureConfig,
    pet_height: f32,
    generation: u64,
    active: Option<Activity>,
    last_interaction: f64,
    /// One long idle per quiet period; cleared by movement.
    long_idle_done: bool,
    next_scratch_check: f64,
    next_look_around: f64,
    tracker: GestureTracker,
    mouse_distance: f32,
}

impl IdleScheduler {
    pub(super) fn new(cfg: &PetConfig, rng: &mut fastrand::Rng) -> Self {
        let mut scheduler = Self {
            idle: cfg.idle,
            gestures: cfg.gestures,
            pet_height: cfg.pet_height,
            generation: 0,
            active: None,
            last_interaction: 0.0,
            long_idle_done: false,
            next_scratch_check: cfg.idle.scratch_check_interval as f64,
            next_look_around: 0.0,
            tracker: GestureTracker::new(),
            mouse_distance: f32::INFINITY,
        };
        scheduler.next_look_around = scheduler.look_around_delay(rng);
        scheduler
    }

    #[cfg(test)]
    pub(super) fn active(&self) -> Option<&Activity> {
        self.active.as_ref()
    }

    fn look_around_delay(&self, rng: &mut fastrand::Rng) -> f64 {
        let lo = self.idle.look_around_min_interval;
        let hi = self.idle.look_around_max_interval;
        (lo + (hi - lo) * rng.f32()) as f64
    }

    /// Per-frame bookkeeping that runs regardless of which tier wins.
    pub(super) fn observe(&mut self, input: &ArbiterInput) {
        if input.mouse_moved {
            self.last_interaction = input.time;
            self.long_idle_done = false;
        }
        let pet = input.pet;
        let chest = Vec2::new(
            pet.position.x,
            pet.position.y + self.pet_height * pet.scale * 0.5,
        );
        self.mouse_distance = input.mouse.distance(chest);
        self.tracker
            .track_hover(self.mouse_distance < self.gestures.near_proximity, input.time);
    }

    /// A higher tier took over: drop any running activity.
    pub(super) fn note_busy(&mut self, time: f64) {
        self.last_interaction = time;
        self.long_idle_done = false;
        if let Some(act) = self.active.take() {
            self.generation += 1;
            log::debug!("{:?} interrupted", act.kind);
        }
    }

    pub(super) fn trigger_pointing(&mut self, state: MotionState, time: f64) -> bool {
        let at_rest = state.is_at_rest() || matches!(state, MotionState::PerformingLongIdle(_));
        let cd = cooldown(&self.gestures, GestureKind::Pointing);
        if !at_rest || !self.tracker.ready(GestureKind::Pointing, time, cd) {
            return false;
        }
        self.tracker.mark(GestureKind::Pointing, time);
        self.start(
            ActivityKind::Gesture(GestureKind::Pointing),
            Phase::Playing {
                until: time + self.gestures.duration as f64,
            },
            false,
        );
        log::info!("Pointing at click");
        true
    }

    fn start(&mut self, kind: ActivityKind, phase: Phase, faces_viewer: bool) {
        self.generation += 1;
        self.active = Some(Activity {
            kind,
            phase,
            token: self.generation,
            faces_viewer,
        });
    }

    pub(super) fn decide(&mut self, input: &ArbiterInput, rng: &mut fastrand::Rng) -> Decision {
        let time = input.time;
        let rest = MotionState::resting_on(input.pet.support);

        if let Some(act) = self.active {
            match act.phase {
                Phase::TurningForward {
                    from_yaw,
                    started,
                    until,
                } => {
                    if time >= until {
                        self.active = Some(Activity {
                            phase: Phase::Playing {
                                until: time + self.idle.long_idle_duration as f64,
                            },
                            ..act
                        });
                        return Decision::still(input, act.kind.state(), Some(0.0));
                    }
                    if let Some(d) = self.try_gesture(input) {
                        return d;
                    }
                    let span = (until - started).max(f64::EPSILON);
                    let t = ((time - started) / span) as f32;
                    let yaw = from_yaw * (1.0 - smoothstep(t));
                    return Decision::still(input, rest, Some(yaw));
                }
                Phase::Playing { until } if time < until => {
                    if matches!(act.kind, ActivityKind::Idle(_)) {
                        if let Some(d) = self.try_gesture(input) {
                            return d;
                        }
                    }
                    let yaw = act.faces_viewer.then_some(0.0);
                    let mut decision = Decision::still(input, act.kind.state(), yaw);
                    if let ActivityKind::Gesture(_) = act.kind {
                        decision.facing = self.facing_mouse(input);
                    }
                    return decision;
                }
                Phase::Playing { .. } => self.complete(act, input, rng),
            }
        }

        if let Some(d) = self.try_gesture(input) {
            return d;
        }
        if let Some(d) = self.try_ambient(input, rng) {
            return d;
        }
        Decision::still(input, rest, None)
    }

    fn complete(&mut self, act: Activity, input: &ArbiterInput, rng: &mut fastrand::Rng) {
        self.active = None;
        let current = act.token == self.generation && input.state == act.kind.state();
        if current {
            log::debug!("{:?} finished", act.kind);
        } else {
            log::debug!("Stale completion for {:?} ignored", act.kind);
        }

        if act.kind == ActivityKind::Idle(IdleKind::LookAround) {
            self.next_look_around = input.time + self.look_around_delay(rng);
        }
    }

    fn facing_mouse(&self, input: &ArbiterInput) -> Facing {
        Facing::from_dx(input.mouse.x - input.pet.position.x, input.pet.facing)
    }

    /// Fixed order, first ready match wins.
    fn scan_gestures(&self, input: &ArbiterInput) -> Option<GestureKind> {
        let g = &self.gestures;
        let speed = input.mouse_speed;
        let d = self.mouse_distance;
        let hovered = d < g.near_proximity && self.tracker.hovered_for(input.time) >= g.hover_duration as f64;

        [
            (GestureKind::Surprise, speed > g.sudden_velocity && d < g.close_proximity),
            (GestureKind::Angry, speed > g.rapid_velocity && d < g.near_proximity),
            (GestureKind::DoubleWave, d > g.close_proximity && d < g.near_proximity),
            (GestureKind::OneHandWave, hovered),
        ]
        .into_iter()
        .find(|(kind, hit)| *hit && self.tracker.ready(*kind, input.time, cooldown(g, *kind)))
        .map(|(kind, _)| kind)
    }

    fn try_gesture(&mut self, input: &ArbiterInput) -> Option<Decision> {
        let kind = self.scan_gestures(input)?;
        self.tracker.mark(kind, input.time);
        self.start(
            ActivityKind::Gesture(kind),
            Phase::Playing {
                until: input.time + self.gestures.duration as f64,
            },
            false,
        );
        log::debug!("Gesture {kind:?}");
        Some(Decision {
            facing: self.facing_mouse(input),
            ..Decision::still(input, MotionState::PerformingGesture(kind), None)
        })
    }

    fn try_ambient(&mut self, input: &ArbiterInput, rng: &mut fastrand::Rng) -> Option<Decision> {
        let time = input.time;
        let rest = MotionState::resting_on(input.pet.support);

        if self.next_look_around.is_infinite() {
            // The last look-around was interrupted before it could reschedule.
            self.next_look_around = time + self.look_around_delay(rng);
        }

        if !self.long_idle_done && time - self.last_interaction >= self.idle.long_idle_timeout as f64 {
            self.long_idle_done = true;
            let kind = LONG_IDLE_KINDS[rng.usize(..LONG_IDLE_KINDS.len())];
            let yaw = input.pet.yaw;
            log::info!("Long idle: {kind:?}");
            self.start(
                ActivityKind::Idle(kind),
                Phase::TurningForward {
                    from_yaw: yaw,
                    started: time,
                    until: time + self.idle.rotation_transition_duration as f64,
                },
                true,
            );
            return Some(Decision::still(input, rest, Some(yaw)));
        }

        if time >= self.next_scratch_check {
            self.next_scratch_check = time + self.idle.scratch_check_interval as f64;
            if rng.f32() < self.idle.scratch_chance {
                let kind = if rng.bool() {
                    IdleKind::ArmStretch
                } else {
                    IdleKind::NeckStretch
                };
                log::debug!("Scratch: {kind:?}");
                self.start(
                    ActivityKind::Idle(kind),
                    Phase::Playing {
                        until: time + self.idle.scratch_duration as f64,
                    },
                    false,
                );
                return Some(Decision::still(input, MotionState::PerformingLongIdle(kind), None));
            }
        }

        if time >= self.next_look_around {
            // Rescheduled when the look-around completes.
            self.next_look_around = f64::INFINITY;
            self.start(
                ActivityKind::Idle(IdleKind::LookAround),
                Phase::Playing {
                    until: time + self.idle.look_around_duration as f64,
                },
                false,
            );
            return Some(Decision::still(
                input,
                MotionState::PerformingLongIdle(IdleKind::LookAround),
                None,
            ));
        }

        None
    }
}
