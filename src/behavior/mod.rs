mod climbing;
mod idle;

use glam::{Vec2, Vec3};

use crate::config::{MovementConfig, PetConfig};
use crate::pet::climb::ClimbSession;
use crate::pet::physics::{ClimbState, Physics};
use crate::pet::{Facing, MotionState, Pet, Support};
use crate::world::WorldRect;

use idle::IdleScheduler;

/// Everything the arbiter reads for one frame.
pub struct ArbiterInput<'a> {
    pub time: f64,
    pub dt: f32,
    pub pet: &'a Pet,
    pub state: MotionState,
    pub stamina: f32,
    pub climb: Option<&'a ClimbSession>,
    /// Cursor in world space.
    pub mouse: Vec2,
    /// World X the pet walks toward.
    pub target_x: f32,
    /// Cursor speed in px/s.
    pub mouse_speed: f32,
    pub mouse_moved: bool,
    /// Front-most first.
    pub windows: &'a [WorldRect],
    pub desktop_width: f32,
    pub world_width: f32,
}

/// The arbiter's verdict for one frame.
#[derive(Debug, Clone)]
pub struct Decision {
    pub state: MotionState,
    pub delta: Vec3,
    pub facing: Facing,
    pub vertical_velocity: f32,
    pub horizontal_velocity: f32,
    pub support: Support,
    /// Climb session to carry into the next frame.
    pub climb: Option<ClimbSession>,
    /// Overrides the facing yaw while turning toward the viewer.
    pub yaw: Option<f32>,
}

impl Decision {
    /// Stand still in `state` on the current support.
    fn still(input: &ArbiterInput, state: MotionState, yaw: Option<f32>) -> Self {
        Self {
            state,
            delta: Vec3::ZERO,
            facing: input.pet.facing,
            vertical_velocity: 0.0,
            horizontal_velocity: 0.0,
            support: input.pet.support,
            climb: None,
            yaw,
        }
    }

    fn moving(input: &ArbiterInput, state: MotionState, dx: f32, facing: Facing) -> Self {
        Self {
            delta: Vec3::new(dx, 0.0, 0.0),
            facing,
            horizontal_velocity: if input.dt > 0.0 { dx / input.dt } else { 0.0 },
            ..Self::still(input, state, None)
        }
    }
}

/// Ground speed tier picked from the scaled distance to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedTier {
    Walk,
    SlowRun,
    FastRun,
}

impl SpeedTier {
    pub fn select(effective_distance: f32, cfg: &MovementConfig) -> Self {
        if effective_distance > cfg.fast_run_distance {
            SpeedTier::FastRun
        } else if effective_distance > cfg.slow_run_distance {
            SpeedTier::SlowRun
        } else {
            SpeedTier::Walk
        }
    }

    pub fn speed(self, cfg: &MovementConfig) -> f32 {
        match self {
            SpeedTier::Walk => cfg.walk_speed,
            SpeedTier::SlowRun => cfg.slow_run_speed,
            SpeedTier::FastRun => cfg.fast_run_speed,
        }
    }

    pub fn state(self) -> MotionState {
        match self {
            SpeedTier::Walk => MotionState::Walking,
            SpeedTier::SlowRun => MotionState::SlowRunning,
            SpeedTier::FastRun => MotionState::FastRunning,
        }
    }
}

/// Active desktop-boundary hop. Released once the pet is farther than
/// `prepare_distance + exit_buffer` from the boundary, or once it has stood
/// still inside that band for `settle_time`. Moving resets the settle clock,
/// so a hop in progress never ends inside the band.
#[derive(Debug, Clone, Copy)]
struct JumpLatch {
    boundary: f32,
    /// When the pet last stopped moving inside the band.
    still_since: Option<f64>,
}

/// Priority-ordered per-frame decision function. Holds only the memory
/// the tiers need between frames: the jump latch and idle scheduling.
pub struct BehaviorArbiter {
    cfg: PetConfig,
    physics: Physics,
    jump: Option<JumpLatch>,
    idle: IdleScheduler,
}

impl BehaviorArbiter {
    pub fn new(cfg: PetConfig, rng: &mut fastrand::Rng) -> Self {
        let physics = Physics::new(cfg.climbing);
        let idle = IdleScheduler::new(&cfg, rng);
        Self {
            cfg,
            physics,
            jump: None,
            idle,
        }
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    #[cfg(test)]
    pub fn jump_boundary(&self) -> Option<f32> {
        self.jump.map(|j| j.boundary)
    }

    #[cfg(test)]
    pub fn activity(&self) -> Option<&idle::Activity> {
        self.idle.active()
    }

    pub fn decide(&mut self, input: &ArbiterInput, rng: &mut fastrand::Rng) -> Decision {
        self.idle.observe(input);
        let decision = self.arbitrate(input, rng);

        let idle_tier = matches!(
            decision.state,
            MotionState::Idle
                | MotionState::OnWindowTop
                | MotionState::PerformingGesture(_)
                | MotionState::PerformingLongIdle(_)
        );
        if !idle_tier {
            self.idle.note_busy(input.time);
        }
        decision
    }

    /// Click entry point. Returns whether pointing started.
    pub fn trigger_pointing(&mut self, state: MotionState, time: f64) -> bool {
        self.idle.trigger_pointing(state, time)
    }

    fn arbitrate(&mut self, input: &ArbiterInput, rng: &mut fastrand::Rng) -> Decision {
        let pet = input.pet;

        // 1. Falling owns the pet until it lands.
        if input.state == MotionState::Falling || pet.support == Support::Airborne {
            self.jump = None;
            return self.fall(input);
        }

        // Climbing owns position; horizontal motion is sway only.
        if input.state == MotionState::Climbing {
            self.jump = None;
            return match input.climb {
                Some(session) => self.climb(input, session.clone(), rng),
                None => self.begin_fall(input, false),
            };
        }

        // 2. Edge of support.
        if let Support::Window(id) = pet.support {
            let slack = self.cfg.movement.edge_buffer;
            let supported = input
                .windows
                .iter()
                .find(|w| w.id == id)
                .is_some_and(|w| w.spans_x(pet.position.x, slack));
            if !supported {
                let fast = pet.horizontal_velocity.abs() > self.cfg.fall.safety_jump_speed_threshold;
                self.jump = None;
                return self.begin_fall(input, fast);
            }
        }

        // 3. Horizontal target.
        let dx = input.target_x - pet.position.x;
        let moving = dx.abs() > self.cfg.movement.dead_zone * pet.scale;

        // 4-6. Collision, boundary hop, speed tier.
        if let Some(decision) = self.locomotion(input, dx, moving) {
            return decision;
        }

        // 7. Gestures, then ambient idle.
        self.idle.decide(input, rng)
    }

    fn locomotion(&mut self, input: &ArbiterInput, dx: f32, moving: bool) -> Option<Decision> {
        self.update_jump_latch(input, dx, moving);

        if !moving {
            // Parked inside the hop band: hold the jump until it settles.
            return self
                .jump
                .is_some()
                .then(|| Decision::still(input, MotionState::Jumping, None));
        }

        let pet = input.pet;
        let mv = &self.cfg.movement;
        let dir = dx.signum();
        let facing = Facing::from_dx(dx, pet.facing);

        let (state, speed) = if self.jump.is_some() {
            (MotionState::Jumping, self.cfg.jump.jump_speed)
        } else {
            let tier = SpeedTier::select(dx.abs() / pet.scale, mv);
            (tier.state(), tier.speed(mv))
        };
        let step = (speed * self.cfg.physics_scale() * input.dt).min(dx.abs());

        if let Some(wall) = self.blocking_window(input, dir, step) {
            self.jump = None;
            return Some(self.contact(input, wall, facing));
        }

        Some(Decision::moving(input, state, dir * step, facing))
    }

    fn update_jump_latch(&mut self, input: &ArbiterInput, dx: f32, moving: bool) {
        let x = input.pet.position.x;
        match self.jump.as_mut() {
            Some(latch) => {
                let band = self.cfg.jump.prepare_distance + self.cfg.jump.exit_buffer;
                let exit = if (x - latch.boundary).abs() > band {
                    true
                } else if moving {
                    latch.still_since = None;
                    false
                } else {
                    let since = *latch.still_since.get_or_insert(input.time);
                    input.time - since >= self.cfg.jump.settle_time as f64
                };
                if exit {
                    log::debug!("Jump over boundary {:.0} finished", latch.boundary);
                    self.jump = None;
                }
            }
            None if moving => {
                if let Some(boundary) = self.boundary_ahead(input, dx) {
                    log::debug!("Preparing jump at boundary {boundary:.0}");
                    self.jump = Some(JumpLatch {
                        boundary,
                        still_since: None,
                    });
                }
            }
            None => {}
        }
    }

    /// The desktop boundary between the pet and its target, if close.
    fn boundary_ahead(&self, input: &ArbiterInput, dx: f32) -> Option<f32> {
        let w = input.desktop_width;
        if w <= 0.0 {
            return None;
        }
        let x = input.pet.position.x;
        let from = (x / w).floor();
        let to = (input.target_x / w).floor();
        if from == to {
            return None;
        }
        let boundary = if dx > 0.0 { (from + 1.0) * w } else { from * w };
        if boundary <= 0.0 || boundary >= input.world_width {
            return None;
        }
        ((x - boundary).abs() <= self.cfg.jump.prepare_distance).then_some(boundary)
    }

    /// Nearest window whose near edge the next step would cross.
    fn blocking_window(&self, input: &ArbiterInput, dir: f32, step: f32) -> Option<WorldRect> {
        let pet = input.pet;
        let body = self.cfg.movement.body_half_width * pet.scale;
        let y0 = pet.position.y;
        let y1 = y0 + self.cfg.pet_height * pet.scale;
        let front = pet.position.x + dir * body;
        const TOUCH: f32 = 0.01;

        input
            .windows
            .iter()
            .filter(|w| pet.support != Support::Window(w.id) && w.overlaps_y(y0, y1))
            .filter_map(|w| {
                let (edge, hit) = if dir > 0.0 {
                    (w.left, front <= w.left + TOUCH && front + step >= w.left)
                } else {
                    (w.right, front >= w.right - TOUCH && front - step <= w.right)
                };
                hit.then_some((*w, (edge - front).abs()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(w, _)| w)
    }

    /// Touching a window: climb it when allowed, otherwise stop against it.
    fn contact(&self, input: &ArbiterInput, wall: WorldRect, facing: Facing) -> Decision {
        let pet = input.pet;
        let climbing = &self.cfg.climbing;
        let body = self.cfg.movement.body_half_width * pet.scale;
        let height = wall.top - pet.position.y;

        if climbing.enabled && height > 0.0 && height <= climbing.max_climb_height {
            let mut session = ClimbSession::begin(wall, facing, body, pet.position.y);
            session.enter(
                ClimbState::Starting,
                Some(input.time + climbing.start_duration as f64),
            );
            log::info!("Climbing window {} ({:.0}px)", wall.id, height);
            return Decision {
                delta: Vec3::new(session.base_x - pet.position.x, 0.0, 0.0),
                facing,
                climb: Some(session),
                ..Decision::still(input, MotionState::Climbing, None)
            };
        }

        let edge = if facing == Facing::Right { wall.left } else { wall.right };
        let gap = ((edge - pet.position.x).abs() - body).max(0.0);
        log::debug!("Blocked by window {} ({:.0}px tall)", wall.id, height);
        Decision {
            delta: Vec3::new(facing.sign() * gap, 0.0, 0.0),
            facing,
            ..Decision::still(input, MotionState::resting_on(pet.support), None)
        }
    }

    /// Leave the current support. A fast exit keeps its momentum as an arc.
    fn begin_fall(&self, input: &ArbiterInput, safety_jump: bool) -> Decision {
        let pet = input.pet;
        let (vertical, horizontal) = if safety_jump {
            (-self.cfg.fall.safety_jump_kick, pet.horizontal_velocity)
        } else {
            (0.0, 0.0)
        };
        log::debug!(
            "Falling from ({:.0}, {:.0}){}",
            pet.position.x,
            pet.position.y,
            if safety_jump { " with safety jump" } else { "" }
        );
        Decision {
            vertical_velocity: vertical,
            horizontal_velocity: horizontal,
            support: Support::Airborne,
            ..Decision::still(input, MotionState::Falling, None)
        }
    }

    /// Gravity integration until a surface is crossed.
    fn fall(&self, input: &ArbiterInput) -> Decision {
        let pet = input.pet;
        let fall = &self.cfg.fall;
        let dt = input.dt;

        let v = (pet.vertical_velocity + fall.gravity * dt).min(fall.terminal_velocity);
        let y = pet.position.y;
        let new_y = y - v * dt;
        let x = pet.position.x + pet.horizontal_velocity * dt;
        let dx = x - pet.position.x;

        if v > 0.0 {
            let ledge = input
                .windows
                .iter()
                .filter(|w| w.spans_x(x, 0.0) && w.top <= y && w.top >= new_y)
                .max_by(|a, b| a.top.total_cmp(&b.top));

            if let Some(w) = ledge {
                log::debug!("Landed on window {}", w.id);
                return Decision {
                    delta: Vec3::new(dx, w.top - y, 0.0),
                    support: Support::Window(w.id),
                    ..Decision::still(input, MotionState::OnWindowTop, None)
                };
            }
            if new_y <= 0.0 {
                log::debug!("Landed on the ground");
                return Decision {
                    delta: Vec3::new(dx, -y, 0.0),
                    support: Support::Ground,
                    ..Decision::still(input, MotionState::Idle, None)
                };
            }
        }

        Decision {
            delta: Vec3::new(dx, new_y - y, 0.0),
            vertical_velocity: v,
            horizontal_velocity: pet.horizontal_velocity,
            support: Support::Airborne,
            ..Decision::still(input, MotionState::Falling, None)
        }
    }
}

#[cfg(test)]
mod tests;
