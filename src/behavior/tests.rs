use approx::assert_relative_eq;
use glam::{Vec2, Vec3};
use rstest::rstest;

use super::*;
use crate::pet::physics::ClimbState;
use crate::pet::{GestureKind, IdleKind};

const DESKTOP_W: f32 = 1440.0;
const DT: f32 = 1.0 / 60.0;

/// Mutable stand-in for the controller's per-frame state.
struct Frame {
    pet: Pet,
    state: MotionState,
    stamina: f32,
    climb: Option<ClimbSession>,
    mouse: Vec2,
    target_x: f32,
    mouse_speed: f32,
    mouse_moved: bool,
    windows: Vec<WorldRect>,
    world_width: f32,
    time: f64,
    dt: f32,
}

impl Frame {
    fn new(x: f32) -> Self {
        Self {
            pet: Pet::new(x, 1.0),
            state: MotionState::Idle,
            stamina: 100.0,
            climb: None,
            mouse: Vec2::new(x, 800.0),
            target_x: x,
            mouse_speed: 0.0,
            mouse_moved: false,
            windows: Vec::new(),
            world_width: DESKTOP_W,
            time: 0.0,
            dt: DT,
        }
    }

    fn input(&self) -> ArbiterInput<'_> {
        ArbiterInput {
            time: self.time,
            dt: self.dt,
            pet: &self.pet,
            state: self.state,
            stamina: self.stamina,
            climb: self.climb.as_ref(),
            mouse: self.mouse,
            target_x: self.target_x,
            mouse_speed: self.mouse_speed,
            mouse_moved: self.mouse_moved,
            windows: &self.windows,
            desktop_width: DESKTOP_W,
            world_width: self.world_width,
        }
    }

    fn step(&mut self, arbiter: &mut BehaviorArbiter, rng: &mut fastrand::Rng) -> Decision {
        let d = arbiter.decide(&self.input(), rng);
        self.pet.position += d.delta;
        self.pet.facing = d.facing;
        self.pet.vertical_velocity = d.vertical_velocity;
        self.pet.horizontal_velocity = d.horizontal_velocity;
        self.pet.support = d.support;
        self.pet.yaw = d.yaw.unwrap_or(d.facing.yaw());
        self.state = d.state;
        self.climb = d.climb.clone();
        self.time += self.dt as f64;
        d
    }
}

/// No scratches, look-arounds or long idles unless a test asks for them.
fn quiet_config() -> PetConfig {
    let mut cfg = PetConfig::default();
    cfg.idle.scratch_chance = 0.0;
    cfg.idle.look_around_min_interval = 1.0e6;
    cfg.idle.look_around_max_interval = 1.0e6;
    cfg.idle.long_idle_timeout = 1.0e6;
    cfg.climbing.base_slip_chance = 0.0;
    cfg
}

fn arbiter(cfg: PetConfig) -> (BehaviorArbiter, fastrand::Rng) {
    let mut rng = fastrand::Rng::with_seed(42);
    let arbiter = BehaviorArbiter::new(cfg, &mut rng);
    (arbiter, rng)
}

fn window(id: u64, left: f32, right: f32, top: f32) -> WorldRect {
    WorldRect {
        id,
        left,
        right,
        bottom: 0.0,
        top,
        z_order: 0,
    }
}

// ---------------------------------------------------------------------------
// Locomotion
// ---------------------------------------------------------------------------

#[test]
fn far_target_fast_runs_without_overshoot() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(1000.0);
    frame.mouse = Vec2::new(50.0, 450.0);
    frame.target_x = 50.0;

    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, MotionState::FastRunning);
    assert_eq!(d.facing, Facing::Left);
    assert_relative_eq!(d.delta.x, -550.0 * DT, epsilon = 1e-3);

    // A huge frame still stops exactly on the target.
    let mut frame = Frame::new(1000.0);
    frame.target_x = 50.0;
    frame.dt = 10.0;
    let d = frame.step(&mut arb, &mut rng);
    assert_relative_eq!(d.delta.x, -950.0);
    assert_relative_eq!(frame.pet.position.x, 50.0);
}

#[rstest]
#[case(6.0, MotionState::Walking)]
#[case(200.0, MotionState::Walking)]
#[case(200.5, MotionState::SlowRunning)]
#[case(500.0, MotionState::SlowRunning)]
#[case(500.5, MotionState::FastRunning)]
#[case(1200.0, MotionState::FastRunning)]
fn speed_tier_thresholds(#[case] distance: f32, #[case] expected: MotionState) {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(100.0);
    frame.target_x = 100.0 + distance;
    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, expected);
    assert_eq!(SpeedTier::select(distance, &PetConfig::default().movement).state(), expected);
}

#[test]
fn dead_zone_scales_with_size() {
    let mut cfg = quiet_config();
    cfg.character_scale = 2.0;
    let (mut arb, mut rng) = arbiter(cfg);
    let mut frame = Frame::new(100.0);
    frame.pet.scale = 2.0;
    frame.target_x = 108.0;
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::Idle);
}

// ---------------------------------------------------------------------------
// Edge of support and falling
// ---------------------------------------------------------------------------

fn on_window_top(x: f32) -> Frame {
    let mut frame = Frame::new(x);
    frame.windows = vec![window(1, 300.0, 700.0, 400.0)];
    frame.pet.position.y = 400.0;
    frame.pet.support = Support::Window(1);
    frame.state = MotionState::OnWindowTop;
    frame
}

#[test]
fn walking_off_a_ledge_drops_straight_down() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = on_window_top(710.0);
    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, MotionState::Falling);
    assert_eq!(d.vertical_velocity, 0.0);
    assert_eq!(d.horizontal_velocity, 0.0);
    assert_eq!(d.support, Support::Airborne);
}

#[test]
fn running_off_a_ledge_arcs() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = on_window_top(710.0);
    frame.state = MotionState::FastRunning;
    frame.pet.horizontal_velocity = 500.0;
    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, MotionState::Falling);
    assert!(d.vertical_velocity < 0.0);
    assert_eq!(d.horizontal_velocity, 500.0);
}

#[test]
fn edge_buffer_keeps_footing() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = on_window_top(704.0);
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::OnWindowTop);
}

#[test]
fn vanished_support_window_drops_the_pet() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = on_window_top(500.0);
    frame.windows.clear();
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::Falling);
}

#[test]
fn falling_beats_gestures() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(500.0);
    frame.state = MotionState::Falling;
    frame.pet.support = Support::Airborne;
    frame.pet.position.y = 300.0;
    frame.mouse = Vec2::new(500.0, 350.0);
    frame.mouse_speed = 5000.0;
    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, MotionState::Falling);
    assert!(arb.activity().is_none());
}

#[test]
fn fall_lands_on_window_top() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(500.0);
    frame.windows = vec![window(1, 300.0, 700.0, 400.0)];
    frame.state = MotionState::Falling;
    frame.pet.support = Support::Airborne;
    frame.pet.position.y = 405.0;
    frame.pet.vertical_velocity = 600.0;

    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, MotionState::OnWindowTop);
    assert_eq!(d.support, Support::Window(1));
    assert_relative_eq!(frame.pet.position.y, 400.0);
    assert_eq!(d.vertical_velocity, 0.0);
}

#[test]
fn fall_reaches_ground_and_caps_speed() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(100.0);
    frame.state = MotionState::Falling;
    frame.pet.support = Support::Airborne;
    frame.pet.position.y = 3000.0;

    let mut landed = false;
    for _ in 0..600 {
        let d = frame.step(&mut arb, &mut rng);
        assert!(d.vertical_velocity <= 1500.0);
        if d.state == MotionState::Idle {
            landed = true;
            break;
        }
    }
    assert!(landed);
    assert_eq!(frame.pet.position.y, 0.0);
    assert_eq!(frame.pet.support, Support::Ground);
}

// ---------------------------------------------------------------------------
// Desktop boundary hop
// ---------------------------------------------------------------------------

#[test]
fn jump_latches_near_boundary_and_holds_until_clear() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(1200.0);
    frame.world_width = 2.0 * DESKTOP_W;
    frame.target_x = 1800.0;

    // 240px out: not yet.
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::FastRunning);
    assert_eq!(arb.jump_boundary(), None);

    frame.pet.position.x = 1340.0;
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::Jumping);
    assert_eq!(arb.jump_boundary(), Some(DESKTOP_W));

    // Target jumps into the dead zone: still hopping.
    frame.target_x = frame.pet.position.x + 2.0;
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::Jumping);

    frame.target_x = 1800.0;
    for _ in 0..200 {
        let x_before = frame.pet.position.x;
        let d = frame.step(&mut arb, &mut rng);
        if x_before - DESKTOP_W <= 200.0 {
            assert_eq!(d.state, MotionState::Jumping, "left jump early at {x_before}");
        } else {
            assert_ne!(d.state, MotionState::Jumping, "still jumping at {x_before}");
            return;
        }
    }
    panic!("never cleared the jump band");
}

#[test]
fn parked_jump_settles() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(1400.0);
    frame.world_width = 2.0 * DESKTOP_W;
    frame.target_x = 1600.0;
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::Jumping);

    frame.target_x = frame.pet.position.x;
    frame.mouse.x = frame.target_x;
    let mut states = Vec::new();
    for _ in 0..90 {
        states.push(frame.step(&mut arb, &mut rng).state);
    }
    assert_eq!(states[0], MotionState::Jumping);
    assert_eq!(states[30], MotionState::Jumping);
    assert_eq!(*states.last().unwrap(), MotionState::Idle);
}

#[test]
fn moving_again_restarts_the_settle_clock() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(1400.0);
    frame.world_width = 2.0 * DESKTOP_W;
    frame.target_x = 1600.0;
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::Jumping);

    let park = |frame: &mut Frame, arb: &mut BehaviorArbiter, rng: &mut fastrand::Rng| {
        frame.target_x = frame.pet.position.x;
        frame.mouse.x = frame.target_x;
        (0..40).map(|_| frame.step(arb, rng).state).last()
    };

    assert_eq!(park(&mut frame, &mut arb, &mut rng), Some(MotionState::Jumping));
    frame.target_x = 1600.0;
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::Jumping);
    assert!((frame.pet.position.x - DESKTOP_W).abs() < 200.0);

    // 80 still frames in total, but never 60 in a row.
    assert_eq!(park(&mut frame, &mut arb, &mut rng), Some(MotionState::Jumping));
    assert!(arb.jump_boundary().is_some());
}

// ---------------------------------------------------------------------------
// Collision and climbing
// ---------------------------------------------------------------------------

#[test]
fn moving_right_into_a_window_climbs_its_left_edge() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(278.0);
    frame.windows = vec![window(1, 300.0, 700.0, 400.0)];
    frame.target_x = 600.0;

    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, MotionState::Climbing);
    assert_eq!(d.facing, Facing::Right);
    let session = d.climb.expect("climb session");
    assert_eq!(session.base_x, 280.0);
    assert_eq!(session.total_height, 400.0);
    assert_eq!(session.climb_state, ClimbState::Starting);
}

#[test]
fn moving_left_into_a_window_climbs_its_right_edge() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(722.0);
    frame.windows = vec![window(1, 300.0, 700.0, 400.0)];
    frame.target_x = 400.0;

    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, MotionState::Climbing);
    assert_eq!(d.facing, Facing::Left);
    assert_eq!(d.climb.map(|s| s.base_x), Some(720.0));
}

#[test]
fn too_tall_window_blocks() {
    let mut cfg = quiet_config();
    cfg.climbing.max_climb_height = 300.0;
    let (mut arb, mut rng) = arbiter(cfg);
    let mut frame = Frame::new(278.0);
    frame.windows = vec![window(1, 300.0, 700.0, 400.0)];
    frame.target_x = 600.0;

    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, MotionState::Idle);
    assert_eq!(d.facing, Facing::Right);
    assert_relative_eq!(frame.pet.position.x, 280.0);

    // Pressing on does not push through.
    frame.step(&mut arb, &mut rng);
    assert_relative_eq!(frame.pet.position.x, 280.0);
}

#[test]
fn windows_above_the_pet_do_not_block() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(278.0);
    let mut high = window(1, 300.0, 700.0, 800.0);
    high.bottom = 500.0;
    frame.windows = vec![high];
    frame.target_x = 600.0;
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::SlowRunning);
}

fn climb_until_done(frame: &mut Frame, arb: &mut BehaviorArbiter, rng: &mut fastrand::Rng) -> MotionState {
    for _ in 0..(60 * 60) {
        let d = frame.step(arb, rng);
        if d.state != MotionState::Climbing {
            return d.state;
        }
    }
    MotionState::Climbing
}

#[test]
fn climb_ends_on_window_top() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(278.0);
    frame.windows = vec![window(1, 300.0, 700.0, 400.0)];
    frame.target_x = 600.0;
    frame.mouse.x = 600.0;

    let end = climb_until_done(&mut frame, &mut arb, &mut rng);
    assert_eq!(end, MotionState::OnWindowTop);
    assert_eq!(frame.pet.support, Support::Window(1));
    assert_relative_eq!(frame.pet.position.y, 400.0);
    assert_relative_eq!(frame.pet.position.x, 320.0);
    assert!(frame.climb.is_none());
}

#[test]
fn climb_visits_reach_and_pull_up() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(278.0);
    frame.windows = vec![window(1, 300.0, 700.0, 400.0)];
    frame.target_x = 600.0;

    let mut seen = Vec::new();
    for _ in 0..(60 * 60) {
        let d = frame.step(&mut arb, &mut rng);
        match d.climb {
            Some(s) if seen.last() != Some(&s.climb_state) => seen.push(s.climb_state),
            Some(_) => {}
            None => break,
        }
    }
    assert_eq!(
        seen,
        vec![
            ClimbState::Starting,
            ClimbState::Steady,
            ClimbState::Reaching,
            ClimbState::PullingUp
        ]
    );
}

#[test]
fn climb_sways_around_anchor() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(278.0);
    frame.windows = vec![window(1, 300.0, 700.0, 400.0)];
    frame.target_x = 600.0;
    frame.step(&mut arb, &mut rng);
    for _ in 0..60 {
        frame.step(&mut arb, &mut rng);
        assert!((frame.pet.position.x - 280.0).abs() <= 0.5 + 1e-3);
    }
}

#[test]
fn slipping_to_the_bottom_falls() {
    let mut cfg = quiet_config();
    cfg.climbing.base_slip_chance = 1000.0;
    cfg.climbing.slip_recovery_time = 5.0;
    let (mut arb, mut rng) = arbiter(cfg);
    let mut frame = Frame::new(278.0);
    frame.windows = vec![window(1, 300.0, 700.0, 400.0)];
    frame.target_x = 600.0;

    assert_eq!(climb_until_done(&mut frame, &mut arb, &mut rng), MotionState::Falling);
}

#[test]
fn window_closing_mid_climb_falls() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(278.0);
    frame.windows = vec![window(1, 300.0, 700.0, 400.0)];
    frame.target_x = 600.0;
    for _ in 0..30 {
        frame.step(&mut arb, &mut rng);
    }
    assert_eq!(frame.state, MotionState::Climbing);

    frame.windows.clear();
    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, MotionState::Falling);
    assert!(d.climb.is_none());
}

#[test]
fn climbing_ignores_the_cursor() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = Frame::new(278.0);
    frame.windows = vec![window(1, 300.0, 700.0, 400.0)];
    frame.target_x = 600.0;
    frame.step(&mut arb, &mut rng);

    frame.target_x = 0.0;
    frame.mouse = Vec2::new(280.0, 100.0);
    frame.mouse_speed = 5000.0;
    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, MotionState::Climbing);
    assert!(d.delta.x.abs() < 1.0);
}

// ---------------------------------------------------------------------------
// Gestures
// ---------------------------------------------------------------------------

/// Pet at rest at x=500; chest sits at (500, 60).
fn gesture_frame(mouse: Vec2, speed: f32) -> Frame {
    let mut frame = Frame::new(500.0);
    frame.mouse = mouse;
    frame.target_x = 500.0;
    frame.mouse_speed = speed;
    frame
}

#[rstest]
#[case(Vec2::new(500.0, 110.0), 4000.0, MotionState::PerformingGesture(GestureKind::Surprise))]
#[case(Vec2::new(500.0, 210.0), 2000.0, MotionState::PerformingGesture(GestureKind::Angry))]
#[case(Vec2::new(500.0, 210.0), 0.0, MotionState::PerformingGesture(GestureKind::DoubleWave))]
#[case(Vec2::new(500.0, 110.0), 0.0, MotionState::Idle)]
#[case(Vec2::new(500.0, 500.0), 4000.0, MotionState::Idle)]
fn gesture_priority(#[case] mouse: Vec2, #[case] speed: f32, #[case] expected: MotionState) {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = gesture_frame(mouse, speed);
    assert_eq!(frame.step(&mut arb, &mut rng).state, expected);
}

#[test]
fn hovering_close_waves() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = gesture_frame(Vec2::new(500.0, 110.0), 0.0);
    let mut first_wave = None;
    for _ in 0..120 {
        let d = frame.step(&mut arb, &mut rng);
        if d.state == MotionState::PerformingGesture(GestureKind::OneHandWave) {
            first_wave = Some(frame.time);
            break;
        }
        assert_eq!(d.state, MotionState::Idle);
    }
    let t = first_wave.expect("one-hand wave");
    assert!(t >= 1.5 && t < 1.6, "waved at {t}");
}

#[test]
fn cooldown_lets_the_next_gesture_through() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = gesture_frame(Vec2::new(500.0, 110.0), 4000.0);
    assert_eq!(
        frame.step(&mut arb, &mut rng).state,
        MotionState::PerformingGesture(GestureKind::Surprise)
    );

    // Let the surprise play out.
    frame.mouse_speed = 0.0;
    frame.mouse = Vec2::new(500.0, 800.0);
    while frame.time < 2.5 {
        frame.step(&mut arb, &mut rng);
    }
    assert_eq!(frame.state, MotionState::Idle);

    frame.mouse = Vec2::new(500.0, 110.0);
    frame.mouse_speed = 4000.0;
    assert_eq!(
        frame.step(&mut arb, &mut rng).state,
        MotionState::PerformingGesture(GestureKind::Angry)
    );
}

#[test]
fn movement_interrupts_a_gesture() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = gesture_frame(Vec2::new(500.0, 210.0), 0.0);
    frame.step(&mut arb, &mut rng);
    let token = arb.activity().map(|a| a.token).expect("gesture running");

    frame.target_x = 900.0;
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::SlowRunning);
    assert!(arb.activity().is_none());

    // Back at rest the old wave does not resume.
    frame.target_x = frame.pet.position.x;
    frame.mouse = Vec2::new(frame.pet.position.x, 800.0);
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::Idle);
    assert!(arb.activity().map_or(true, |a| a.token != token));
}

#[test]
fn pointing_only_from_rest_and_respects_cooldown() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = gesture_frame(Vec2::new(500.0, 800.0), 0.0);

    assert!(!arb.trigger_pointing(MotionState::Walking, 0.0));
    assert!(arb.trigger_pointing(MotionState::Idle, 0.0));
    assert_eq!(
        frame.step(&mut arb, &mut rng).state,
        MotionState::PerformingGesture(GestureKind::Pointing)
    );
    assert!(!arb.trigger_pointing(MotionState::Idle, 1.0));
    assert!(arb.trigger_pointing(MotionState::Idle, 6.0));
}

// ---------------------------------------------------------------------------
// Ambient idle
// ---------------------------------------------------------------------------

fn long_idle_config() -> PetConfig {
    let mut cfg = quiet_config();
    cfg.idle.long_idle_timeout = 30.0;
    cfg
}

#[test]
fn long_idle_turns_forward_then_stretches_once() {
    let (mut arb, mut rng) = arbiter(long_idle_config());
    let mut frame = Frame::new(500.0);
    frame.dt = 0.1;

    let mut starts = Vec::new();
    let mut turned = false;
    let mut prev = MotionState::Idle;
    while frame.time < 150.0 {
        let yaw_before = frame.pet.yaw;
        let d = frame.step(&mut arb, &mut rng);
        if frame.time < 30.0 {
            assert_eq!(d.state, MotionState::Idle);
        }
        if d.state == MotionState::Idle && d.yaw.is_some() {
            assert!(frame.pet.yaw <= yaw_before + 1e-6);
            turned = true;
        }
        if let MotionState::PerformingLongIdle(kind) = d.state {
            if prev != d.state {
                assert!(turned, "stretch before turning forward");
                assert_eq!(d.yaw, Some(0.0));
                starts.push((frame.time, kind));
            }
        }
        prev = d.state;
    }

    assert_eq!(starts.len(), 1);
    let (t, kind) = starts[0];
    assert!(t >= 35.0, "stretch started at {t}");
    assert!(matches!(
        kind,
        IdleKind::ArmStretch | IdleKind::NeckStretch | IdleKind::Yawn
    ));
    assert_eq!(frame.state, MotionState::Idle);
    assert!(arb.activity().is_none());
}

fn long_idle_starts(
    frame: &mut Frame,
    arb: &mut BehaviorArbiter,
    rng: &mut fastrand::Rng,
    until: f64,
) -> usize {
    let mut starts = 0;
    let mut prev = frame.state;
    while frame.time < until {
        let d = frame.step(arb, rng);
        if matches!(d.state, MotionState::PerformingLongIdle(_)) && d.state != prev {
            starts += 1;
        }
        prev = d.state;
    }
    starts
}

#[test]
fn mouse_movement_rearms_long_idle() {
    let (mut arb, mut rng) = arbiter(long_idle_config());
    let mut frame = Frame::new(500.0);
    frame.dt = 0.1;
    assert_eq!(long_idle_starts(&mut frame, &mut arb, &mut rng, 60.0), 1);

    // A small nudge inside the dead zone counts as interaction.
    frame.mouse_moved = true;
    frame.step(&mut arb, &mut rng);
    frame.mouse_moved = false;

    let start = frame.time;
    assert_eq!(long_idle_starts(&mut frame, &mut arb, &mut rng, start + 29.0), 0);
    assert_eq!(long_idle_starts(&mut frame, &mut arb, &mut rng, start + 45.0), 1);
    assert_eq!(long_idle_starts(&mut frame, &mut arb, &mut rng, start + 150.0), 0);
}

#[test]
fn movement_during_stretch_cancels_breathing_resume() {
    let (mut arb, mut rng) = arbiter(long_idle_config());
    let mut frame = Frame::new(500.0);
    frame.dt = 0.1;
    while !matches!(frame.state, MotionState::PerformingLongIdle(_)) {
        frame.step(&mut arb, &mut rng);
        assert!(frame.time < 40.0);
    }

    frame.dt = DT;
    frame.target_x = 800.0;
    let d = frame.step(&mut arb, &mut rng);
    assert_eq!(d.state, MotionState::SlowRunning);
    assert!(arb.activity().is_none());

    // Still walking well past when the stretch would have ended.
    for _ in 0..(4 * 60) {
        let d = frame.step(&mut arb, &mut rng);
        if frame.pet.position.x < 795.0 {
            assert!(d.state.is_locomotion());
        }
    }
}

#[test]
fn look_around_reschedules_itself() {
    let mut cfg = quiet_config();
    cfg.idle.look_around_min_interval = 5.0;
    cfg.idle.look_around_max_interval = 10.0;
    let (mut arb, mut rng) = arbiter(cfg);
    let mut frame = Frame::new(500.0);
    frame.dt = 0.1;

    let mut starts = Vec::new();
    let mut prev = MotionState::Idle;
    while frame.time < 40.0 {
        let d = frame.step(&mut arb, &mut rng);
        let looking = MotionState::PerformingLongIdle(IdleKind::LookAround);
        if d.state == looking && prev != looking {
            starts.push(frame.time);
        }
        prev = d.state;
    }
    assert!(starts.len() >= 3, "look-arounds at {starts:?}");
    assert!(starts[0] >= 5.0 && starts[0] <= 10.2);
    for pair in starts.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= 2.0 + 5.0 - 0.2 && gap <= 2.0 + 10.0 + 0.2, "gap {gap}");
    }
}

#[test]
fn gestures_preempt_ambient_idle() {
    let mut cfg = quiet_config();
    cfg.idle.scratch_chance = 1.0;
    cfg.idle.scratch_check_interval = 0.0;
    let (mut arb, mut rng) = arbiter(cfg);
    let mut frame = gesture_frame(Vec2::new(500.0, 800.0), 0.0);
    assert!(matches!(
        frame.step(&mut arb, &mut rng).state,
        MotionState::PerformingLongIdle(IdleKind::ArmStretch | IdleKind::NeckStretch)
    ));

    frame.mouse = Vec2::new(500.0, 110.0);
    frame.mouse_speed = 4000.0;
    assert_eq!(
        frame.step(&mut arb, &mut rng).state,
        MotionState::PerformingGesture(GestureKind::Surprise)
    );
}

#[test]
fn window_top_is_the_rest_state_on_a_window() {
    let (mut arb, mut rng) = arbiter(quiet_config());
    let mut frame = on_window_top(500.0);
    frame.state = MotionState::Walking;
    assert_eq!(frame.step(&mut arb, &mut rng).state, MotionState::OnWindowTop);
    assert_eq!(frame.pet.position, Vec3::new(500.0, 400.0, 0.0));
}
