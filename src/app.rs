use std::sync::Arc;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use crate::click::ClickState;
use crate::config::PetConfig;
use crate::controller::PetController;
use crate::ecs::scene::Scene;
use crate::platform;
use crate::snapshot::poller::SnapshotPoller;
use crate::world::Monitor;

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    last_log_time: Instant,
    frame_time_sum: f64,
    frame_time_max: f64,
    frames_since_log: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            last_log_time: Instant::now(),
            frame_time_sum: 0.0,
            frame_time_max: 0.0,
            frames_since_log: 0,
        }
    }

    /// Returns true when a report was logged this frame.
    fn record_frame(&mut self, dt: f64) -> bool {
        self.frames_since_log += 1;
        self.frame_time_sum += dt;
        self.frame_time_max = self.frame_time_max.max(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed < FPS_LOG_INTERVAL {
            return false;
        }
        log::info!(
            "FPS: {:.0} | avg: {:.2}ms | max: {:.2}ms",
            self.frames_since_log as f64 / elapsed,
            self.frame_time_sum / self.frames_since_log as f64 * 1000.0,
            self.frame_time_max * 1000.0,
        );
        *self = Self::new();
        true
    }
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

fn to_points(size: PhysicalSize<u32>, scale_factor: f64) -> Vec2 {
    let size = size.to_logical::<f32>(scale_factor);
    Vec2::new(size.width, size.height)
}

/// Display ids follow enumeration order, 1-based like yabai's.
fn monitor_in_points(
    index: usize,
    position: PhysicalPosition<i32>,
    size: PhysicalSize<u32>,
    scale_factor: f64,
) -> Monitor {
    let origin = position.to_logical::<f32>(scale_factor);
    Monitor {
        display_id: index as u32 + 1,
        origin: Vec2::new(origin.x, origin.y),
        size: to_points(size, scale_factor),
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    cfg: PetConfig,
    window: Option<Arc<Window>>,
    controller: Option<PetController<Scene>>,
    poller: Option<SnapshotPoller>,

    // Input, sampled once per frame
    clicks: ClickState,
    cursor: Option<Vec2>,
    left_down: bool,

    // Fixed timestep
    last_frame_time: Option<Instant>,
    accumulator: f64,
    sim_time: f64,
    tick_count: u64,

    // Frame timing
    frame_stats: FrameStats,

    // Primary monitor, in logical points. Every host input is converted
    // to points since yabai reports frames that way.
    screen: Vec2,
    scale_factor: f64,
}

impl App {
    fn new(cfg: PetConfig) -> Self {
        Self {
            cfg,
            window: None,
            controller: None,
            poller: None,
            clicks: ClickState::new(),
            cursor: None,
            left_down: false,
            last_frame_time: None,
            accumulator: 0.0,
            sim_time: 0.0,
            tick_count: 0,
            frame_stats: FrameStats::new(),
            screen: Vec2::ZERO,
            scale_factor: 1.0,
        }
    }

    /// Hand the latest background snapshots to the controller.
    fn drain_snapshots(&mut self) {
        let (Some(poller), Some(controller)) = (&self.poller, &mut self.controller) else {
            return;
        };
        if let Some(snapshot) = poller.take_spaces() {
            controller.apply_spaces(snapshot.spaces, snapshot.focused);
        }
        if let Some(windows) = poller.take_windows() {
            controller.apply_windows(windows);
        }
    }

    /// Run fixed-timestep simulation ticks.
    fn run_fixed_update(&mut self, dt: f64) {
        self.accumulator += dt;

        if self.accumulator > MAX_ACCUMULATOR {
            self.accumulator = MAX_ACCUMULATOR;
        }

        // Poll cursor and buttons once per frame (not per tick). The overlay
        // is click-through, so on most hosts it never sees pointer events.
        let pointer = platform::poll_pointer(self.scale_factor, self.screen.y);
        if let Some(cursor) = pointer.cursor {
            self.cursor = Some(cursor);
        }
        if let Some(down) = pointer.left_down {
            self.left_down = down;
        }
        self.clicks.update(self.left_down);
        self.drain_snapshots();

        let screen = self.screen;
        let Some(controller) = self.controller.as_mut() else {
            return;
        };

        if self.clicks.left_clicked && controller.on_click(self.sim_time) {
            log::debug!("Click at {:?}", self.cursor);
        }

        while self.accumulator >= TICK_RATE {
            self.sim_time += TICK_RATE;
            controller.update(self.sim_time, screen, self.cursor);
            controller.scene_mut().tick(TICK_RATE as f32);

            self.accumulator -= TICK_RATE;
            self.tick_count += 1;
        }

        if let Some(poller) = &self.poller {
            poller.set_fast_windows(controller.wants_fast_window_poll());
        }
    }

    fn log_pet_status(&self) {
        if let Some(controller) = &self.controller {
            let t = controller.scene().transform();
            log::info!(
                "Pet: {:?} at ({:.0}, {:.0}) yaw {:.2} scale {:.2}, stamina {:.0}",
                controller.state(),
                t.position.x,
                t.position.y,
                t.yaw,
                t.scale,
                controller.stamina()
            );
        }
    }

    fn spawn_poller(&mut self, window: &Window) {
        #[cfg(windows)]
        let provider = platform::win32::Win32Provider::new(
            platform::win32::get_hwnd(window),
            self.scale_factor,
        );
        #[cfg(not(windows))]
        let provider = {
            let _ = window;
            crate::snapshot::yabai::YabaiProvider::new()
        };

        match SnapshotPoller::spawn(provider, self.cfg.polling) {
            Ok(poller) => self.poller = Some(poller),
            Err(e) => log::warn!("Could not start snapshot poller, windows will be ignored: {e}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        // Borderless always-on-top window covering the primary monitor
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .expect("no monitor found");
        let screen_size = monitor.size();

        let attrs = WindowAttributes::default()
            .with_title("DeskPet")
            .with_decorations(false)
            .with_transparent(true)
            .with_visible(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(screen_size)
            .with_position(winit::dpi::PhysicalPosition::new(0, 0));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .expect("failed to create window"),
        );

        if let Err(e) = window.set_cursor_hittest(false) {
            log::warn!("Could not make overlay click-through: {e}");
        }
        #[cfg(windows)]
        platform::win32::setup_overlay(&window);

        self.scale_factor = window.scale_factor();
        self.screen = to_points(window.inner_size(), self.scale_factor);

        log::info!(
            "Overlay window created: {}x{} pt (scale {:.2}) on {:?}",
            self.screen.x,
            self.screen.y,
            self.scale_factor,
            monitor.name().unwrap_or_default()
        );

        let monitors: Vec<Monitor> = event_loop
            .available_monitors()
            .enumerate()
            .map(|(i, m)| monitor_in_points(i, m.position(), m.size(), m.scale_factor()))
            .collect();

        let mut controller = PetController::new(
            self.cfg.clone(),
            self.screen,
            Scene::new(),
            fastrand::Rng::new(),
        );
        controller.set_monitors(monitors);
        self.controller = Some(controller);

        self.spawn_poller(&window);

        // Continuous game loop
        event_loop.set_control_flow(ControlFlow::Poll);

        window.set_visible(true);
        self.window = Some(window);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Poll ESC key (window is click-through so can't receive keyboard events)
        #[cfg(windows)]
        if platform::win32::is_escape_pressed() {
            log::info!("ESC pressed, exiting");
            event_loop.exit();
            return;
        }
        #[cfg(not(windows))]
        let _ = event_loop;

        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.screen = to_points(new_size, self.scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(w) = &self.window {
                    self.screen = to_points(w.inner_size(), scale_factor);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let p = position.to_logical::<f32>(self.scale_factor);
                self.cursor = Some(Vec2::new(p.x, p.y));
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.left_down = state == ElementState::Pressed;
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if let Some(last) = self.last_frame_time {
                    let dt = now.duration_since(last).as_secs_f64();
                    if self.frame_stats.record_frame(dt) {
                        self.log_pet_status();
                    }
                    self.run_fixed_update(dt);
                }
                self.last_frame_time = Some(now);
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::info!("Shutting down after {} ticks", self.tick_count);
        // Joins the poller thread.
        self.poller = None;
    }
}

/// Entry point: load config, create event loop and run.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = PetConfig::load()?;
    log::info!(
        "Config: scale {:.2}, climbing {}",
        cfg.character_scale,
        if cfg.climbing.enabled { "on" } else { "off" }
    );

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cfg);
    event_loop.run_app(&mut app)?;
    Ok(())
}
