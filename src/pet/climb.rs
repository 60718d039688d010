use crate::pet::physics::ClimbState;
use crate::pet::Facing;
use crate::world::WorldRect;

/// A climb up one vertical window edge. Lives only while the pet is
/// `Climbing`.
#[derive(Debug, Clone)]
pub struct ClimbSession {
    pub window_id: u64,
    /// Latest known rect of the window being climbed.
    pub support_window: WorldRect,
    /// Direction the pet faces the wall. Right means it climbs the left edge.
    pub side: Facing,
    /// Anchor X the sway oscillates around.
    pub base_x: f32,
    /// Height the climb started from.
    pub base_y: f32,
    pub climbed_height: f32,
    pub total_height: f32,
    pub climb_state: ClimbState,
    pub time_climbing: f32,
    /// Last signed climb speed, used for stamina drain.
    pub speed: f32,
    /// Sub-state transitions are held until this time.
    pub state_deadline: Option<f64>,
}

impl ClimbSession {
    pub fn begin(window: WorldRect, side: Facing, body_half_width: f32, base_y: f32) -> Self {
        let mut session = Self {
            window_id: window.id,
            support_window: window,
            side,
            base_x: 0.0,
            base_y,
            climbed_height: 0.0,
            total_height: 0.0,
            climb_state: ClimbState::Starting,
            time_climbing: 0.0,
            speed: 0.0,
            state_deadline: None,
        };
        session.anchor_to(window, body_half_width);
        session
    }

    /// Re-derive the anchor from the window's latest rect.
    pub fn anchor_to(&mut self, window: WorldRect, body_half_width: f32) {
        self.support_window = window;
        self.base_x = match self.side {
            Facing::Right => window.left - body_half_width,
            Facing::Left => window.right + body_half_width,
        };
        self.total_height = (window.top - self.base_y).max(0.0);
    }

    /// Shift with a dragged window.
    pub fn ride(&mut self, dx: f32, dy: f32) {
        self.base_x += dx;
        self.base_y += dy;
    }

    pub fn progress(&self) -> f32 {
        if self.total_height <= 0.0 {
            1.0
        } else {
            (self.climbed_height / self.total_height).clamp(0.0, 1.0)
        }
    }

    pub fn current_y(&self) -> f32 {
        self.base_y + self.climbed_height
    }

    pub fn enter(&mut self, state: ClimbState, deadline: Option<f64>) {
        self.climb_state = state;
        self.state_deadline = deadline;
    }

    pub fn deadline_passed(&self, time: f64) -> bool {
        self.state_deadline.map_or(true, |at| time >= at)
    }

    pub fn is_complete(&self) -> bool {
        self.climb_state == ClimbState::PullingUp && self.climbed_height >= self.total_height
    }
}
