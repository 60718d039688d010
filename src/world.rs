use glam::Vec2;

/// A host window as reported by the snapshot provider.
/// Top-left origin, Y down, local to its display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowRect {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// 0-based virtual desktop the window lives on.
    pub space_index: usize,
    /// Lower is closer to the front.
    pub z_order: i32,
}

/// One virtual desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Space {
    /// 0-based position in the desktop strip.
    pub index: usize,
    pub is_visible: bool,
    pub has_focus: bool,
    pub display_id: u32,
}

/// A physical display in host screen coordinates (top-left, Y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monitor {
    pub display_id: u32,
    pub origin: Vec2,
    pub size: Vec2,
}

impl Monitor {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x < self.origin.x + self.size.x
            && p.y < self.origin.y + self.size.y
    }
}

/// A window rectangle in world space: the flattened desktop strip,
/// bottom-left origin, Y up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldRect {
    pub id: u64,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub z_order: i32,
}

impl WorldRect {
    pub fn from_window(w: &WindowRect, desktop: Vec2) -> Self {
        let left = w.space_index as f32 * desktop.x + w.x;
        Self {
            id: w.id,
            left,
            right: left + w.w,
            bottom: desktop.y - (w.y + w.h),
            top: desktop.y - w.y,
            z_order: w.z_order,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Whether `x` lies over the top edge, allowing `slack` on either side.
    pub fn spans_x(&self, x: f32, slack: f32) -> bool {
        x >= self.left - slack && x <= self.right + slack
    }

    /// Whether a body spanning `[y0, y1]` vertically overlaps this rect.
    pub fn overlaps_y(&self, y0: f32, y1: f32) -> bool {
        y0 < self.top && y1 > self.bottom
    }
}

/// Flatten a raw snapshot into world rects, front-most first.
pub fn to_world_rects(windows: &[WindowRect], desktop: Vec2) -> Vec<WorldRect> {
    let mut rects: Vec<WorldRect> = windows
        .iter()
        .filter(|w| w.w > 0.0 && w.h > 0.0 && w.w.is_finite() && w.h.is_finite())
        .map(|w| WorldRect::from_window(w, desktop))
        .collect();
    rects.sort_by_key(|r| r.z_order);
    rects
}

/// Where the OS cursor points in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorTarget {
    /// World point (Y up).
    pub world: Vec2,
    pub space_index: usize,
    /// False when the cursor was off every known monitor.
    pub on_monitor: bool,
}

/// Desktop layout: how many spaces exist and which one each display shows.
#[derive(Debug, Clone)]
pub struct Topology {
    desktop_size: Vec2,
    spaces: Vec<Space>,
    monitors: Vec<Monitor>,
    active_desktop: usize,
}

impl Topology {
    pub fn new(desktop_size: Vec2) -> Self {
        Self {
            desktop_size,
            spaces: Vec::new(),
            monitors: Vec::new(),
            active_desktop: 0,
        }
    }

    pub fn desktop_size(&self) -> Vec2 {
        self.desktop_size
    }

    pub fn set_desktop_size(&mut self, size: Vec2) {
        self.desktop_size = size;
    }

    pub fn space_count(&self) -> usize {
        self.spaces.len().max(1)
    }

    pub fn world_width(&self) -> f32 {
        self.space_count() as f32 * self.desktop_size.x
    }

    pub fn active_desktop(&self) -> usize {
        self.active_desktop
    }

    pub fn set_monitors(&mut self, monitors: Vec<Monitor>) {
        self.monitors = monitors;
    }

    /// Replace the space list. Returns true when the count changed.
    pub fn set_spaces(&mut self, mut spaces: Vec<Space>, focused: Option<usize>) -> bool {
        let old_count = self.space_count();
        spaces.sort_by_key(|s| s.index);
        spaces.dedup_by_key(|s| s.index);

        let focused = focused
            .or_else(|| spaces.iter().find(|s| s.has_focus).map(|s| s.index))
            .or_else(|| spaces.iter().find(|s| s.is_visible).map(|s| s.index));
        if let Some(index) = focused {
            self.active_desktop = index;
        }

        self.spaces = spaces;
        self.active_desktop = self.active_desktop.min(self.space_count() - 1);
        old_count != self.space_count()
    }

    pub fn visible_space_for_display(&self, display_id: u32) -> Option<usize> {
        self.spaces
            .iter()
            .find(|s| s.display_id == display_id && s.is_visible)
            .map(|s| s.index)
    }

    /// Map a host cursor position onto the desktop strip. Off-monitor
    /// cursors fall back to the active desktop.
    pub fn resolve_cursor(&self, cursor: Vec2) -> CursorTarget {
        let w = self.desktop_size.x.max(1.0);
        let h = self.desktop_size.y;

        match self.monitors.iter().find(|m| m.contains(cursor)) {
            Some(monitor) => {
                let local = cursor - monitor.origin;
                let space_index = self
                    .visible_space_for_display(monitor.display_id)
                    .unwrap_or(self.active_desktop);
                CursorTarget {
                    world: Vec2::new(space_index as f32 * w + local.x, h - local.y),
                    space_index,
                    on_monitor: true,
                }
            }
            None => {
                let local_x = cursor.x.rem_euclid(w);
                let local_y = cursor.y.clamp(0.0, h);
                CursorTarget {
                    world: Vec2::new(self.active_desktop as f32 * w + local_x, h - local_y),
                    space_index: self.active_desktop,
                    on_monitor: false,
                }
            }
        }
    }
}
