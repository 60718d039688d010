use glam::Vec2;

#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(windows)]
pub mod win32;

/// Global pointer state in logical points, top-left origin of the primary
/// monitor. `None` fields mean the host can't be queried outside our window.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerPoll {
    pub cursor: Option<Vec2>,
    pub left_down: Option<bool>,
}

/// Query the OS for the pointer, independent of window focus or hit-testing.
#[cfg(windows)]
pub fn poll_pointer(scale_factor: f64, _primary_height: f32) -> PointerPoll {
    PointerPoll {
        cursor: win32::get_mouse_pos().map(|(x, y)| Vec2::new(x, y) / scale_factor as f32),
        left_down: Some(win32::is_left_button_down()),
    }
}

#[cfg(target_os = "macos")]
pub fn poll_pointer(_scale_factor: f64, primary_height: f32) -> PointerPoll {
    PointerPoll {
        cursor: Some(macos::mouse_location(primary_height)),
        left_down: Some(macos::is_left_button_down()),
    }
}

/// Other hosts fall back to winit window events.
#[cfg(not(any(windows, target_os = "macos")))]
pub fn poll_pointer(_scale_factor: f64, _primary_height: f32) -> PointerPoll {
    PointerPoll::default()
}
