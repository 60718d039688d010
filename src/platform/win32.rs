use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, POINT, RECT, TRUE};
use windows::Win32::Graphics::Dwm::{DwmSetWindowAttribute, DWMWINDOWATTRIBUTE};
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetCursorPos, GetWindowLongPtrW, GetWindowRect, IsIconic, IsWindowVisible,
    SetWindowLongPtrW, SetWindowPos, GWL_EXSTYLE, SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE,
    SWP_NOSIZE, SWP_NOZORDER, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW,
};

use crate::snapshot::{ProviderError, SnapshotProvider};
use crate::world::{Space, WindowRect};

/// Extract the Win32 HWND from a winit window.
pub fn get_hwnd(window: &winit::window::Window) -> Option<HWND> {
    let handle = window.window_handle().ok()?;
    match handle.as_raw() {
        RawWindowHandle::Win32(h) => Some(HWND(h.hwnd.get() as *mut core::ffi::c_void)),
        _ => None,
    }
}

/// Apply overlay window styles: no activation, no taskbar entry, no DWM frame.
pub unsafe fn make_overlay(hwnd: HWND) {
    let style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
    let new_style = style | WS_EX_NOACTIVATE.0 as isize | WS_EX_TOOLWINDOW.0 as isize;
    SetWindowLongPtrW(hwnd, GWL_EXSTYLE, new_style);
    log::debug!("Window ex-style 0x{:08X} -> 0x{:08X}", style, new_style);

    // Make DWM pick up the new styles.
    let _ = SetWindowPos(
        hwnd,
        HWND::default(),
        0,
        0,
        0,
        0,
        SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
    );

    // DWMWA_NCRENDERING_POLICY(2) = DWMNCRP_DISABLED(2)
    set_dwm_u32(hwnd, 2, 2);
    // DWMWA_WINDOW_CORNER_PREFERENCE(33) = DWMWCP_DONOTROUND(1)
    set_dwm_u32(hwnd, 33, 1);
    // DWMWA_BORDER_COLOR(34) = DWMWA_COLOR_NONE
    set_dwm_u32(hwnd, 34, 0xFFFF_FFFE);
}

unsafe fn set_dwm_u32(hwnd: HWND, attribute: i32, value: u32) {
    let _ = DwmSetWindowAttribute(
        hwnd,
        DWMWINDOWATTRIBUTE(attribute),
        &value as *const u32 as *const core::ffi::c_void,
        std::mem::size_of::<u32>() as u32,
    );
}

/// Keep the overlay out of the taskbar and away from focus.
pub fn setup_overlay(window: &winit::window::Window) {
    match get_hwnd(window) {
        Some(hwnd) => unsafe { make_overlay(hwnd) },
        None => log::warn!("No Win32 handle for overlay window"),
    }
    log::info!("Win32 overlay setup complete (toolwindow, no activation)");
}

/// Global cursor position in physical screen pixels.
pub fn get_mouse_pos() -> Option<(f32, f32)> {
    let mut point = POINT::default();
    unsafe { GetCursorPos(&mut point).ok()? };
    Some((point.x as f32, point.y as f32))
}

/// Whether ESC is held, regardless of window focus.
pub fn is_escape_pressed() -> bool {
    // VK_ESCAPE = 0x1B. High bit set = key is currently down.
    unsafe { GetAsyncKeyState(0x1B) & (0x8000u16 as i16) != 0 }
}

/// Left button held, or pressed and released since the last poll.
pub fn is_left_button_down() -> bool {
    // VK_LBUTTON = 0x01. Low bit catches clicks shorter than a frame.
    unsafe {
        let l = GetAsyncKeyState(0x01);
        (l & (0x8000u16 as i16) != 0) || (l & 1 != 0)
    }
}

// ---------------------------------------------------------------------------
// Window enumeration
// ---------------------------------------------------------------------------

/// Visible, non-tool, non-minimized top-level windows in z-order (front
/// first). Excludes our own overlay and zero-area windows.
pub fn enumerate_windows(own_hwnd: HWND) -> Vec<WindowRect> {
    struct EnumState {
        own_hwnd: HWND,
        results: Vec<WindowRect>,
    }

    unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let state = &mut *(lparam.0 as *mut EnumState);

        if hwnd == state.own_hwnd
            || !IsWindowVisible(hwnd).as_bool()
            || IsIconic(hwnd).as_bool()
        {
            return TRUE;
        }

        // Skip tool windows (tooltips, floating toolbars, etc.)
        let ex_style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
        if (ex_style as u32) & WS_EX_TOOLWINDOW.0 != 0 {
            return TRUE;
        }

        let mut rect = RECT::default();
        if GetWindowRect(hwnd, &mut rect).is_err() {
            return TRUE;
        }
        let w = rect.right - rect.left;
        let h = rect.bottom - rect.top;
        if w <= 0 || h <= 0 {
            return TRUE;
        }

        let z_order = state.results.len() as i32;
        state.results.push(WindowRect {
            id: hwnd.0 as usize as u64,
            x: rect.left as f32,
            y: rect.top as f32,
            w: w as f32,
            h: h as f32,
            space_index: 0,
            z_order,
        });
        TRUE
    }

    let mut state = EnumState {
        own_hwnd,
        results: Vec::with_capacity(64),
    };

    unsafe {
        let _ = EnumWindows(
            Some(enum_callback),
            LPARAM(&mut state as *mut EnumState as isize),
        );
    }

    state.results
}

/// Snapshot provider for Windows hosts: one desktop, windows via EnumWindows.
/// Rects are reported in logical points like every other host input.
pub struct Win32Provider {
    /// Our overlay's HWND as an integer so the provider can cross threads.
    own_hwnd: isize,
    scale_factor: f32,
}

impl Win32Provider {
    pub fn new(own_hwnd: Option<HWND>, scale_factor: f64) -> Self {
        Self {
            own_hwnd: own_hwnd.map_or(0, |h| h.0 as isize),
            scale_factor: scale_factor.max(f64::EPSILON) as f32,
        }
    }
}

/// Physical pixels to logical points.
fn to_logical(mut rect: WindowRect, scale_factor: f32) -> WindowRect {
    rect.x /= scale_factor;
    rect.y /= scale_factor;
    rect.w /= scale_factor;
    rect.h /= scale_factor;
    rect
}

impl SnapshotProvider for Win32Provider {
    fn list_spaces(&self) -> Result<Vec<Space>, ProviderError> {
        Ok(vec![Space {
            index: 0,
            is_visible: true,
            has_focus: true,
            display_id: 1,
        }])
    }

    fn list_windows(&self) -> Result<Vec<WindowRect>, ProviderError> {
        let own = HWND(self.own_hwnd as *mut core::ffi::c_void);
        Ok(enumerate_windows(own)
            .into_iter()
            .map(|rect| to_logical(rect, self.scale_factor))
            .collect())
    }
}
