use glam::Vec2;
use objc2_app_kit::NSEvent;

/// Cursor in points, flipped from AppKit's bottom-left origin to top-left
/// of the primary screen.
pub fn mouse_location(primary_height: f32) -> Vec2 {
    let p = unsafe { NSEvent::mouseLocation() };
    Vec2::new(p.x as f32, primary_height - p.y as f32)
}

pub fn is_left_button_down() -> bool {
    // Bit 0 is the primary button.
    unsafe { NSEvent::pressedMouseButtons() & 1 != 0 }
}

