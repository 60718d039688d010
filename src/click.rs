/// Edge-detects left clicks from polled button state.
#[derive(Debug, Default)]
pub struct ClickState {
    left_was_down: bool,
    /// Set for one frame when a left click is detected.
    pub left_clicked: bool,
}

impl ClickState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update from raw button polling. Call once per frame.
    pub fn update(&mut self, left_down: bool) {
        // Press, not hold
        self.left_clicked = left_down && !self.left_was_down;
        self.left_was_down = left_down;
    }
}
