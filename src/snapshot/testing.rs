use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{ProviderError, SnapshotProvider};
use crate::world::{Space, WindowRect};

pub fn space(index: usize, focused: bool) -> Space {
    Space {
        index,
        is_visible: focused,
        has_focus: focused,
        display_id: 1,
    }
}

/// Provider fake. Window frames are served in order; the last one
/// repeats once the script runs out.
pub struct ScriptedProvider {
    spaces: Option<Vec<Space>>,
    frames: Mutex<VecDeque<Vec<WindowRect>>>,
    last: Mutex<Vec<WindowRect>>,
    pub window_calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(spaces: Vec<Space>) -> Self {
        Self {
            spaces: Some(spaces),
            frames: Mutex::new(VecDeque::new()),
            last: Mutex::new(Vec::new()),
            window_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every space query fails.
    pub fn broken_spaces() -> Self {
        Self {
            spaces: None,
            ..Self::new(Vec::new())
        }
    }

    pub fn with_frames(self, frames: Vec<Vec<WindowRect>>) -> Self {
        *self.frames.lock().unwrap() = frames.into();
        self
    }
}

impl SnapshotProvider for ScriptedProvider {
    fn list_spaces(&self) -> Result<Vec<Space>, ProviderError> {
        self.spaces.clone().ok_or_else(|| ProviderError::NotInstalled {
            program: "scripted".into(),
        })
    }

    fn list_windows(&self) -> Result<Vec<WindowRect>, ProviderError> {
        self.window_calls.fetch_add(1, Ordering::SeqCst);
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.frames.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }
}
