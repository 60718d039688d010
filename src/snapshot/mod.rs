pub mod poller;
#[cfg(test)]
pub mod testing;
pub mod yabai;

use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::world::{Space, WindowRect};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{program} is not installed")]
    NotInstalled { program: String },
}

/// Source of the host's desktop layout. Queried off the main thread.
pub trait SnapshotProvider: Send {
    fn list_spaces(&self) -> Result<Vec<Space>, ProviderError>;

    /// Visible windows, front-most first.
    fn list_windows(&self) -> Result<Vec<WindowRect>, ProviderError>;
}

/// Spaces plus the focused one, as applied by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceSnapshot {
    pub spaces: Vec<Space>,
    pub focused: Option<usize>,
}

impl SpaceSnapshot {
    pub fn new(spaces: Vec<Space>) -> Self {
        let focused = spaces.iter().find(|s| s.has_focus).map(|s| s.index);
        Self { spaces, focused }
    }
}

/// Single-slot handoff. A newer value replaces one not yet taken.
pub struct Mailbox<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns whether an untaken value was overwritten.
    pub fn put(&self, value: T) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.replace(value).is_some()
    }

    pub fn take(&self) -> Option<T> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
