use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;

use super::{ProviderError, SnapshotProvider};
use crate::world::{Space, WindowRect};

#[derive(Debug, Clone, Copy, Deserialize)]
struct Frame {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
}

#[derive(Debug, Deserialize)]
struct YabaiSpace {
    /// 1-based.
    index: usize,
    display: u32,
    #[serde(rename = "has-focus", default)]
    has_focus: bool,
    #[serde(rename = "is-visible", default)]
    is_visible: bool,
}

#[derive(Debug, Deserialize)]
struct YabaiWindow {
    id: u64,
    #[serde(default)]
    pid: u32,
    frame: Frame,
    /// 1-based.
    space: usize,
    display: u32,
    #[serde(rename = "is-minimized", default)]
    is_minimized: bool,
    #[serde(rename = "is-hidden", default)]
    is_hidden: bool,
}

#[derive(Debug, Deserialize)]
struct YabaiDisplay {
    index: u32,
    frame: Frame,
}

pub fn parse_spaces(json: &[u8]) -> Result<Vec<Space>, ProviderError> {
    let raw: Vec<YabaiSpace> = serde_json::from_slice(json)?;
    Ok(raw
        .into_iter()
        .filter(|s| s.index > 0)
        .map(|s| Space {
            index: s.index - 1,
            is_visible: s.is_visible,
            has_focus: s.has_focus,
            display_id: s.display,
        })
        .collect())
}

/// Windows in display-local coordinates, in yabai's order (front first).
/// Minimized and hidden windows and those owned by `own_pid` are skipped.
pub fn parse_windows(
    windows_json: &[u8],
    displays_json: &[u8],
    own_pid: u32,
) -> Result<Vec<WindowRect>, ProviderError> {
    let windows: Vec<YabaiWindow> = serde_json::from_slice(windows_json)?;
    let displays: Vec<YabaiDisplay> = serde_json::from_slice(displays_json)?;

    Ok(windows
        .into_iter()
        .filter(|w| !w.is_minimized && !w.is_hidden && w.pid != own_pid && w.space > 0)
        .enumerate()
        .map(|(z, w)| {
            let origin = displays
                .iter()
                .find(|d| d.index == w.display)
                .map_or((0.0, 0.0), |d| (d.frame.x, d.frame.y));
            WindowRect {
                id: w.id,
                x: w.frame.x - origin.0,
                y: w.frame.y - origin.1,
                w: w.frame.w,
                h: w.frame.h,
                space_index: w.space - 1,
                z_order: z as i32,
            }
        })
        .collect())
}

/// Reads spaces and windows from the yabai window manager's query CLI.
pub struct YabaiProvider {
    program: PathBuf,
    own_pid: u32,
}

impl YabaiProvider {
    pub fn new() -> Self {
        Self::with_program("yabai")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            own_pid: std::process::id(),
        }
    }

    fn query(&self, domain: &str) -> Result<Vec<u8>, ProviderError> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .args(["-m", "query", domain])
            .output()
            .map_err(|source| match source.kind() {
                std::io::ErrorKind::NotFound => ProviderError::NotInstalled {
                    program: program.clone(),
                },
                _ => ProviderError::Spawn {
                    program: program.clone(),
                    source,
                },
            })?;
        if !output.status.success() {
            return Err(ProviderError::Exit {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

impl Default for YabaiProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotProvider for YabaiProvider {
    fn list_spaces(&self) -> Result<Vec<Space>, ProviderError> {
        parse_spaces(&self.query("--spaces")?)
    }

    fn list_windows(&self) -> Result<Vec<WindowRect>, ProviderError> {
        let windows = self.query("--windows")?;
        let displays = self.query("--displays")?;
        parse_windows(&windows, &displays, self.own_pid)
    }
}
