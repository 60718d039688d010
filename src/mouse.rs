use glam::Vec2;

use crate::util::ring::RingBuffer;

/// Samples kept for velocity estimation.
pub const HISTORY_CAPACITY: usize = 10;
/// Samples in the velocity window.
const VELOCITY_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
pub struct MouseSample {
    pub position: Vec2,
    pub time: f64,
}

/// Recent world-space cursor positions.
pub struct MouseHistory {
    samples: RingBuffer<MouseSample>,
}

impl MouseHistory {
    pub fn new() -> Self {
        Self {
            samples: RingBuffer::new(HISTORY_CAPACITY),
        }
    }

    pub fn push(&mut self, position: Vec2, time: f64) {
        self.samples.push(MouseSample { position, time });
    }

    pub fn latest(&self) -> Option<MouseSample> {
        self.samples.latest().copied()
    }

    /// Cursor speed (px/s) across the last three samples. Zero until two
    /// samples with distinct timestamps exist.
    pub fn speed(&self) -> f32 {
        let mut window = self.samples.newest(VELOCITY_WINDOW);
        let Some(first) = window.next().copied() else {
            return 0.0;
        };
        let Some(last) = window.last().copied() else {
            return 0.0;
        };
        let elapsed = (last.time - first.time) as f32;
        if elapsed <= f32::EPSILON {
            return 0.0;
        }
        (last.position - first.position).length() / elapsed
    }
}
