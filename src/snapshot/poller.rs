use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use instant::Instant;

use super::{Mailbox, ProviderError, SnapshotProvider, SpaceSnapshot};
use crate::config::PollingConfig;
use crate::world::WindowRect;

/// Upper bound on one sleep so stop and cadence changes are seen promptly.
const MAX_SLEEP: Duration = Duration::from_millis(50);

/// Background thread that polls a `SnapshotProvider` and leaves the
/// newest results in two mailboxes for the main thread to drain.
pub struct SnapshotPoller {
    spaces: Mailbox<SpaceSnapshot>,
    windows: Mailbox<Vec<WindowRect>>,
    fast: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SnapshotPoller {
    pub fn spawn<P>(provider: P, cfg: PollingConfig) -> std::io::Result<Self>
    where
        P: SnapshotProvider + 'static,
    {
        let spaces = Mailbox::new();
        let windows = Mailbox::new();
        let fast = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));

        let worker = Worker {
            provider,
            cfg,
            spaces: spaces.clone(),
            windows: windows.clone(),
            fast: Arc::clone(&fast),
            stop: Arc::clone(&stop),
            failing: false,
        };
        let handle = std::thread::Builder::new()
            .name("snapshot-poller".into())
            .spawn(move || worker.run())?;

        log::info!(
            "Snapshot poller started (spaces every {:.2}s, windows every {:.2}s/{:.2}s)",
            cfg.space_interval,
            cfg.window_interval,
            cfg.idle_window_interval
        );
        Ok(Self {
            spaces,
            windows,
            fast,
            stop,
            handle: Some(handle),
        })
    }

    /// Switch window polling to the fast cadence.
    pub fn set_fast_windows(&self, fast: bool) {
        self.fast.store(fast, Ordering::Relaxed);
    }

    pub fn take_spaces(&self) -> Option<SpaceSnapshot> {
        self.spaces.take()
    }

    pub fn take_windows(&self) -> Option<Vec<WindowRect>> {
        self.windows.take()
    }
}

impl Drop for SnapshotPoller {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Snapshot poller panicked");
            }
        }
    }
}

struct Worker<P> {
    provider: P,
    cfg: PollingConfig,
    spaces: Mailbox<SpaceSnapshot>,
    windows: Mailbox<Vec<WindowRect>>,
    fast: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    /// Only the first failure in a streak is logged as a warning.
    failing: bool,
}

impl<P: SnapshotProvider> Worker<P> {
    fn run(mut self) {
        let mut next_spaces = Instant::now();
        let mut next_windows = Instant::now();

        while !self.stop.load(Ordering::Relaxed) {
            let now = Instant::now();

            if now >= next_spaces {
                let result = self.provider.list_spaces();
                if let Some(spaces) = self.check(result) {
                    self.spaces.put(SpaceSnapshot::new(spaces));
                }
                next_spaces = now + secs(self.cfg.space_interval);
            }

            if now >= next_windows {
                let result = self.provider.list_windows();
                if let Some(windows) = self.check(result) {
                    self.windows.put(windows);
                }
                next_windows = now + self.window_interval();
            }

            // A switch to fast polling pulls the next window poll forward.
            next_windows = next_windows.min(now + self.window_interval());

            let wake = next_spaces.min(next_windows);
            let nap = wake.saturating_duration_since(Instant::now()).min(MAX_SLEEP);
            if !nap.is_zero() {
                std::thread::sleep(nap);
            }
        }
        log::debug!("Snapshot poller stopped");
    }

    fn window_interval(&self) -> Duration {
        if self.fast.load(Ordering::Relaxed) {
            secs(self.cfg.window_interval)
        } else {
            secs(self.cfg.idle_window_interval)
        }
    }

    fn check<T>(&mut self, result: Result<T, ProviderError>) -> Option<T> {
        match result {
            Ok(value) => {
                if self.failing {
                    log::info!("Snapshot provider recovered");
                    self.failing = false;
                }
                Some(value)
            }
            Err(e) => {
                if self.failing {
                    log::debug!("Snapshot query failed again: {e}");
                } else {
                    log::warn!("Snapshot query failed, keeping last snapshot: {e}");
                    self.failing = true;
                }
                None
            }
        }
    }
}

fn secs(s: f32) -> Duration {
    Duration::from_secs_f32(s.max(0.001))
}
