//! Cancellable fixed-cadence frame loop.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Runs a frame callback on a tokio interval until it returns `Break` or the
/// ticker is stopped.
///
/// Each `start()` mints a fresh token and running flag, so `stop()` followed
/// by `start()` never lets the old task touch the new run's state. The token
/// is handed to the callback so it can re-check cancellation after taking
/// whatever lock it needs.
pub struct FrameTicker {
    interval: Duration,
    running: Arc<AtomicBool>,
    cancel_token: CancellationToken,
}

impl FrameTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: Arc::new(AtomicBool::new(false)),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the loop on the current tokio runtime.
    ///
    /// Does nothing if already running or if called outside a runtime.
    pub fn start<F>(&mut self, mut on_frame: F)
    where
        F: FnMut(&CancellationToken) -> ControlFlow<()> + Send + 'static,
    {
        if self.is_running() {
            tracing::warn!("FrameTicker already running");
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("FrameTicker started outside a tokio runtime, not ticking");
            return;
        };

        let token = CancellationToken::new();
        let running = Arc::new(AtomicBool::new(true));
        self.cancel_token = token.clone();
        self.running = Arc::clone(&running);
        let period = self.interval;

        runtime.spawn(async move {
            tracing::debug!(interval = ?period, "frame ticker started");
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        tracing::debug!("frame ticker cancelled");
                        break;
                    }
                    _ = interval.tick() => {}
                }

                if on_frame(&token).is_break() {
                    tracing::debug!("frame ticker finished");
                    break;
                }
            }

            running.store(false, Ordering::Release);
        });
    }

    /// Cancel the loop. Safe to call when not running.
    pub fn stop(&mut self) {
        self.cancel_token.cancel();
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
