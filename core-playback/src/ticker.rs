//! # Progress Ticker
//!
//! Fixed-cadence driver that calls [`ProgressSource::tick`] until cancelled.
//! The cadence is independent of any UI frame loop; observers receive
//! progress through the event bus.

use crate::controller::PlaybackController;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Something that advances on every cadence tick.
pub trait ProgressSource: Send + Sync {
    /// Returns the progress percent while playing.
    fn tick(&self) -> Option<f64>;
}

impl ProgressSource for Mutex<PlaybackController> {
    fn tick(&self) -> Option<f64> {
        self.lock().tick()
    }
}

/// Drives a [`ProgressSource`] at a fixed interval.
#[derive(Debug, Clone)]
pub struct ProgressTicker {
    interval: Duration,
    cancel: CancellationToken,
}

impl ProgressTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            cancel: CancellationToken::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Token that stops the loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Tick `source` until cancelled.
    pub async fn run(&self, source: Arc<dyn ProgressSource>) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!(interval_ms = self.interval.as_millis() as u64, "Progress ticker started");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = interval.tick() => {
                    source.tick();
                }
            }
        }

        debug!("Progress ticker stopped");
    }

    /// Run on the current tokio runtime.
    pub fn spawn(&self, source: Arc<dyn ProgressSource>) -> JoinHandle<()> {
        let ticker = self.clone();
        tokio::spawn(async move { ticker.run(source).await })
    }
}
