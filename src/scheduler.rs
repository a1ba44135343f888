//! Tokio-backed [`Scheduler`] for native embedders and tests.

use std::time::Duration;

use futures::future::LocalBoxFuture;
use futures::FutureExt;

use crate::host::Scheduler;

/// Nominal frame interval (60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy)]
pub struct TokioScheduler {
    frame_interval: Duration,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self {
            frame_interval: FRAME_INTERVAL,
        }
    }

    pub fn with_frame_interval(frame_interval: Duration) -> Self {
        Self { frame_interval }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn next_frame(&self) -> LocalBoxFuture<'static, ()> {
        tokio::time::sleep(self.frame_interval).boxed_local()
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        tokio::time::sleep(duration).boxed_local()
    }
}
