//! Periodic refresh for the live timer display.
//!
//! The ticker only drives a callback; it never reads or writes storage.
//! It ends on its own once the callback reports that nothing is running,
//! and dropping it cancels the underlying task.

use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Default refresh cadence.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Call `on_tick` every `period`, starting one period from now, until it
    /// returns `false`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if !on_tick() {
                    debug!("no running timer; ticker stopped");
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait until the ticker stops by itself.
    ///
    /// # Errors
    ///
    /// Returns the task's [`JoinError`] when the tick callback panicked.
    pub async fn finished(mut self) -> Result<(), JoinError> {
        (&mut self.handle).await.inspect_err(|e| {
            warn!(error = %e, "ticker task failed");
        })
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
