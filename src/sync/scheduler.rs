//! Background auto-sync timer.
//!
//! A [`Scheduler`] owns at most one timer task. Each tick runs
//! [`SyncEngine::tick`] to completion before the task waits for the next
//! one, so ticks never overlap; a tick that overruns the interval makes the
//! timer skip the missed ticks rather than fire them back to back. A manual
//! sync pass started elsewhere can still run alongside a tick. That overlap
//! is tolerated because every pass is an idempotent upsert/delete.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};

use super::SyncEngine;

/// tokio intervals cannot be zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

struct Timer {
    shutdown: oneshot::Sender<()>,
    interval: Duration,
}

/// Drives the engine's background pass at a fixed interval.
///
/// Must be started from within a tokio runtime. Dropping the scheduler stops
/// its timer.
pub struct Scheduler {
    engine: Arc<SyncEngine>,
    timer: Option<Timer>,
}

impl Scheduler {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self {
            engine,
            timer: None,
        }
    }

    /// Starts a timer that ticks every `interval`, replacing any timer that
    /// is already running. The first tick happens one interval from now.
    pub fn start(&mut self, interval: Duration) {
        self.stop();

        let interval = interval.max(MIN_INTERVAL);
        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
        let engine = Arc::clone(&self.engine);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    // Fires on an explicit stop and when the sender is dropped.
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => engine.tick().await,
                }
            }
            tracing::debug!("Auto-sync timer exited");
        });

        tracing::info!("Auto-sync started, every {:?}", interval);
        self.timer = Some(Timer { shutdown, interval });
    }

    /// Stops the timer if one is running. A tick already in progress runs to
    /// completion; no further ticks start.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            // The task may already be gone if the runtime shut down.
            let _ = timer.shutdown.send(());
            tracing::info!("Auto-sync stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Interval of the running timer, if any.
    pub fn interval(&self) -> Option<Duration> {
        self.timer.as_ref().map(|t| t.interval)
    }

    /// Starts or stops the timer to match an auto-sync toggle.
    pub fn apply(&mut self, enabled: bool, interval: Duration) {
        if enabled {
            self.start(interval);
        } else {
            self.stop();
        }
    }
}
