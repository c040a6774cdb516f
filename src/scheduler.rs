//! Fixed-period scheduler.
//!
//! The scheduler knows nothing about pages or records. It calls
//! [`Tick::tick`] once per period on a single task, so ticks never overlap,
//! and it absorbs whatever a tick does wrong: an `Err` or a panic is logged
//! and the next period runs as usual.
//!
//! ```text
//! spawn ──► interval.tick() ──► ticker.tick() ──► Ok / Err / panic ──┐
//!              ▲                                                     │
//!              └──────────────────── next period ◄───────────────────┘
//!                       (cancel observed only here)
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, warn};

use crate::error::{Result, WalkError};

/// Work performed once per period.
#[async_trait]
pub trait Tick: Send + Sync + 'static {
    /// Run one tick. Errors are logged by the scheduler and never stop it.
    async fn tick(&self) -> Result<()>;
}

/// Counters reported when the scheduler stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Ticks started.
    pub ticks: u64,
    /// Ticks that returned an error.
    pub failures: u64,
    /// Ticks that panicked.
    pub panics: u64,
}

/// Runs a [`Tick`] at a fixed period.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    period: Duration,
}

impl Scheduler {
    /// Creates a scheduler with the given period.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::InvalidConfig`] if `period` is zero.
    pub fn new(period: Duration) -> Result<Self> {
        if period.is_zero() {
            return Err(WalkError::invalid_config(
                "schedule.period_ms",
                "must be greater than zero",
            ));
        }
        Ok(Self { period })
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking on a new task. The first tick fires immediately.
    ///
    /// Dropping the returned handle cancels the task at the next tick boundary.
    pub fn spawn<T: Tick>(&self, ticker: Arc<T>) -> SchedulerHandle {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(self.period, ticker, cancel_rx));
        SchedulerHandle { cancel_tx, task }
    }
}

/// Handle to a running scheduler task.
#[derive(Debug)]
pub struct SchedulerHandle {
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<SchedulerStats>,
}

impl SchedulerHandle {
    /// Ask the task to stop. A tick in progress runs to completion first.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task to stop.
    pub async fn join(self) -> Result<SchedulerStats> {
        self.task
            .await
            .map_err(|e| WalkError::Other(anyhow::anyhow!("scheduler task failed: {e}")))
    }

    /// Cancel and wait.
    pub async fn shutdown(self) -> Result<SchedulerStats> {
        self.cancel();
        self.join().await
    }
}

async fn run_loop<T: Tick>(
    period: Duration,
    ticker: Arc<T>,
    mut cancel_rx: watch::Receiver<bool>,
) -> SchedulerStats {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stats = SchedulerStats::default();

    loop {
        tokio::select! {
            biased;
            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    break;
                }
                continue;
            }
            _ = interval.tick() => {}
        }

        stats.ticks += 1;
        match AssertUnwindSafe(ticker.tick()).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                stats.failures += 1;
                if e.is_transient() {
                    warn!("Tick error: {}", e);
                } else {
                    error!("Tick error: {}", e);
                }
            }
            Err(panic) => {
                stats.panics += 1;
                warn!("Tick panicked: {}", panic_message(panic.as_ref()));
            }
        }
    }

    debug!(
        "Scheduler stopped after {} ticks ({} failed, {} panicked)",
        stats.ticks, stats.failures, stats.panics
    );
    stats
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
