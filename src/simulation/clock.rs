//! Periodic driver for a running simulation
//!
//! The clock owns a tokio task that ticks a shared target every period. A tick is applied
//! while holding the target's lock, so readers never observe a half-applied tick.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace};

use super::TickSummary;
use crate::config::VsmConfig;

/// Something the clock can drive
pub trait SimulationTarget: Send + 'static {
    /// Enter the running state
    fn begin(&mut self);

    /// Apply one tick; `None` means the target stopped and the clock should exit
    fn tick(&mut self, now_ms: f64) -> Option<TickSummary>;

    /// Leave the running state
    fn end(&mut self);
}

/// Fixed-period tick driver
pub struct SimulationClock<T: SimulationTarget> {
    target: Arc<Mutex<T>>,
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl<T: SimulationTarget> SimulationClock<T> {
    /// Create a stopped clock over a shared target
    pub fn new(target: Arc<Mutex<T>>, period: Duration) -> Self {
        Self {
            target,
            period,
            task: None,
        }
    }

    /// Create a stopped clock ticking at the configured interval
    pub fn from_config(target: Arc<Mutex<T>>, config: &VsmConfig) -> Self {
        Self::new(target, config.tick_interval())
    }

    /// The driven target
    pub fn target(&self) -> &Arc<Mutex<T>> {
        &self.target
    }

    /// Whether the tick task is alive
    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }

    /// Begin the target and spawn the tick task; must be called inside a tokio runtime
    ///
    /// Returns false when already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.target.lock().begin();

        let target = Arc::clone(&self.target);
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let now_ms = chrono::Utc::now().timestamp_millis() as f64;
                let summary = target.lock().tick(now_ms);
                match summary {
                    Some(summary) => trace!(tick = summary.tick, "Clock tick"),
                    None => break,
                }
            }
            debug!("Simulation clock exited");
        }));
        debug!(period_ms = period.as_millis() as u64, "Simulation clock started");
        true
    }

    /// Cancel the tick task and end the target
    ///
    /// Idempotent. After this returns no further tick is applied.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.target.lock().end();
    }
}

impl<T: SimulationTarget> Drop for SimulationClock<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
