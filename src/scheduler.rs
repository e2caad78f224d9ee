use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;
use tracing::debug;

/// Operation driven by the scheduler. Returns a boxed future so callers can
/// capture whatever state they need per tick.
pub type TickFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Fires a swappable async operation once per period.
///
/// The timer task re-reads the operation slot on every tick, so a caller may
/// swap the operation between ticks without restarting the timer and the
/// next tick runs the newest version. Ticks are wall-clock driven: a slow
/// invocation is not awaited before the next tick fires, and overlapping
/// invocations are not fenced.
pub struct IntervalScheduler {
    name: String,
    period: Duration,
    op: Arc<Mutex<Option<TickFn>>>,
    handle: Option<JoinHandle<()>>,
    state: SchedulerState,
}

impl IntervalScheduler {
    pub fn new(name: impl Into<String>, period: Duration) -> Self {
        IntervalScheduler {
            name: name.into(),
            period,
            op: Arc::new(Mutex::new(None)),
            handle: None,
            state: SchedulerState::Stopped,
        }
    }

    /// Install or replace the scheduled operation. Takes effect on the next
    /// tick; the running timer is not restarted.
    pub fn set_operation(&self, op: TickFn) {
        *self.op.lock().unwrap() = Some(op);
    }

    /// Begin ticking. No-op if already running. The first tick fires one
    /// full period from now, never at t=0.
    pub fn start(&mut self) {
        if self.state == SchedulerState::Running {
            return;
        }
        debug!("Scheduler '{}' started (period={:?})", self.name, self.period);

        let op = Arc::clone(&self.op);
        let period = self.period;
        // Anchor the first tick to the moment start() is called, not to the
        // spawned task's first poll, so the period is measured "from now" as
        // documented even if the task is polled late.
        let start = tokio::time::Instant::now() + period;
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let current = op.lock().unwrap().clone();
                if let Some(f) = current {
                    // Spawned, not awaited: the tick cadence must not stall
                    // behind a slow operation, and a panicking operation must
                    // not kill the timer.
                    tokio::spawn(f());
                }
            }
        }));
        self.state = SchedulerState::Running;
    }

    /// Cancel the timer. No-op if not running. No tick fires after this
    /// returns; restarting later begins a fresh period with no catch-up.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Scheduler '{}' stopped", self.name);
        }
        self.state = SchedulerState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
