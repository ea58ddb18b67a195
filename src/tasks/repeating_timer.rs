//! Repeating timer background task
//!
//! A [`RepeatingTimer`] owns one spawned task that sleeps on a fixed period
//! grid and invokes a single callback at every fire. Start and stop only flip
//! a watch flag, so the task keeps its place on the grid while suspended.

use std::time::Duration;
use tokio::{
    runtime::Handle,
    sync::watch,
    task::JoinHandle,
    time::{sleep_until, Instant},
};
use tracing::debug;

use crate::error::{CountdownError, Result};

/// Slack allowed when deciding whether a deadline was missed while stopped
pub const SCHEDULING_LEEWAY: Duration = Duration::from_millis(10);

/// Periodic fire source driven by a countdown controller
pub trait TickSource {
    /// Begin firing. Idempotent while already running.
    fn start(&mut self) -> Result<()>;
    /// Suspend firing. Idempotent while already stopped.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Interval timer that fires one callback on a tokio runtime.
///
/// The first fire comes one interval after the first `start()`. A stopped
/// timer resumes on the same period grid rather than restarting its phase.
/// Dropping the timer cancels it.
#[derive(Debug)]
pub struct RepeatingTimer {
    interval: Duration,
    running_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl RepeatingTimer {
    /// Create a stopped timer whose callback runs on `queue`
    pub fn new<F>(interval: Duration, queue: &Handle, on_fire: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        if interval.is_zero() {
            return Err(CountdownError::InvalidInterval(interval));
        }

        let (running_tx, running_rx) = watch::channel(false);
        let task = queue.spawn(fire_loop(interval, running_rx, on_fire));
        debug!("Created repeating timer with interval {:?}", interval);

        Ok(Self {
            interval,
            running_tx,
            task: Some(task),
        })
    }

    /// Period between fires
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether `cancel()` has run
    pub fn is_cancelled(&self) -> bool {
        self.task.is_none()
    }

    /// Arm the timer. Fails once the timer has been cancelled.
    pub fn start(&mut self) -> Result<()> {
        if self.is_cancelled() {
            return Err(CountdownError::transition("start the timer", "cancelled"));
        }
        if self.running_tx.send_if_modified(|running| !std::mem::replace(running, true)) {
            debug!("Repeating timer started");
        }
        Ok(())
    }

    /// Suspend firing without losing the period grid
    pub fn stop(&mut self) {
        if self.running_tx.send_if_modified(|running| std::mem::replace(running, false)) {
            debug!("Repeating timer stopped");
        }
    }

    /// Whether the timer is armed
    pub fn is_running(&self) -> bool {
        !self.is_cancelled() && *self.running_tx.borrow()
    }

    /// Permanently disable the timer.
    ///
    /// A fire that is already executing is not interrupted.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            self.running_tx.send_replace(false);
            task.abort();
            debug!("Repeating timer cancelled");
        }
    }
}

impl TickSource for RepeatingTimer {
    fn start(&mut self) -> Result<()> {
        RepeatingTimer::start(self)
    }

    fn stop(&mut self) {
        RepeatingTimer::stop(self)
    }

    fn is_running(&self) -> bool {
        RepeatingTimer::is_running(self)
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn fire_loop<F>(period: Duration, mut running_rx: watch::Receiver<bool>, mut on_fire: F)
where
    F: FnMut(),
{
    let mut next_fire: Option<Instant> = None;

    loop {
        let armed = *running_rx.borrow_and_update();
        if !armed {
            if running_rx.changed().await.is_err() {
                return;
            }
            continue;
        }

        let now = Instant::now();
        let deadline = match next_fire {
            None => now + period,
            Some(deadline) => resume_deadline(deadline, period, now),
        };
        next_fire = Some(deadline);

        tokio::select! {
            biased;

            changed = running_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            _ = sleep_until(deadline) => {
                on_fire();
                next_fire = Some(deadline + period);
            }
        }
    }
}

/// Next deadline on the period grid that has not already been missed
fn resume_deadline(deadline: Instant, period: Duration, now: Instant) -> Instant {
    if now <= deadline + SCHEDULING_LEEWAY {
        return deadline;
    }
    let behind = (now - deadline).as_nanos();
    let skipped = behind / period.as_nanos() + 1;
    deadline + Duration::from_nanos((period.as_nanos() * skipped) as u64)
}
