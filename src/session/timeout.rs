// ABOUTME: Watchdog that tears the session down after a fixed duration.
// ABOUTME: Claims the outcome cell before signalling, so a finished session is never touched.

use super::outcome::{ExitOutcome, OutcomeCell};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// An armed (or idle) timeout. Dropping it disarms the timer.
pub struct TimeoutGuard {
    task: Option<JoinHandle<()>>,
    fired: watch::Receiver<bool>,
}

impl TimeoutGuard {
    /// Start the timer. `None` or a zero duration leaves the guard idle.
    pub fn arm(duration: Option<Duration>, outcome: Arc<OutcomeCell>) -> Self {
        let (fire, fired) = watch::channel(false);
        let task = duration.filter(|d| !d.is_zero()).map(|duration| {
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                if !outcome.decide(ExitOutcome::TimedOut) {
                    return;
                }
                tracing::debug!("timeout of {:?} reached, terminating session", duration);
                let _ = fire.send(true);
            })
        });
        Self { task, fired }
    }

    pub fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Resolves once the timer has fired and claimed the outcome; never resolves otherwise.
    pub async fn expired(&mut self) {
        let fired = self.fired.wait_for(|fired| *fired).await.is_ok();
        if !fired {
            // idle, disarmed, or lost the race to completion
            std::future::pending::<()>().await;
        }
    }

    pub fn disarm(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TimeoutGuard {
    fn drop(&mut self) {
        self.abort();
    }
}
