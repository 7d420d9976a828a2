//! Background task that periodically sweeps expired sessions.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::manager::SessionManager;
use crate::store::SessionStore;

/// Shortest sweep interval accepted; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Longest sweep interval accepted (about 30 years). Keeps tick deadlines
/// representable as an `Instant`.
const MAX_INTERVAL: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Handle to a running reaper task.
///
/// Dropping the handle stops the reaper.
#[derive(Debug)]
pub struct ReaperHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ReaperHandle {
    /// Signal the reaper to stop. Returns immediately.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stop the reaper and wait for the task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "Session reaper task failed");
        }
    }
}

impl Drop for ReaperHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub(crate) fn spawn<S>(manager: SessionManager<S>, interval: Duration, ttl: Duration) -> ReaperHandle
where
    S: SessionStore + 'static,
{
    let interval = interval.clamp(MIN_INTERVAL, MAX_INTERVAL);
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs_f64(),
            ttl_secs = ttl.as_secs_f64(),
            "Session reaper started"
        );

        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = manager.cleanup_with_ttl(ttl).await;
                    debug!(removed, "Session reaper sweep finished");
                }
            }
        }

        info!("Session reaper stopped");
    });

    ReaperHandle {
        cancel,
        task: Some(task),
    }
}
