//! Periodic status logging
//!
//! The reporter only reads the counters, so a stalled or crashed reporter has
//! no effect on running sessions.

use crate::counters::{CounterSnapshot, SessionCounters};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Remembers the last snapshot so that only changes are logged at `info`
#[derive(Debug, Default)]
pub struct StatusReporter {
    last: Option<CounterSnapshot>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `snapshot` and returns true if it differs from the previous one
    pub fn observe(&mut self, snapshot: CounterSnapshot) -> bool {
        let changed = self.last != Some(snapshot);
        if changed {
            info!(
                "Active sessions: {}, total sessions started: {}",
                snapshot.active_sessions, snapshot.total_sessions_started
            );
        } else {
            debug!(
                "Active sessions: {}, total sessions started: {}",
                snapshot.active_sessions, snapshot.total_sessions_started
            );
        }
        self.last = Some(snapshot);
        changed
    }
}

pub fn spawn_status_reporter(counters: Arc<SessionCounters>, period: Duration) -> JoinHandle<()> {
    let period = period.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut reporter = StatusReporter::new();

        loop {
            interval.tick().await;
            reporter.observe(counters.snapshot());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_only_changes() {
        let counters = Arc::new(SessionCounters::new());
        let mut reporter = StatusReporter::new();

        assert!(reporter.observe(counters.snapshot()));
        assert!(!reporter.observe(counters.snapshot()));

        let guard = counters.session_started();
        assert!(reporter.observe(counters.snapshot()));
        assert!(!reporter.observe(counters.snapshot()));

        drop(guard);
        assert!(reporter.observe(counters.snapshot()));
    }

    #[tokio::test]
    async fn test_reporter_task_keeps_running() {
        let counters = Arc::new(SessionCounters::new());
        let handle = spawn_status_reporter(Arc::clone(&counters), Duration::ZERO);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
