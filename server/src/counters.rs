//! Aggregate session counters
//!
//! Only the accept loop increments and only `SessionGuard` decrements, so the
//! counters stay exact even when a session task panics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct SessionCounters {
    active: AtomicUsize,
    total: AtomicUsize,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub active_sessions: usize,
    pub total_sessions_started: usize,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn total_sessions_started(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            active_sessions: self.active_sessions(),
            total_sessions_started: self.total_sessions_started(),
        }
    }

    /// Counts a new session; it stays active until the guard is dropped
    pub fn session_started(self: &Arc<Self>) -> SessionGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        SessionGuard {
            counters: Arc::clone(self),
        }
    }
}

#[derive(Debug)]
pub struct SessionGuard {
    counters: Arc<SessionCounters>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.counters.active.fetch_sub(1, Ordering::SeqCst);
    }
}
