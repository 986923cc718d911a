//! Cooperative cancellation and wall-clock deadlines (spec §5).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A cheaply-cloneable flag checked between worklist iterations and between
/// learner jobs; setting it from any clone is visible to all others.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A wall-clock deadline derived from `Options::timeout_seconds`.
#[derive(Copy, Clone, Debug)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// No deadline at all.
    pub fn never() -> Self {
        Self { at: None }
    }

    pub fn after(duration: Duration) -> Self {
        Self {
            at: Some(Instant::now() + duration),
        }
    }

    pub fn from_seconds(seconds: Option<u64>) -> Self {
        match seconds {
            Some(s) => Self::after(Duration::from_secs(s)),
            None => Self::never(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() > at)
    }

    /// Time remaining, or a generous default when there is no deadline —
    /// used to seed a per-focus MaxSMT query's own timeout.
    pub fn remaining(&self) -> Duration {
        match self.at {
            Some(at) => at.saturating_duration_since(Instant::now()),
            None => Duration::from_secs(3600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_deadline_does_not_expire() {
        assert!(!Deadline::never().is_expired());
    }

    #[test]
    fn zero_duration_deadline_is_immediately_expired() {
        let d = Deadline::after(Duration::from_secs(0));
        std::thread::sleep(Duration::from_millis(1));
        assert!(d.is_expired());
    }

    #[test]
    fn cancellation_token_is_visible_across_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
