//! Failure counting and escalation
//!
//! Every refused enqueue and every failed bus transaction is reported to an
//! [`ErrorTracker`]. Failures up to the configured threshold are absorbed;
//! the first one past it escalates, and the driver then empties its queue and
//! enters [`State::Error`](crate::State::Error) until the recovery time has
//! passed.
//!
//! ```
//! use serlcd::recovery::{ErrorTracker, Failure, Verdict};
//!
//! let mut tracker = ErrorTracker::new();
//! // threshold 1: the first failure is absorbed, the second escalates
//! assert_eq!(tracker.record(Failure::Transaction, 1, 10), Verdict::Absorbed);
//! assert_eq!(tracker.record(Failure::QueueFull, 1, 20), Verdict::Escalate);
//! assert_eq!(tracker.count(), 2);
//! assert_eq!(tracker.last_failure(), Some((Failure::QueueFull, 20)));
//! ```

/// Kind of failure fed to the tracker
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    /// A command was offered while the queue had no free slot
    QueueFull,
    /// The bus transport reported a failed transaction
    Transaction,
}

impl Failure {
    /// Short name for log output
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueueFull => "queue full",
            Self::Transaction => "transaction failed",
        }
    }
}

/// Outcome of recording a failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Counter is at or below the threshold; carry on
    Absorbed,
    /// Counter passed the threshold; reset and enter the error state
    Escalate,
}

/// Counter of failures since the last reinitialization
///
/// A successful send does not clear it; only [`reset`](Self::reset) does.
#[derive(Clone, Copy, Debug, Default)]
pub struct ErrorTracker {
    count: u8,
    last: Option<(Failure, u32)>,
}

impl ErrorTracker {
    /// Create a tracker with no failures recorded
    pub const fn new() -> Self {
        Self {
            count: 0,
            last: None,
        }
    }

    /// Record a failure at `now_ms` and decide whether to escalate
    ///
    /// Escalates when the counter strictly exceeds `threshold`.
    pub fn record(&mut self, failure: Failure, threshold: u8, now_ms: u32) -> Verdict {
        self.count = self.count.saturating_add(1);
        self.last = Some((failure, now_ms));
        if self.count > threshold {
            Verdict::Escalate
        } else {
            Verdict::Absorbed
        }
    }

    /// Failures recorded since the last reset
    pub const fn count(&self) -> u8 {
        self.count
    }

    /// Most recent failure and when it happened
    pub const fn last_failure(&self) -> Option<(Failure, u32)> {
        self.last
    }

    /// Re-arm the counter
    pub fn reset(&mut self) {
        self.count = 0;
    }
}
