//! Handler seam between queue plumbing and notification consumers

use async_trait::async_trait;
use std::time::Duration;

use crate::events::ObjectEvent;

/// Per-batch tally. Record failures never abort the rest of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// A consumer of object store write notifications.
///
/// Implementations log and count per-record failures instead of returning them;
/// the dispatcher acknowledges a message once its batch has been handled.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Upper bound on one `handle_notification` call, if the handler enforces one.
    fn invocation_budget(&self) -> Option<Duration> {
        None
    }

    async fn handle_notification(&self, events: &[ObjectEvent]) -> BatchReport;
}
