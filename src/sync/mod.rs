pub mod rate_limit;
pub mod syncer;
pub mod transform;
pub mod window;

use std::time::Duration;

use serde::Serialize;

/// Options controlling a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// How far back a backfill reaches, in days.
    pub backfill_days: u32,
    /// How far back a recent refresh reaches, in hours.
    pub refresh_hours: u32,
    /// Wall-clock pause between polling ticks in watch mode.
    pub poll_interval: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            backfill_days: 730,
            refresh_hours: 24,
            poll_interval: Duration::from_secs(300),
        }
    }
}

/// Report returned after a sync run completes.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub label: String,
    pub status: SyncStatus,
    /// Identifiers the listing stage discovered.
    pub orders_found: u64,
    /// Full records the detail stage fetched.
    pub orders_fetched: u64,
    pub orders_new: u64,
    pub orders_updated: u64,
    pub status_changes: u64,
    pub orders_failed: u64,
    pub batches_completed: u32,
    pub batches_total: u32,
    pub error: Option<String>,
}

impl SyncReport {
    /// Create a SyncReport with the appropriate status derived from counts.
    #[allow(clippy::too_many_arguments)]
    pub fn from_counts(
        label: String,
        orders_found: u64,
        orders_fetched: u64,
        orders_new: u64,
        orders_updated: u64,
        status_changes: u64,
        orders_failed: u64,
        batches_completed: u32,
        batches_total: u32,
    ) -> Self {
        let status = if orders_failed == 0 && batches_completed == batches_total {
            SyncStatus::Success
        } else if orders_fetched > 0 && orders_failed < orders_fetched {
            SyncStatus::PartialFailure
        } else {
            SyncStatus::Failed
        };
        let mut problems = Vec::new();
        if batches_completed < batches_total {
            problems.push(format!(
                "{} detail batches failed",
                batches_total - batches_completed
            ));
        }
        if orders_failed > 0 {
            problems.push(format!("{orders_failed} orders failed to persist"));
        }
        let error = if problems.is_empty() {
            None
        } else {
            Some(problems.join("; "))
        };
        Self {
            label,
            status,
            orders_found,
            orders_fetched,
            orders_new,
            orders_updated,
            status_changes,
            orders_failed,
            batches_completed,
            batches_total,
            error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SyncStatus {
    Success,
    PartialFailure,
    Failed,
}

/// How one incoming order relates to what the mirror already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    New,
    StatusChanged { old: String, new: String },
    Updated,
}

/// Observer for long-running sync operations.
pub trait SyncProgress: Send + Sync {
    fn on_run_start(&self, _label: &str) {}
    fn on_window_listed(&self, _window: &str, _count: usize) {}
    fn on_orders_found(&self, _total: usize) {}
    fn on_batch_fetched(&self, _completed: u32, _total: u32, _records: usize) {}
    fn on_run_complete(&self, _report: &SyncReport) {}
}

/// Progress sink that reports nothing.
pub struct NoopProgress;

impl SyncProgress for NoopProgress {}
