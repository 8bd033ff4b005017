//! Pacing between upstream calls.
//!
//! The platform throttles per-shop call rates. A fixed pause between
//! consecutive pages, detail batches, and backfill windows keeps a full
//! two-year backfill under the limit. Calls that fail anyway are
//! dropped and picked up by a later run, never retried in place.

use std::time::Duration;

/// Pause between consecutive get_order_list pages.
pub const PAGE_DELAY: Duration = Duration::from_millis(300);

/// Pause between consecutive get_order_detail batches.
pub const BATCH_DELAY: Duration = Duration::from_millis(300);

/// Pause between backfill windows.
pub const WINDOW_DELAY: Duration = Duration::from_millis(500);
