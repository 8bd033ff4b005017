pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod sync;

pub use config::Config;
pub use error::{Error, Result};
pub use model::{
    Buyer, DeliveryEstimate, LineItem, Order, Package, PackageItem, Recipient,
};
pub use storage::Database;
pub use sync::{
    NoopProgress, OrderOutcome, SyncOptions, SyncProgress, SyncReport, SyncStatus,
};

// Re-export the stats type needed by the binary crate, but not the module itself
pub use storage::repository::MirrorStats;

use api::Client;
use storage::repository;
use sync::syncer;

/// Main entry point for the Shopee order warehouse.
pub struct ShopeeDW {
    db: Database,
    client: Client,
}

impl ShopeeDW {
    pub fn new(db: Database, client: Client) -> Self {
        Self { db, client }
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    // ── Sync commands ──────────────────────────────────────────────

    /// Mirror every order placed in the backfill look-back period.
    pub async fn backfill(
        &self,
        options: &SyncOptions,
        progress: &dyn SyncProgress,
    ) -> Result<SyncReport> {
        syncer::backfill(&self.db, &self.client, options, progress).await
    }

    /// Mirror every order touched in the refresh look-back period.
    pub async fn refresh(
        &self,
        options: &SyncOptions,
        progress: &dyn SyncProgress,
    ) -> Result<SyncReport> {
        syncer::refresh_recent(&self.db, &self.client, options, progress).await
    }

    /// Refresh now and then on every poll tick, until the process stops.
    pub async fn watch(
        &self,
        options: &SyncOptions,
        progress: &dyn SyncProgress,
    ) -> Result<()> {
        syncer::watch(&self.db, &self.client, options, progress).await
    }

    // ── Mirror inspection ──────────────────────────────────────────

    pub async fn stats(&self) -> Result<MirrorStats> {
        self.db
            .reader()
            .call(|conn| repository::mirror_stats(conn))
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub async fn order(&self, order_sn: &str) -> Result<Option<Order>> {
        self.db
            .reader()
            .call({
                let order_sn = order_sn.to_string();
                move |conn| repository::get_order(conn, &order_sn)
            })
            .await
            .map_err(|e| Error::Database(e.to_string()))
    }
}
