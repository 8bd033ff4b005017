use crate::api::types::{OrderDetail, TimeRangeField};
use crate::api::OrderSource;
use crate::error::Result;
use crate::model::Order;
use crate::storage::repository;
use crate::storage::Database;
use crate::sync::rate_limit::{BATCH_DELAY, PAGE_DELAY, WINDOW_DELAY};
use crate::sync::transform;
use crate::sync::window::{backfill_windows, TimeWindow, MAX_WINDOW_SPAN_SECS};
use crate::sync::{OrderOutcome, SyncOptions, SyncProgress, SyncReport};

/// Orders per get_order_detail call. The endpoint rejects longer lists.
pub const DETAIL_BATCH_SIZE: usize = 50;

/// Pull every order placed in the look-back period into the mirror.
///
/// The period is split into bounded windows walked newest first, each
/// listed by creation time. A window or page that fails is logged and
/// skipped; identifiers gathered so far stay in the run.
pub async fn backfill<S: OrderSource>(
    db: &Database,
    source: &S,
    options: &SyncOptions,
    progress: &dyn SyncProgress,
) -> Result<SyncReport> {
    let now = chrono::Utc::now().timestamp();
    let start = now - i64::from(options.backfill_days) * 86_400;
    let windows = backfill_windows(start, now, MAX_WINDOW_SPAN_SECS);

    progress.on_run_start("backfill");
    log::info!(
        "Backfilling {} days across {} windows",
        options.backfill_days,
        windows.len()
    );

    let mut order_sns = Vec::new();
    for (i, window) in windows.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(WINDOW_DELAY).await;
        }
        let found = list_window(source, TimeRangeField::CreateTime, window).await;
        progress.on_window_listed(&window.label, found.len());
        log::debug!("Window {}: {} orders", window.label, found.len());
        order_sns.extend(found);
    }

    progress.on_orders_found(order_sns.len());
    log::info!("Found {} orders", order_sns.len());

    process_orders(db, source, "backfill", order_sns, progress).await
}

/// Pull every order touched in the recent look-back period.
///
/// Listing keys on update time, so status transitions on old orders are
/// caught as long as they happened inside the period.
pub async fn refresh_recent<S: OrderSource>(
    db: &Database,
    source: &S,
    options: &SyncOptions,
    progress: &dyn SyncProgress,
) -> Result<SyncReport> {
    let now = chrono::Utc::now().timestamp();
    let window = TimeWindow::new(now - i64::from(options.refresh_hours) * 3_600, now);

    progress.on_run_start("refresh");
    log::info!("Refreshing orders updated in the last {}h", options.refresh_hours);

    let order_sns = list_window(source, TimeRangeField::UpdateTime, &window).await;
    progress.on_window_listed(&window.label, order_sns.len());
    progress.on_orders_found(order_sns.len());
    log::info!("Found {} orders", order_sns.len());

    process_orders(db, source, "refresh", order_sns, progress).await
}

/// Run a recent refresh immediately, then again every poll interval
/// until the process is stopped. A failed tick is logged and the next
/// one runs on schedule.
pub async fn watch<S: OrderSource>(
    db: &Database,
    source: &S,
    options: &SyncOptions,
    progress: &dyn SyncProgress,
) -> Result<()> {
    let mut ticker = tokio::time::interval(options.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match refresh_recent(db, source, options, progress).await {
            Ok(report) => log::info!(
                "Poll tick done: {} found, {} new, {} updated, {} status changes",
                report.orders_found,
                report.orders_new,
                report.orders_updated,
                report.status_changes
            ),
            Err(e) => log::error!("Poll tick failed: {e}"),
        }
    }
}

/// Walk one window's pages to exhaustion, collecting order identifiers.
/// On error the window ends early with whatever was gathered; the range
/// is re-covered by the next scheduled run.
async fn list_window<S: OrderSource>(
    source: &S,
    field: TimeRangeField,
    window: &TimeWindow,
) -> Vec<String> {
    let mut order_sns = Vec::new();
    let mut cursor = String::new();
    loop {
        let page = match source.list_orders(field, window.from, window.to, &cursor).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Listing {} failed at cursor {cursor:?}: {e}", window.label);
                break;
            }
        };
        order_sns.extend(page.order_list.into_iter().map(|entry| entry.order_sn));
        if !page.more {
            break;
        }
        if page.next_cursor.is_empty() {
            log::warn!("Listing {}: more pages reported without a cursor", window.label);
            break;
        }
        cursor = page.next_cursor;
        tokio::time::sleep(PAGE_DELAY).await;
    }
    order_sns
}

/// Fetch full records in fixed-size batches. A failed batch drops its
/// orders from this run and the loop moves on.
async fn fetch_details<S: OrderSource>(
    source: &S,
    order_sns: &[String],
    progress: &dyn SyncProgress,
) -> (Vec<OrderDetail>, u32, u32) {
    let batches_total = order_sns.len().div_ceil(DETAIL_BATCH_SIZE) as u32;
    let mut details = Vec::with_capacity(order_sns.len());
    let mut batches_completed = 0u32;

    for (i, batch) in order_sns.chunks(DETAIL_BATCH_SIZE).enumerate() {
        if i > 0 {
            tokio::time::sleep(BATCH_DELAY).await;
        }
        match source.order_details(batch).await {
            Ok(records) => {
                batches_completed += 1;
                progress.on_batch_fetched(batches_completed, batches_total, records.len());
                details.extend(records);
            }
            Err(e) => log::warn!("Detail batch {}/{batches_total} failed: {e}", i + 1),
        }
    }
    (details, batches_completed, batches_total)
}

/// Classify one incoming order against the mirror and upsert it.
pub(crate) async fn reconcile_order(db: &Database, order: Order) -> Result<OrderOutcome> {
    let existing_status: Option<String> = db
        .reader()
        .call({
            let order_sn = order.order_sn.clone();
            move |conn| repository::find_order_status(conn, &order_sn)
        })
        .await?;

    let outcome = match existing_status {
        None => OrderOutcome::New,
        Some(old) if old != order.order_status => OrderOutcome::StatusChanged {
            old,
            new: order.order_status.clone(),
        },
        Some(_) => OrderOutcome::Updated,
    };

    db.writer()
        .call(move |conn| repository::upsert_order(conn, &order))
        .await?;

    Ok(outcome)
}

/// Shared tail of backfill and refresh: fetch details, normalize,
/// reconcile, and assemble the report.
async fn process_orders<S: OrderSource>(
    db: &Database,
    source: &S,
    label: &str,
    order_sns: Vec<String>,
    progress: &dyn SyncProgress,
) -> Result<SyncReport> {
    let (details, batches_completed, batches_total) =
        fetch_details(source, &order_sns, progress).await;
    let orders_found = order_sns.len() as u64;
    let orders_fetched = details.len() as u64;
    let synced_at = chrono::Utc::now().timestamp();

    let mut orders_new = 0u64;
    let mut orders_updated = 0u64;
    let mut status_changes = 0u64;
    let mut orders_failed = 0u64;

    for detail in details {
        let order = transform::normalize_order(detail, synced_at);
        let order_sn = order.order_sn.clone();
        let wants_document_check = !order.tracking_no.is_empty() && !order.is_cancelled();

        match reconcile_order(db, order).await {
            Ok(OrderOutcome::New) => orders_new += 1,
            Ok(OrderOutcome::Updated) => orders_updated += 1,
            Ok(OrderOutcome::StatusChanged { old, new }) => {
                log::info!("Order {order_sn} status changed: {old} -> {new}");
                status_changes += 1;
            }
            Err(e) => {
                log::warn!("Failed to persist order {order_sn}: {e}");
                orders_failed += 1;
                continue;
            }
        }

        if wants_document_check {
            check_shipping_document(source, &order_sn).await;
        }
    }

    let report = SyncReport::from_counts(
        label.to_string(),
        orders_found,
        orders_fetched,
        orders_new,
        orders_updated,
        status_changes,
        orders_failed,
        batches_completed,
        batches_total,
    );
    progress.on_run_complete(&report);
    Ok(report)
}

/// Best-effort shipping document probe. Outcomes are logged only; a
/// failure here never touches the run's counts.
async fn check_shipping_document<S: OrderSource>(source: &S, order_sn: &str) {
    match source.shipping_document_info(order_sn).await {
        Ok(Some(info)) if info.fail_error.is_empty() => log::info!(
            "Order {order_sn}: shipping document ready ({})",
            info.suggest_shipping_document_type
        ),
        Ok(Some(info)) => {
            log::debug!("Order {order_sn}: shipping document not ready ({})", info.fail_error)
        }
        Ok(None) => log::debug!("Order {order_sn}: no shipping document info"),
        Err(e) => log::debug!("Order {order_sn}: shipping document lookup failed: {e}"),
    }
}
