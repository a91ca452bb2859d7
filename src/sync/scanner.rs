//! The polling scan loop: fetch, reconcile, publish, repeat.
//!
//! Cycles are strictly serialized. Each tick runs the fetch to completion
//! and applies it to the tracker before the next tick is allowed to start,
//! so the slot map is never touched by two cycles at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eyre::Result;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::models::request::CalculateRequest;
use crate::sync::backend;
use crate::track::snapshot::Snapshot;
use crate::track::{ScanCycle, Tracker};
use crate::utils::app_context::AppContext;

/// Run scan cycles on the configured interval until `live` is cleared or
/// every snapshot receiver is gone. A fetch failure becomes an absence
/// signal: tracked opportunities age out through the miss counter instead
/// of being wiped.
///
/// The `live` flag is checked again between the fetch and the store
/// mutation; once the owner tears the loop down, an in-flight fetch cannot
/// apply a late cycle.
///
/// # Errors
/// * If the tracker configuration is invalid
pub async fn watch_opportunities(
    ctx: &AppContext,
    request: CalculateRequest,
    live: Arc<AtomicBool>,
    tx: watch::Sender<Snapshot>,
) -> Result<()> {
    let mut tracker = Tracker::new(ctx.config.max_misses)?;
    let mut ticker = tokio::time::interval(ctx.config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log::info!(
        "sync::scanner: watching {} from {} every {:?}",
        request.start_coin,
        ctx.config.backend_url,
        ctx.config.poll_interval
    );

    loop {
        ticker.tick().await;
        if !live.load(Ordering::Acquire) {
            break;
        }

        let cycle = match backend::calculate(ctx, &request).await {
            Ok(batch) => {
                if batch.opportunities.is_empty() {
                    log::info!("sync::scanner: scan returned zero opportunities");
                } else {
                    log::info!(
                        "sync::scanner: scan returned {} opportunities",
                        batch.opportunities.len()
                    );
                }
                ScanCycle::Batch(batch)
            }
            Err(e) => {
                log::warn!("sync::scanner: fetch failed, keeping stale view: {e}");
                ScanCycle::Unavailable
            }
        };

        if !live.load(Ordering::Acquire) {
            break;
        }
        let snapshot = tracker.apply_cycle(cycle);
        log::info!(
            "sync::scanner: {} live opportunities after reconciliation",
            snapshot.total_count
        );

        if tx.send(snapshot).is_err() {
            log::info!("sync::scanner: no snapshot receivers left, stopping");
            break;
        }
    }

    Ok(())
}
