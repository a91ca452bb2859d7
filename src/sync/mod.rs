//! Backend synchronization: the HTTP boundary and the continuous scan loop.

/// HTTP calls against the arbitrage backend
pub mod backend;
/// Fixed-interval polling and reconciliation
pub mod scanner;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use eyre::Result;
use tokio::sync::watch;

use crate::models::request::CalculateRequest;
use crate::track::snapshot::Snapshot;
use crate::utils::app_context::AppContext;

/// Start the scan loop and a console consumer for its snapshots, then run
/// until Ctrl-C. The liveness flag is cleared before the tasks are dropped
/// so an in-flight cycle cannot mutate the tracker after shutdown begins.
///
/// # Errors
/// * If the scanner configuration is invalid
pub async fn start(ctx: AppContext, request: CalculateRequest) -> Result<()> {
    let live = Arc::new(AtomicBool::new(true));
    let (tx, mut rx) = watch::channel(Snapshot::empty());

    // Snapshot consumer: stands in for the presentation layer
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let snapshot = rx.borrow_and_update().clone();
            print_snapshot(&snapshot);
        }
    });

    let scan_ctx = ctx.clone();
    let scan_live = Arc::clone(&live);
    let scanner = tokio::spawn(async move {
        if let Err(e) = scanner::watch_opportunities(&scan_ctx, request, scan_live, tx).await {
            log::error!("sync: scanner stopped with error: {e}");
        }
    });

    tokio::signal::ctrl_c().await?;
    log::info!("sync: received shutdown signal");
    live.store(false, Ordering::Release);
    scanner.abort();
    Ok(())
}

/// Print one snapshot to the console
fn print_snapshot(snapshot: &Snapshot) {
    println!(
        "\n{} opportunities at {}",
        snapshot.total_count, snapshot.fetch_timestamp
    );
    for opp in &snapshot.opportunities {
        let risk = opp
            .risk
            .map_or_else(|| "-".to_string(), |r| r.to_string());
        println!("  {:>8.4}%  [{risk}]  {}", opp.profit(), opp.key());
    }
}
