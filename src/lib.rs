/*!
 * # Kite - Arbitrage Opportunity Stream Consumer
 *
 * Kite consumes circular currency-arbitrage opportunities computed by a
 * remote backend and maintains a stable, ordered view of them across
 * repeated polling cycles.
 *
 * ## Core Features
 *
 * - **Incremental Stream Decoding**: Extracts complete opportunity records
 *   from a chunked response body before the stream finishes
 * - **Flicker-Resistant Reconciliation**: Tracks opportunities by path
 *   identity and tolerates transient disappearance via miss counting
 * - **Deterministic Ordering**: Snapshots sorted by profit with stable,
 *   reproducible tie-breaking
 * - **Graceful Degradation**: Transport failures age data out instead of
 *   wiping the view
 *
 * ## Module Structure
 *
 * - `config`: Environment-driven configuration
 * - `decode`: Incremental JSON stream decoding
 * - `models`: Wire and data types shared with the backend
 * - `sync`: Backend HTTP boundary and the polling scan loop
 * - `track`: Opportunity reconciliation and snapshots
 * - `utils`: Logger and shared application context
 */

/// Environment-driven configuration
pub mod config;
/// Incremental JSON stream decoding
pub mod decode;
/// Wire and data types shared with the backend
pub mod models;
/// Backend HTTP boundary and the polling scan loop
pub mod sync;
/// Opportunity reconciliation and snapshots
pub mod track;
/// Logger and shared application context
pub mod utils;
