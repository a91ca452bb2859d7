//! Thin HTTP boundary with the arbitrage backend.
//!
//! Every function here either returns usable data or an error; mapping
//! errors to the absence signal is the scan loop's job, not this module's.

use std::collections::HashMap;

use eyre::{eyre, Result};
use futures_util::StreamExt;

use crate::decode::StreamDecoder;
use crate::models::batch::{GraphInfo, Health, ScanBatch};
use crate::models::opportunity::{Opportunity, PathKey};
use crate::models::request::CalculateRequest;
use crate::utils::app_context::AppContext;

/// One non-streaming poll of `POST /arbitrage/calculate`.
///
/// # Errors
/// * If the request fails or the backend returns a non-success status
/// * If the response body is not a valid batch wrapper
pub async fn calculate(ctx: &AppContext, request: &CalculateRequest) -> Result<ScanBatch> {
    let mut batch = ctx
        .http
        .post(ctx.config.endpoint("/arbitrage/calculate"))
        .json(request)
        .send()
        .await?
        .error_for_status()?
        .json::<ScanBatch>()
        .await?;
    batch.retain_valid();
    Ok(batch)
}

/// Consume `POST /arbitrage/calculate/stream`, invoking `emit` for every
/// record the moment it can be decoded, before the response completes.
///
/// Returns the final batch: the trailing wrapper object when the backend
/// sent one, otherwise the incrementally decoded records merged by identity
/// in first-seen order.
///
/// # Errors
/// * If the request fails, the backend returns a non-success status, or a
///   chunk read fails mid-stream (broken transport)
pub async fn calculate_stream(
    ctx: &AppContext,
    request: &CalculateRequest,
    mut emit: impl FnMut(&Opportunity),
) -> Result<ScanBatch> {
    let response = ctx
        .http
        .post(ctx.config.endpoint("/arbitrage/calculate/stream"))
        .json(request)
        .send()
        .await?
        .error_for_status()?;

    let mut decoder = StreamDecoder::new();
    // Records seen so far, merged by identity; fallback result if the
    // stream ends without a trailing batch wrapper
    let mut collected: Vec<Opportunity> = Vec::new();
    let mut index: HashMap<PathKey, usize> = HashMap::new();

    let mut chunks = response.bytes_stream();
    while let Some(chunk) = chunks.next().await {
        let chunk: bytes::Bytes = chunk.map_err(|e| eyre!("stream read failed: {e}"))?;
        for record in decoder.push_chunk(&chunk) {
            emit(&record);
            let key = record.key();
            if let Some(&i) = index.get(&key) {
                collected[i].merge_from(record);
            } else {
                index.insert(key, collected.len());
                collected.push(record);
            }
        }
    }

    if decoder.is_empty() {
        log::info!("sync::backend: stream completed with an empty body");
    }

    Ok(decoder
        .finish()
        .unwrap_or_else(|| ScanBatch::from_records(collected)))
}

/// Ask the backend to refresh its market data (`POST /arbitrage/refresh`).
///
/// # Errors
/// * If the request fails or the backend returns a non-success status
pub async fn refresh(ctx: &AppContext) -> Result<()> {
    ctx.http
        .post(ctx.config.endpoint("/arbitrage/refresh"))
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

/// Fetch the backend's market-graph summary (`GET /graph/info`).
///
/// # Errors
/// * If the request fails or the response does not parse
pub async fn graph_info(ctx: &AppContext) -> Result<GraphInfo> {
    let info = ctx
        .http
        .get(ctx.config.endpoint("/graph/info"))
        .send()
        .await?
        .error_for_status()?
        .json::<GraphInfo>()
        .await?;
    Ok(info)
}

/// Backend health check (`GET /health`).
///
/// # Errors
/// * If the request fails or the response does not parse
pub async fn health(ctx: &AppContext) -> Result<Health> {
    let health = ctx
        .http
        .get(ctx.config.endpoint("/health"))
        .send()
        .await?
        .error_for_status()?
        .json::<Health>()
        .await?;
    Ok(health)
}
