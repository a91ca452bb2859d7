use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::opportunity::Opportunity;

/// The canonical wrapper the backend returns from a poll, and as the trailing
/// payload of a completed stream:
/// `{ "opportunities": [...], "total_count": n, "fetch_timestamp": "..." }`.
///
/// Both metadata fields are optional so partially-populated wrappers from
/// older backend revisions still parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanBatch {
    /// Opportunity records found in this scan
    #[serde(default)]
    pub opportunities: Vec<Opportunity>,
    /// Backend-reported record count
    #[serde(default)]
    pub total_count: Option<u64>,
    /// Backend-side timestamp of the scan
    #[serde(default)]
    pub fetch_timestamp: Option<DateTime<Utc>>,
}

impl ScanBatch {
    /// A batch carrying only records, with no backend metadata
    #[must_use]
    pub fn from_records(opportunities: Vec<Opportunity>) -> Self {
        Self {
            opportunities,
            total_count: None,
            fetch_timestamp: None,
        }
    }

    /// Drop records that fail structural validation, logging each reject.
    /// Applied wherever backend records enter the crate, so a record
    /// rejected mid-stream is equally rejected when it arrives through the
    /// trailing wrapper or a non-streaming poll.
    pub fn retain_valid(&mut self) {
        self.opportunities.retain(|opp| match opp.validate() {
            Ok(()) => true,
            Err(e) => {
                log::debug!("batch: dropping invalid record: {e}");
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::test_helpers::*;

    #[test]
    fn test_retain_valid_drops_malformed_records() {
        let mut bad_pairs = opp(&["A", "B", "A"], 0.7);
        bad_pairs.pairs = vec!["AB".into()];

        let mut batch = ScanBatch::from_records(vec![
            opp(&["BTC"], 1.0),
            opp(&["A", "B", "A"], 0.5),
            bad_pairs,
        ]);
        batch.retain_valid();

        assert_eq!(batch.opportunities.len(), 1);
        assert_eq!(batch.opportunities[0].key(), "A-B-A");
    }
}

/// Response of `GET /graph/info`
#[derive(Debug, Clone, Deserialize)]
pub struct GraphInfo {
    /// Number of distinct assets in the backend's market graph
    pub total_coins: u64,
    /// Number of tradable pairs
    pub total_pairs: u64,
    /// Number of directed graph edges
    pub total_edges: u64,
    /// When the backend last refreshed its market data
    pub last_updated: String,
}

/// Response of `GET /health`
#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    /// Backend-reported status string
    pub status: String,
    /// Backend-side time of the check
    pub timestamp: String,
}
