use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::opportunity::Opportunity;

/// The ordered view of currently live opportunities produced at the end of a
/// scan cycle. Rebuilt in full every cycle; an owned value, so handing one
/// to a consumer can never be invalidated by later cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Live records, sorted by `profit_percent` descending
    pub opportunities: Vec<Opportunity>,
    /// Number of live records
    pub total_count: usize,
    /// The producer's timestamp when it supplied one, else the time the
    /// cycle was applied
    pub fetch_timestamp: DateTime<Utc>,
}

impl Snapshot {
    /// An empty snapshot stamped now
    #[must_use]
    pub fn empty() -> Self {
        Self {
            opportunities: Vec::new(),
            total_count: 0,
            fetch_timestamp: Utc::now(),
        }
    }
}
