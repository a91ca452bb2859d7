use derive_more::Display;
use eyre::{bail, Result};
use serde::{Deserialize, Serialize};

/// Type alias for an opportunity identity key: the ordered asset path joined
/// with `-`, e.g. `BTC-ETH-USDT-BTC`.
pub type PathKey = String;

/// Risk classification supplied by the backend. Opaque to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum Risk {
    /// Every leg trades through high-liquidity pairs
    #[display("SAFE")]
    Safe,
    /// At least one leg carries elevated slippage risk
    #[display("MEDIUM")]
    Medium,
}

/// One candidate arbitrage cycle at a point in time, as produced by the
/// backend. `path` is the identity; everything else is a mutable attribute
/// and optional on the wire so that partial updates merge cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Ordered asset symbols, first element is the cycle's start asset
    pub path: Vec<String>,
    /// Trading-pair ids connecting consecutive path elements
    #[serde(default)]
    pub pairs: Vec<String>,
    /// Simulated input capital
    #[serde(default)]
    pub start_amount: Option<f64>,
    /// Simulated output capital
    #[serde(default)]
    pub end_amount: Option<f64>,
    /// Signed profit percentage, positive means profitable
    #[serde(default)]
    pub profit_percent: Option<f64>,
    /// Asset symbol the path terminates in
    #[serde(default)]
    pub end_coin: Option<String>,
    /// Backend risk classification
    #[serde(default)]
    pub risk: Option<Risk>,
}

impl Opportunity {
    /// The identity under which this record is tracked across scan cycles.
    /// Two records are the same opportunity iff their keys are equal.
    #[must_use]
    pub fn key(&self) -> PathKey {
        self.path.join("-")
    }

    /// Profit percentage used for ordering. Records that never reported a
    /// profit sort as zero.
    #[must_use]
    pub fn profit(&self) -> f64 {
        self.profit_percent.unwrap_or(0.0)
    }

    /// Structural checks applied at the decode boundary. A record that fails
    /// here is treated like malformed JSON: skipped, never tracked.
    ///
    /// # Errors
    /// * If the path has fewer than 2 assets
    /// * If `pairs` is present but does not connect consecutive path elements
    pub fn validate(&self) -> Result<()> {
        if self.path.len() < 2 {
            bail!("Opportunity path must have at least 2 assets");
        }
        if !self.pairs.is_empty() && self.pairs.len() != self.path.len() - 1 {
            bail!(
                "Opportunity has {} pairs for a path of {} assets",
                self.pairs.len(),
                self.path.len()
            );
        }
        Ok(())
    }

    /// Merge a newer sighting of the same identity over this record. New
    /// values win; fields the new record omits keep their previous values.
    pub fn merge_from(&mut self, newer: Self) {
        if !newer.pairs.is_empty() {
            self.pairs = newer.pairs;
        }
        self.start_amount = newer.start_amount.or(self.start_amount);
        self.end_amount = newer.end_amount.or(self.end_amount);
        self.profit_percent = newer.profit_percent.or(self.profit_percent);
        self.end_coin = newer.end_coin.or(self.end_coin.take());
        self.risk = newer.risk.or(self.risk);
    }
}
