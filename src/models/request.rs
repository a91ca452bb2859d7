use clap::ValueEnum;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Where arbitrage paths are allowed to end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanMode {
    /// Paths must return to the starting asset
    #[display("START_ONLY")]
    StartOnly,
    /// Paths may end in major assets
    #[display("POPULAR_END")]
    PopularEnd,
    /// Any end asset
    #[display("BOTH")]
    Both,
}

/// Payload of `POST /arbitrage/calculate` and its streaming variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRequest {
    /// Asset to start the cycle from
    pub start_coin: String,
    /// Capital to simulate the cycle with
    pub start_amount: f64,
    /// Path-termination mode
    pub mode: ScanMode,
}
