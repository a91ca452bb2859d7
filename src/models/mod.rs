//! # Data Models
//!
//! Wire and in-memory types exchanged with the arbitrage backend:
//! opportunity records, batch wrappers, and request payloads.

/// Batch wrapper and auxiliary backend responses
pub mod batch;
/// Opportunity record, identity key and merge semantics
pub mod opportunity;
/// Calculate request payload and scan modes
pub mod request;
