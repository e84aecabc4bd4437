//! Error types for shop operations.

use thiserror::Error;

/// Errors produced by shop components.
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration validation failed at shop-open.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// An order request was malformed (too many slots, unknown pigment id).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The shop has closed; no further orders are accepted.
    #[error("shop is closed")]
    ShopClosed,
    /// The mixing step failed for an order. Pigments are always released
    /// before this is reported.
    #[error("mixing failed for order {order_id}: {reason}")]
    MixFailed {
        /// Order that could not be filled.
        order_id: u64,
        /// Mixer-supplied failure reason.
        reason: String,
    },
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
