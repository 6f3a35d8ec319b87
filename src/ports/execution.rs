//! Execution Port - Authenticated Exchange Operations
//!
//! Defines the trait for the REST-facing half of the exchange client:
//! order submission, bulk cancellation and account queries.
//!
//! Key design decisions:
//! - Orders are fire-and-forget: the ack is logged, never tracked.
//! - `cancel_all_orders` is idempotent and safe to call with an
//!   empty book (the refresh cycle and shutdown both rely on that).
//! - No retry semantics at this boundary; retrying is a coordinator
//!   policy (in practice: the next refresh cycle re-quotes anyway).

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::market::OrderRequest;

/// Result of an order submission.
#[derive(Debug, Clone)]
pub struct OrderAck {
    /// Whether the exchange accepted the order.
    pub success: bool,
    /// Exchange-assigned order id, when accepted.
    pub order_id: Option<u64>,
    /// Raw order status string, e.g. `NEW`.
    pub status: Option<String>,
}

/// Result of a cancel-all request.
#[derive(Debug, Clone)]
pub struct CancelAck {
    /// Whether the request succeeded (also true when no orders rested).
    pub success: bool,
    /// Raw status string from the exchange, e.g. `CANCEL_ALL_SENT`.
    pub status: Option<String>,
}

/// Trait for authenticated exchange operations.
///
/// The only component allowed to perform network I/O is the adapter
/// implementing this port; everything above it (coordinator, tests)
/// depends on these five operations alone.
#[async_trait]
pub trait Execution: Send + Sync + 'static {
    /// Submit a single LIMIT order.
    ///
    /// # Errors
    /// Returns an error on transport failure, signing failure, or an
    /// exchange-side rejection.
    async fn place_order(&self, order: &OrderRequest) -> anyhow::Result<OrderAck>;

    /// Cancel every resting order on the account.
    async fn cancel_all_orders(&self) -> anyhow::Result<CancelAck>;

    /// Current signed holding for a symbol; `0.0` when the account
    /// has no holding record.
    async fn position(&self, symbol: &str) -> anyhow::Result<f64>;

    /// Account balances per token.
    async fn balances(&self) -> anyhow::Result<HashMap<String, f64>>;

    /// Check if the REST connection is usable.
    async fn is_healthy(&self) -> bool;
}
