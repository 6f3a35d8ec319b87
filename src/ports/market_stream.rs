//! Market Stream Port - Normalized Streaming Events
//!
//! Event types emitted by the WebSocket feed adapters. Delivery is via
//! `tokio::sync::broadcast` channels; the feeds own all reconnect
//! machinery, so consumers only ever see a continuous event sequence
//! that may pause while a connection is being re-established.

use serde::{Deserialize, Serialize};

use crate::domain::market::Side;

/// Best-bid/offer update from the public quote stream.
///
/// Immutable once emitted; superseded by the next update for the same
/// symbol. No history is retained anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// WOO X symbol.
    pub symbol: String,
    /// Best bid price.
    pub best_bid: f64,
    /// Best ask price.
    pub best_ask: f64,
    /// Size resting at the best bid.
    pub bid_size: f64,
    /// Size resting at the best ask.
    pub ask_size: f64,
    /// Derived mid: (best_bid + best_ask) / 2.
    pub mid_price: f64,
    /// Local receive timestamp (Unix ms).
    pub timestamp_ms: u64,
}

/// A completed fill from the private execution-report stream.
///
/// Only reports with `status == "FILLED"` are normalized into this
/// type; every other lifecycle status is dropped by the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillEvent {
    /// WOO X symbol.
    pub symbol: String,
    /// Side of the order that was filled.
    pub side: Side,
    /// Executed price.
    pub price: f64,
    /// Executed quantity.
    pub quantity: f64,
    /// Local receive timestamp (Unix ms).
    pub timestamp_ms: u64,
}

/// Connection state of a single WebSocket feed.
///
/// Observable via a `watch` channel; consumers never see anything
/// beyond these three states, reconnects happen internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport connection.
    Disconnected,
    /// Transport handshake or subscription in flight.
    Connecting,
    /// Handshake done and all subscribe frames sent.
    Subscribed,
}

impl ConnectionState {
    /// Label used for metrics and logging.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Subscribed => "subscribed",
        }
    }
}
