//! Core market domain types.
//!
//! Defines the business entities shared by the quote engine, the ports
//! and the coordinator: order sides, order requests and positions.
//! Everything here is plain data with `f64` prices/sizes, matching the
//! WOO X wire format (2 dp quote precision, 8 dp base precision).

use serde::{Deserialize, Serialize};

/// Side of the book an order rests on.
///
/// Exactly two variants; the exchange wire strings are `BUY` for bids
/// and `SELL` for asks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// The opposite side, used when re-quoting against a fill.
    pub fn opposite(self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }

    /// Wire representation expected by the WOO X order API.
    pub fn as_exchange_str(self) -> &'static str {
        match self {
            Self::Bid => "BUY",
            Self::Ask => "SELL",
        }
    }

    /// Lowercase label used in metrics and log fields.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Bid => "bid",
            Self::Ask => "ask",
        }
    }

    /// Parse the exchange wire string back into a side.
    pub fn from_exchange_str(s: &str) -> Option<Self> {
        match s {
            "BUY" => Some(Self::Bid),
            "SELL" => Some(Self::Ask),
            _ => None,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_exchange_str())
    }
}

/// A limit order to be submitted to the exchange.
///
/// Fire-and-forget: the bot keeps no local order book. The exchange is
/// the source of truth for resting orders, and cancel-all wipes them
/// wholesale at the start of every refresh cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// WOO X symbol, e.g. `PERP_BTC_USDT`.
    pub symbol: String,
    /// Bid or ask.
    pub side: Side,
    /// Limit price in quote currency (2 dp).
    pub price: f64,
    /// Order quantity in base asset (8 dp).
    pub size: f64,
}

/// A point-in-time position snapshot.
///
/// `holding` is signed: positive long, negative short, `0.0` when the
/// account has no holding record for the symbol. Queried on demand and
/// never cached beyond a single read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub holding: f64,
}
