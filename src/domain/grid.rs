//! Grid quote engine.
//!
//! Pure computation of the order ladder quoted around the mid-price.
//! No I/O and no hidden state: given a mid-price snapshot, a side and
//! the grid parameters, level prices and sizes are fully deterministic.
//!
//! Pricing model (all offsets in basis points of the mid):
//!
//! ```text
//! size(i)  = base_size + i * size_step
//! offset   = mid * offset_bps / 10_000
//! step     = mid * step_bps   / 10_000
//! price(i) = mid - offset - i * step      (Bid)
//!            mid + offset + i * step      (Ask)
//! ```
//!
//! Prices are rounded to 2 decimal places (quote currency precision),
//! sizes to 8 decimal places (base asset precision). A level whose
//! rounded price is not strictly positive is suppressed rather than
//! submitted, which also covers a zero or negative mid-price feed.

use serde::{Deserialize, Serialize};

use super::market::Side;

/// Parameters describing one side-symmetric order grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSpec {
    /// Distance of the innermost level from the mid, in basis points.
    pub offset_bps: f64,
    /// Distance between two consecutive levels, in basis points.
    pub step_bps: f64,
    /// Number of levels per side.
    pub grid_size: u32,
    /// Size of the innermost order.
    pub base_size: f64,
    /// Size increment per level further out.
    pub size_step: f64,
}

/// One computed level of the ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLevel {
    /// Level index, 0 = closest to the mid.
    pub index: u32,
    /// Limit price, rounded to quote precision.
    pub price: f64,
    /// Order size, rounded to base precision.
    pub size: f64,
}

/// Round to the 2 dp quote currency precision of WOO X USDT pairs.
pub fn round_price(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

/// Round to the 8 dp base asset precision.
pub fn round_size(size: f64) -> f64 {
    (size * 1e8).round() / 1e8
}

/// Compute a single grid level, or `None` if the level is suppressed.
pub fn level(mid: f64, side: Side, index: u32, spec: &GridSpec) -> Option<GridLevel> {
    let offset = mid * spec.offset_bps / 10_000.0;
    let step = mid * spec.step_bps / 10_000.0;

    let raw = match side {
        Side::Bid => mid - offset - f64::from(index) * step,
        Side::Ask => mid + offset + f64::from(index) * step,
    };

    let price = round_price(raw);
    if price <= 0.0 {
        return None;
    }

    Some(GridLevel {
        index,
        price,
        size: round_size(spec.base_size + f64::from(index) * spec.size_step),
    })
}

/// Compute the full ladder for one side, in index order.
///
/// Suppressed levels are skipped; for a non-positive mid the ladder
/// is empty.
pub fn ladder(mid: f64, side: Side, spec: &GridSpec) -> Vec<GridLevel> {
    (0..spec.grid_size)
        .filter_map(|i| level(mid, side, i, spec))
        .collect()
}

/// Price of a single off-grid re-quote at the configured offset.
///
/// Used by fill handling to place one replacement order on the
/// opposite side of a fill. Subject to the same suppression rule as
/// grid levels.
pub fn offset_price(mid: f64, side: Side, offset_bps: f64) -> Option<f64> {
    let offset = mid * offset_bps / 10_000.0;
    let price = round_price(match side {
        Side::Bid => mid - offset,
        Side::Ask => mid + offset,
    });
    (price > 0.0).then_some(price)
}
