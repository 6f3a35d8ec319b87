//! Property-based tests for the grid quote engine.

use proptest::prelude::*;

use woox_grid_bot::domain::grid::{GridSpec, ladder, level, offset_price};
use woox_grid_bot::domain::market::Side;

/// Parameter ranges wide enough to be interesting but coarse enough
/// that 2 dp price rounding cannot collapse adjacent levels.
fn reasonable_spec() -> impl Strategy<Value = (f64, GridSpec)> {
    (
        1_000.0..50_000.0f64,
        0.0..100.0f64,
        5.0..50.0f64,
        1u32..10,
        0.001..1.0f64,
        0.0..0.5f64,
    )
        .prop_map(|(mid, offset_bps, step_bps, grid_size, base_size, size_step)| {
            (
                mid,
                GridSpec {
                    offset_bps,
                    step_bps,
                    grid_size,
                    base_size,
                    size_step,
                },
            )
        })
}

proptest! {
    #[test]
    fn prop_bid_prices_strictly_decrease((mid, spec) in reasonable_spec()) {
        let levels = ladder(mid, Side::Bid, &spec);
        prop_assert_eq!(levels.len(), spec.grid_size as usize);
        for pair in levels.windows(2) {
            prop_assert!(pair[1].price < pair[0].price);
        }
    }

    #[test]
    fn prop_ask_prices_strictly_increase((mid, spec) in reasonable_spec()) {
        let levels = ladder(mid, Side::Ask, &spec);
        prop_assert_eq!(levels.len(), spec.grid_size as usize);
        for pair in levels.windows(2) {
            prop_assert!(pair[1].price > pair[0].price);
        }
    }

    #[test]
    fn prop_ladder_brackets_the_mid((mid, spec) in reasonable_spec()) {
        for l in ladder(mid, Side::Bid, &spec) {
            prop_assert!(l.price <= mid);
        }
        for l in ladder(mid, Side::Ask, &spec) {
            prop_assert!(l.price >= mid);
        }
    }

    #[test]
    fn prop_sizes_never_decrease((mid, spec) in reasonable_spec()) {
        let levels = ladder(mid, Side::Bid, &spec);
        for pair in levels.windows(2) {
            prop_assert!(pair[1].size >= pair[0].size);
        }
    }

    #[test]
    fn prop_every_emitted_price_is_positive(
        mid in -1_000.0..100_000.0f64,
        offset_bps in 0.0..20_000.0f64,
        step_bps in 0.1..20_000.0f64,
        grid_size in 1u32..20,
    ) {
        let spec = GridSpec {
            offset_bps,
            step_bps,
            grid_size,
            base_size: 0.01,
            size_step: 0.0,
        };
        for side in [Side::Bid, Side::Ask] {
            for l in ladder(mid, side, &spec) {
                prop_assert!(l.price > 0.0);
            }
        }
    }

    #[test]
    fn prop_offset_prices_bracket_the_mid(
        mid in 100.0..100_000.0f64,
        offset_bps in 0.0..500.0f64,
    ) {
        let bid = offset_price(mid, Side::Bid, offset_bps).unwrap();
        let ask = offset_price(mid, Side::Ask, offset_bps).unwrap();
        prop_assert!(bid <= mid);
        prop_assert!(ask >= mid);
    }

    #[test]
    fn prop_ladder_is_deterministic((mid, spec) in reasonable_spec()) {
        prop_assert_eq!(
            ladder(mid, Side::Bid, &spec),
            ladder(mid, Side::Bid, &spec)
        );
    }

    #[test]
    fn prop_single_level_matches_ladder((mid, spec) in reasonable_spec()) {
        let levels = ladder(mid, Side::Ask, &spec);
        for l in &levels {
            let single = level(mid, Side::Ask, l.index, &spec).unwrap();
            prop_assert_eq!(l, &single);
        }
    }
}
