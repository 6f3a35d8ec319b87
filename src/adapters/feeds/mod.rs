//! WebSocket feed adapters.
//!
//! Two independent streams, each owning its own connection lifecycle:
//! - `quotes`: public best-bid/offer stream (`{SYMBOL}@bbo`)
//! - `fills`: private execution-report stream (authenticated)
//!
//! Both reconnect forever with bounded exponential backoff; the
//! `supervisor` spawns them, mirrors their connection state into
//! metrics and exposes aggregate feed health.

pub mod fills;
pub mod quotes;
pub mod supervisor;

use std::time::Duration;

use rand::Rng;

/// Base reconnect delay.
const BACKOFF_BASE_MS: u64 = 500;
/// Upper bound on the reconnect delay, jitter excluded.
const BACKOFF_CAP_MS: u64 = 32_000;
/// Maximum random jitter added to each delay.
const BACKOFF_JITTER_MS: u64 = 250;

/// Reconnect delay for the given attempt number.
///
/// Doubles from 500ms up to a 32s cap, plus 0-250ms of jitter so that
/// the two feeds do not hammer the gateway in lockstep after a shared
/// outage.
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    let base = BACKOFF_BASE_MS
        .checked_shl(attempt.min(16))
        .map_or(BACKOFF_CAP_MS, |v| v.min(BACKOFF_CAP_MS));
    let jitter = rand::thread_rng().gen_range(0..=BACKOFF_JITTER_MS);
    Duration::from_millis(base + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_then_caps() {
        let within = |attempt: u32, expected_ms: u64| {
            let d = backoff_delay(attempt).as_millis() as u64;
            assert!(
                d >= expected_ms && d <= expected_ms + BACKOFF_JITTER_MS,
                "attempt {attempt}: got {d}ms, want {expected_ms}..={}ms",
                expected_ms + BACKOFF_JITTER_MS
            );
        };
        within(0, 500);
        within(1, 1_000);
        within(2, 2_000);
        within(6, 32_000);
        within(30, 32_000);
        within(u32::MAX, 32_000);
    }
}
