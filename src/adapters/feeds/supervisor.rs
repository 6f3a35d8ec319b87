//! Feed supervision.
//!
//! Spawns both stream adapters, mirrors their connection state into
//! metrics and drives the readiness flag served by the monitoring
//! endpoint. Readiness means both feeds are subscribed; the bot keeps
//! running while degraded, it just reports not-ready.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::ports::market_stream::ConnectionState;

use super::fills::FillFeed;
use super::quotes::QuoteFeed;

/// Handle over the spawned feed tasks.
pub struct FeedSupervisor {
    quote_handle: JoinHandle<()>,
    fill_handle: JoinHandle<()>,
    monitor_handle: JoinHandle<()>,
}

impl FeedSupervisor {
    /// Spawn both feeds and the state monitor.
    pub fn spawn(
        quote_feed: QuoteFeed,
        fill_feed: FillFeed,
        metrics: Arc<MetricsRegistry>,
        ready_tx: watch::Sender<bool>,
        shutdown: &broadcast::Sender<()>,
    ) -> Self {
        let quote_state = quote_feed.state();
        let fill_state = fill_feed.state();

        let quote_handle = tokio::spawn(quote_feed.run(shutdown.subscribe()));
        let fill_handle = tokio::spawn(fill_feed.run(shutdown.subscribe()));
        let monitor_handle = tokio::spawn(monitor_states(
            quote_state,
            fill_state,
            metrics,
            ready_tx,
        ));

        Self {
            quote_handle,
            fill_handle,
            monitor_handle,
        }
    }

    /// Wait for every supervised task to finish.
    pub async fn join(self) {
        for (name, handle) in [
            ("quotes", self.quote_handle),
            ("fills", self.fill_handle),
            ("monitor", self.monitor_handle),
        ] {
            if let Err(e) = handle.await {
                warn!(feed = name, error = %e, "feed task panicked");
            }
        }
    }
}

async fn monitor_states(
    mut quote_state: watch::Receiver<ConnectionState>,
    mut fill_state: watch::Receiver<ConnectionState>,
    metrics: Arc<MetricsRegistry>,
    ready_tx: watch::Sender<bool>,
) {
    let mut quotes = FeedTracker::new("quotes");
    let mut fills = FeedTracker::new("fills");

    loop {
        let quote = *quote_state.borrow();
        let fill = *fill_state.borrow();

        quotes.record(&metrics, quote);
        fills.record(&metrics, fill);

        let ready =
            quote == ConnectionState::Subscribed && fill == ConnectionState::Subscribed;
        if ready != *ready_tx.borrow() {
            info!(ready, quotes = quote.as_str(), fills = fill.as_str(), "feed readiness changed");
        }
        ready_tx.send_replace(ready);

        tokio::select! {
            changed = quote_state.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = fill_state.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    ready_tx.send_replace(false);
}

/// Per-feed state bookkeeping for the monitor loop.
struct FeedTracker {
    name: &'static str,
    last: Option<ConnectionState>,
    seen_subscribed: bool,
}

impl FeedTracker {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            last: None,
            seen_subscribed: false,
        }
    }

    fn record(&mut self, metrics: &MetricsRegistry, state: ConnectionState) {
        if self.last == Some(state) {
            return;
        }
        self.last = Some(state);

        let connected = i64::from(state == ConnectionState::Subscribed);
        metrics
            .feed_connected
            .with_label_values(&[self.name])
            .set(connected);

        if state == ConnectionState::Subscribed {
            if self.seen_subscribed {
                metrics
                    .feed_reconnects
                    .with_label_values(&[self.name])
                    .inc();
            }
            self.seen_subscribed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_monitor_tracks_readiness_and_reconnects() {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let (quote_tx, quote_rx) = watch::channel(ConnectionState::Disconnected);
        let (fill_tx, fill_rx) = watch::channel(ConnectionState::Disconnected);
        let (ready_tx, ready_rx) = watch::channel(false);

        let monitor = tokio::spawn(monitor_states(
            quote_rx,
            fill_rx,
            Arc::clone(&metrics),
            ready_tx,
        ));

        quote_tx.send_replace(ConnectionState::Subscribed);
        fill_tx.send_replace(ConnectionState::Subscribed);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(*ready_rx.borrow());

        // one reconnect cycle on the quote feed
        quote_tx.send_replace(ConnectionState::Disconnected);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!*ready_rx.borrow());

        quote_tx.send_replace(ConnectionState::Subscribed);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(*ready_rx.borrow());
        assert_eq!(
            metrics.feed_reconnects.with_label_values(&["quotes"]).get(),
            1
        );
        assert_eq!(
            metrics.feed_reconnects.with_label_values(&["fills"]).get(),
            0
        );

        drop(quote_tx);
        drop(fill_tx);
        monitor.await.unwrap();
        assert!(!*ready_rx.borrow());
    }
}
