//! Prometheus metric registry.
//!
//! One registry instance is created at startup and shared via `Arc`
//! with every component that records metrics.

use anyhow::{Context, Result};
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

/// All bot metrics, registered against a single Prometheus registry.
pub struct MetricsRegistry {
    registry: Registry,

    /// Orders accepted by the exchange, labeled by side.
    pub orders_placed: IntCounterVec,
    /// Order submissions that failed or were rejected, labeled by side.
    pub orders_rejected: IntCounterVec,
    /// Completed fills observed on the private stream.
    pub fills_total: IntCounter,
    /// Cancel-all requests issued.
    pub cancel_all_total: IntCounter,
    /// Last observed mid-price.
    pub mid_price: Gauge,
    /// Last known signed position in the traded symbol.
    pub position: Gauge,
    /// Feed connection state (1 subscribed, 0 otherwise), labeled by feed.
    pub feed_connected: IntGaugeVec,
    /// Feed reconnects after the initial subscription, labeled by feed.
    pub feed_reconnects: IntCounterVec,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let orders_placed = IntCounterVec::new(
            Opts::new("mm_orders_placed_total", "Orders accepted by the exchange"),
            &["side"],
        )?;
        let orders_rejected = IntCounterVec::new(
            Opts::new("mm_orders_rejected_total", "Failed or rejected order submissions"),
            &["side"],
        )?;
        let fills_total =
            IntCounter::new("mm_fills_total", "Completed fills observed")?;
        let cancel_all_total =
            IntCounter::new("mm_cancel_all_total", "Cancel-all requests issued")?;
        let mid_price = Gauge::new("mm_mid_price", "Last observed mid-price")?;
        let position = Gauge::new("mm_position", "Last known signed position")?;
        let feed_connected = IntGaugeVec::new(
            Opts::new("mm_feed_connected", "Feed connection state (1 = subscribed)"),
            &["feed"],
        )?;
        let feed_reconnects = IntCounterVec::new(
            Opts::new("mm_feed_reconnects_total", "Feed reconnects after initial subscribe"),
            &["feed"],
        )?;

        registry
            .register(Box::new(orders_placed.clone()))
            .context("registering orders_placed")?;
        registry
            .register(Box::new(orders_rejected.clone()))
            .context("registering orders_rejected")?;
        registry
            .register(Box::new(fills_total.clone()))
            .context("registering fills_total")?;
        registry
            .register(Box::new(cancel_all_total.clone()))
            .context("registering cancel_all_total")?;
        registry
            .register(Box::new(mid_price.clone()))
            .context("registering mid_price")?;
        registry
            .register(Box::new(position.clone()))
            .context("registering position")?;
        registry
            .register(Box::new(feed_connected.clone()))
            .context("registering feed_connected")?;
        registry
            .register(Box::new(feed_reconnects.clone()))
            .context("registering feed_reconnects")?;

        Ok(Self {
            registry,
            orders_placed,
            orders_rejected,
            fills_total,
            cancel_all_total,
            mid_price,
            position,
            feed_connected,
            feed_reconnects,
        })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .context("encoding metrics")?;
        String::from_utf8(buffer).context("metrics output was not utf-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_registers_and_renders() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.orders_placed.with_label_values(&["bid"]).inc();
        metrics.fills_total.inc();
        metrics.mid_price.set(30_000.0);
        metrics.feed_connected.with_label_values(&["quotes"]).set(1);

        let output = metrics.render().unwrap();
        assert!(output.contains("mm_orders_placed_total"));
        assert!(output.contains("mm_fills_total 1"));
        assert!(output.contains("mm_mid_price 30000"));
        assert!(output.contains("mm_feed_connected"));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        // Two registries are independent; one registry rejects dupes.
        let metrics = MetricsRegistry::new().unwrap();
        let dup = IntCounter::new("mm_fills_total", "dup").unwrap();
        assert!(metrics.registry.register(Box::new(dup)).is_err());
    }
}
