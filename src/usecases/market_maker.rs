//! Market-maker coordinator.
//!
//! Owns the trading loop: every refresh cycle cancels the resting
//! ladder, reads the freshest price snapshot and re-quotes a full
//! bid/ask grid around the mid. Fills arriving on the private stream
//! trigger a single opposite-side re-quote at the configured offset.
//!
//! Concurrency layout (three tasks per coordinator):
//! - price ingest: broadcast ticks collapsed into a single-slot
//!   `watch` snapshot, so the quote loop always sees the latest price
//!   and never works through a backlog
//! - quote loop: blocks until the first price arrives, then runs one
//!   refresh cycle per `refresh` interval
//! - fill loop: reacts to each completed fill independently of the
//!   refresh schedule
//!
//! Order submission failures are logged and counted, never retried;
//! the next refresh cycle rebuilds the whole ladder anyway.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};

use crate::adapters::metrics::MetricsRegistry;
use crate::domain::grid::{self, GridSpec};
use crate::domain::market::{OrderRequest, Side};
use crate::ports::execution::Execution;
use crate::ports::market_stream::{FillEvent, PriceUpdate};

/// Grid market-maker coordinator over any `Execution` implementation.
pub struct MarketMaker<E: Execution> {
    exchange: Arc<E>,
    symbol: String,
    spec: GridSpec,
    refresh: Duration,
    order_interval: Duration,
    dry_run: bool,
    price_tx: watch::Sender<Option<PriceUpdate>>,
    metrics: Arc<MetricsRegistry>,
}

impl<E: Execution> MarketMaker<E> {
    pub fn new(
        exchange: Arc<E>,
        symbol: String,
        spec: GridSpec,
        refresh: Duration,
        order_interval: Duration,
        dry_run: bool,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        let (price_tx, _) = watch::channel(None);
        Self {
            exchange,
            symbol,
            spec,
            refresh,
            order_interval,
            dry_run,
            price_tx,
            metrics,
        }
    }

    /// Replace the price snapshot used by the next cycle.
    pub fn set_price(&self, update: PriceUpdate) {
        self.metrics.mid_price.set(update.mid_price);
        self.price_tx.send_replace(Some(update));
    }

    /// Latest price snapshot, if any tick has arrived yet.
    pub fn latest_price(&self) -> Option<PriceUpdate> {
        self.price_tx.borrow().clone()
    }

    /// Run the coordinator until shutdown is broadcast.
    pub async fn run(
        self: Arc<Self>,
        price_rx: broadcast::Receiver<PriceUpdate>,
        fill_rx: broadcast::Receiver<FillEvent>,
        shutdown: broadcast::Sender<()>,
    ) {
        let ingest = tokio::spawn(
            Arc::clone(&self).ingest_prices(price_rx, shutdown.subscribe()),
        );
        let quoting = tokio::spawn(Arc::clone(&self).quote_loop(shutdown.subscribe()));
        let filling = tokio::spawn(Arc::clone(&self).fill_loop(fill_rx, shutdown.subscribe()));

        for (name, handle) in [("ingest", ingest), ("quoting", quoting), ("filling", filling)] {
            if let Err(e) = handle.await {
                error!(task = name, error = %e, "coordinator task panicked");
            }
        }
        info!("market maker stopped");
    }

    async fn ingest_prices(
        self: Arc<Self>,
        mut price_rx: broadcast::Receiver<PriceUpdate>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                msg = price_rx.recv() => match msg {
                    Ok(update) if update.symbol == self.symbol => self.set_price(update),
                    Ok(update) => {
                        debug!(symbol = %update.symbol, "ignoring tick for foreign symbol");
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Only the latest tick matters, lag is harmless.
                        debug!(skipped, "price ingest lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                },
                _ = shutdown.recv() => return,
            }
        }
    }

    async fn quote_loop(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut price_rx = self.price_tx.subscribe();
        tokio::select! {
            first = price_rx.wait_for(Option::is_some) => {
                if first.is_err() {
                    return;
                }
            }
            _ = shutdown.recv() => return,
        }
        info!(symbol = %self.symbol, "first price received, quoting begins");

        loop {
            if let Err(e) = self.refresh_cycle().await {
                warn!(error = %e, "refresh cycle failed");
            }
            tokio::select! {
                () = tokio::time::sleep(self.refresh) => {}
                _ = shutdown.recv() => return,
            }
        }
    }

    async fn fill_loop(
        self: Arc<Self>,
        mut fill_rx: broadcast::Receiver<FillEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                msg = fill_rx.recv() => match msg {
                    Ok(fill) => {
                        if let Err(e) = self.handle_fill(&fill).await {
                            warn!(error = %e, "fill handling failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "fill events lagged, position may drift until next query");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                },
                _ = shutdown.recv() => return,
            }
        }
    }

    /// Final safety net, called once after the loops have stopped:
    /// wipe the book so no orders rest unattended.
    pub async fn shutdown(&self) -> Result<()> {
        let ack = self
            .exchange
            .cancel_all_orders()
            .await
            .context("final cancel-all")?;
        self.metrics.cancel_all_total.inc();
        info!(status = ?ack.status, "final cancel-all issued");
        Ok(())
    }

    /// One full quoting cycle: cancel everything, re-quote both sides
    /// from the freshest snapshot, then log the resulting position.
    ///
    /// A failed cancel-all is logged and the cycle proceeds; stale
    /// levels left behind get wiped by the next successful cancel.
    pub async fn refresh_cycle(&self) -> Result<()> {
        match self.exchange.cancel_all_orders().await {
            Ok(_) => self.metrics.cancel_all_total.inc(),
            Err(e) => warn!(error = %e, "cancel-all failed, quoting anyway"),
        }

        let update = self
            .latest_price()
            .context("no price snapshot available")?;
        let mid = update.mid_price;
        debug!(
            symbol = %self.symbol,
            mid,
            best_bid = update.best_bid,
            best_ask = update.best_ask,
            "re-quoting grid"
        );

        self.submit_ladder(Side::Bid, mid).await;
        self.submit_ladder(Side::Ask, mid).await;

        match self.exchange.position(&self.symbol).await {
            Ok(holding) => {
                self.metrics.position.set(holding);
                info!(symbol = %self.symbol, holding, mid, "cycle complete");
            }
            Err(e) => warn!(error = %e, "position query failed"),
        }

        Ok(())
    }

    /// React to a completed fill: refresh the position gauge and place
    /// one opposite-side order of the filled quantity at the offset.
    pub async fn handle_fill(&self, fill: &FillEvent) -> Result<()> {
        // The private stream reports every symbol the account touches;
        // only the traded symbol gets a replacement order.
        if fill.symbol != self.symbol {
            debug!(symbol = %fill.symbol, "ignoring fill for foreign symbol");
            return Ok(());
        }
        self.metrics.fills_total.inc();

        match self.exchange.position(&self.symbol).await {
            Ok(holding) => {
                self.metrics.position.set(holding);
                info!(
                    symbol = %fill.symbol,
                    side = %fill.side,
                    price = fill.price,
                    quantity = fill.quantity,
                    holding,
                    "handling fill"
                );
            }
            Err(e) => warn!(error = %e, "position query after fill failed"),
        }

        let update = self
            .latest_price()
            .context("no price snapshot for re-quote")?;
        let side = fill.side.opposite();
        let Some(price) = grid::offset_price(update.mid_price, side, self.spec.offset_bps)
        else {
            warn!(mid = update.mid_price, "re-quote suppressed, price not positive");
            return Ok(());
        };

        let order = OrderRequest {
            symbol: fill.symbol.clone(),
            side,
            price,
            size: grid::round_size(fill.quantity),
        };
        self.submit(&order).await;
        Ok(())
    }

    async fn submit_ladder(&self, side: Side, mid: f64) {
        let levels = grid::ladder(mid, side, &self.spec);
        if levels.is_empty() {
            warn!(side = %side, mid, "ladder empty, nothing to quote");
            return;
        }
        for level in levels {
            let order = OrderRequest {
                symbol: self.symbol.clone(),
                side,
                price: level.price,
                size: level.size,
            };
            self.submit(&order).await;
            // Pace submissions so the exchange rate limiter stays calm.
            tokio::time::sleep(self.order_interval).await;
        }
    }

    async fn submit(&self, order: &OrderRequest) {
        if self.dry_run {
            info!(
                symbol = %order.symbol,
                side = %order.side,
                price = order.price,
                size = order.size,
                "dry-run, order not sent"
            );
            return;
        }

        match self.exchange.place_order(order).await {
            Ok(ack) if ack.success => {
                self.metrics
                    .orders_placed
                    .with_label_values(&[order.side.as_label()])
                    .inc();
            }
            Ok(ack) => {
                self.metrics
                    .orders_rejected
                    .with_label_values(&[order.side.as_label()])
                    .inc();
                warn!(
                    side = %order.side,
                    price = order.price,
                    status = ?ack.status,
                    "order rejected"
                );
            }
            Err(e) => {
                self.metrics
                    .orders_rejected
                    .with_label_values(&[order.side.as_label()])
                    .inc();
                warn!(side = %order.side, price = order.price, error = %e, "order failed");
            }
        }
    }
}
