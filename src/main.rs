//! Binary entrypoint: wiring and lifecycle.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

use woox_grid_bot::adapters::api::{RestClient, WooAuth, WooExchange};
use woox_grid_bot::adapters::feeds::fills::FillFeed;
use woox_grid_bot::adapters::feeds::quotes::QuoteFeed;
use woox_grid_bot::adapters::feeds::supervisor::FeedSupervisor;
use woox_grid_bot::adapters::metrics::{MetricsRegistry, health};
use woox_grid_bot::config::loader::load_config;
use woox_grid_bot::ports::execution::Execution;
use woox_grid_bot::usecases::MarketMaker;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = load_config(&config_path)?;

    // 2. Logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.bot.log_level));
    tracing_subscriber::fmt().json().with_env_filter(filter).init();

    info!(
        bot = %config.bot.name,
        symbol = %config.market.symbol,
        network = ?config.api.network,
        dry_run = config.bot.dry_run,
        "starting"
    );

    // 3. Credentials and REST client
    let auth = WooAuth::from_env().context("loading WOO X credentials")?;
    let application_id = auth.application_id().to_string();
    let client = RestClient::new(auth.clone(), config.api.rest_url(), config.api.timeout_ms)
        .context("building REST client")?;
    let exchange = Arc::new(WooExchange::new(client));

    if !exchange.is_healthy().await {
        warn!("exchange REST endpoint unreachable at startup, continuing");
    }
    match exchange.balances().await {
        Ok(balances) => info!(?balances, "account balances"),
        Err(e) => warn!(error = %e, "balance query failed, continuing"),
    }

    // 4. Metrics and monitoring server
    let metrics = Arc::new(MetricsRegistry::new()?);
    let (ready_tx, ready_rx) = watch::channel(false);
    if config.metrics.enabled {
        let bind = config.metrics.bind_address.clone();
        let metrics_for_server = Arc::clone(&metrics);
        tokio::spawn(async move {
            if let Err(e) = health::serve(bind, metrics_for_server, ready_rx).await {
                error!(error = %e, "monitoring server exited");
            }
        });
    }

    // 5. Feeds
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let quote_feed = QuoteFeed::new(
        config.api.ws_public_url(&application_id),
        config.market.symbol.clone(),
    );
    let fill_feed = FillFeed::new(config.api.ws_private_url(&application_id), auth);
    let price_rx = quote_feed.subscribe();
    let fill_rx = fill_feed.subscribe();
    let supervisor = FeedSupervisor::spawn(
        quote_feed,
        fill_feed,
        Arc::clone(&metrics),
        ready_tx,
        &shutdown_tx,
    );

    // 6. Coordinator
    let market_maker = Arc::new(MarketMaker::new(
        Arc::clone(&exchange),
        config.market.symbol.clone(),
        config.grid.to_spec(),
        Duration::from_millis(config.engine.refresh_ms),
        Duration::from_millis(config.engine.order_interval_ms),
        config.bot.dry_run,
        Arc::clone(&metrics),
    ));
    let mm_handle = tokio::spawn(Arc::clone(&market_maker).run(
        price_rx,
        fill_rx,
        shutdown_tx.clone(),
    ));

    // 7. Run until a termination signal arrives
    wait_for_signal().await?;
    info!("shutdown signal received");

    // 8. Shutdown: stop the loops, then wipe the book exactly once
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(SHUTDOWN_GRACE, mm_handle).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "coordinator task failed"),
        Err(_) => warn!("coordinator did not stop in time"),
    }
    if tokio::time::timeout(SHUTDOWN_GRACE, supervisor.join())
        .await
        .is_err()
    {
        warn!("feeds did not stop in time");
    }

    if let Err(e) = market_maker.shutdown().await {
        error!(error = %e, "final cancel-all failed, resting orders may remain");
    }

    info!("shutdown complete");
    Ok(())
}

async fn wait_for_signal() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt()).context("installing SIGINT handler")?;
    let mut sigterm = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
    Ok(())
}
