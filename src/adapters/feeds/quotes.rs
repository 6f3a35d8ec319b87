//! Public best-bid/offer stream.
//!
//! Connects to the WOO X public stream, subscribes to `{SYMBOL}@bbo`
//! and broadcasts normalized `PriceUpdate`s. Reconnects forever with
//! bounded backoff; server pings are answered inline so the gateway
//! never drops the session for idleness.

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::ports::market_stream::{ConnectionState, PriceUpdate};

use super::backoff_delay;

const TICK_CHANNEL_CAPACITY: usize = 256;

/// Public quote stream adapter.
pub struct QuoteFeed {
    url: String,
    symbol: String,
    tick_tx: broadcast::Sender<PriceUpdate>,
    state_tx: watch::Sender<ConnectionState>,
}

impl QuoteFeed {
    pub fn new(url: String, symbol: String) -> Self {
        let (tick_tx, _) = broadcast::channel(TICK_CHANNEL_CAPACITY);
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            url,
            symbol,
            tick_tx,
            state_tx,
        }
    }

    /// Subscribe to normalized price updates.
    pub fn subscribe(&self) -> broadcast::Receiver<PriceUpdate> {
        self.tick_tx.subscribe()
    }

    /// Observe the feed connection state.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Run the feed until shutdown. Never returns on connection
    /// failure; every failure is a backoff and a reconnect.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut attempt: u32 = 0;
        loop {
            self.state_tx.send_replace(ConnectionState::Connecting);
            match self.session(&mut shutdown, &mut attempt).await {
                SessionEnd::Shutdown => {
                    self.state_tx.send_replace(ConnectionState::Disconnected);
                    info!(symbol = %self.symbol, "quote feed stopped");
                    return;
                }
                SessionEnd::Dropped(reason) => {
                    self.state_tx.send_replace(ConnectionState::Disconnected);
                    let delay = backoff_delay(attempt);
                    warn!(
                        symbol = %self.symbol,
                        %reason,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "quote feed disconnected, reconnecting"
                    );
                    attempt = attempt.saturating_add(1);
                    tokio::select! {
                        () = tokio::time::sleep(delay) => {}
                        _ = shutdown.recv() => {
                            self.state_tx.send_replace(ConnectionState::Disconnected);
                            return;
                        }
                    }
                }
            }
        }
    }

    async fn session(
        &self,
        shutdown: &mut broadcast::Receiver<()>,
        attempt: &mut u32,
    ) -> SessionEnd {
        let (stream, _) = match connect_async(self.url.as_str()).await {
            Ok(ok) => ok,
            Err(e) => return SessionEnd::Dropped(format!("connect failed: {e}")),
        };
        let (mut write, mut read) = stream.split();

        let subscribe = json!({
            "event": "subscribe",
            "topic": format!("{}@bbo", self.symbol),
        });
        if let Err(e) = write.send(Message::Text(subscribe.to_string())).await {
            return SessionEnd::Dropped(format!("subscribe failed: {e}"));
        }

        self.state_tx.send_replace(ConnectionState::Subscribed);
        *attempt = 0;
        info!(symbol = %self.symbol, url = %self.url, "quote feed subscribed");

        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        if is_server_ping(&text) {
                            let pong = json!({"event": "pong", "ts": now_ms()});
                            if let Err(e) = write.send(Message::Text(pong.to_string())).await {
                                return SessionEnd::Dropped(format!("pong failed: {e}"));
                            }
                            continue;
                        }
                        if let Some(update) = normalize_quote(&text) {
                            // Lagging receivers drop old ticks, which is
                            // the right behavior for a latest-price feed.
                            let _ = self.tick_tx.send(update);
                        } else {
                            debug!(symbol = %self.symbol, "discarded non-quote frame");
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if let Err(e) = write.send(Message::Pong(payload)).await {
                            return SessionEnd::Dropped(format!("pong failed: {e}"));
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        return SessionEnd::Dropped("stream closed".to_string());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return SessionEnd::Dropped(format!("read error: {e}"));
                    }
                },
                _ = shutdown.recv() => return SessionEnd::Shutdown,
            }
        }
    }
}

enum SessionEnd {
    Shutdown,
    Dropped(String),
}

fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Detect the gateway's application-level ping frame.
pub(crate) fn is_server_ping(text: &str) -> bool {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("event").and_then(Value::as_str).map(str::to_string))
        .is_some_and(|e| e == "ping")
}

/// Normalize a raw `@bbo` frame into a `PriceUpdate`.
///
/// Frames without a `data` object (subscription acks, unknown topics)
/// yield `None` and are discarded by the caller.
pub fn normalize_quote(text: &str) -> Option<PriceUpdate> {
    let msg: Value = serde_json::from_str(text).ok()?;
    let data = msg.get("data")?;

    let best_bid = data.get("bid")?.as_f64()?;
    let best_ask = data.get("ask")?.as_f64()?;
    let symbol = data.get("symbol")?.as_str()?.to_string();

    Some(PriceUpdate {
        symbol,
        best_bid,
        best_ask,
        bid_size: data.get("bidSize").and_then(Value::as_f64).unwrap_or(0.0),
        ask_size: data.get("askSize").and_then(Value::as_f64).unwrap_or(0.0),
        mid_price: (best_bid + best_ask) / 2.0,
        timestamp_ms: msg
            .get("ts")
            .and_then(Value::as_u64)
            .unwrap_or_else(now_ms),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_quote_computes_mid() {
        let frame = r#"{
            "topic": "PERP_BTC_USDT@bbo",
            "ts": 1700000000000,
            "data": {
                "symbol": "PERP_BTC_USDT",
                "bid": 100.0,
                "bidSize": 2.5,
                "ask": 102.0,
                "askSize": 1.5
            }
        }"#;
        let update = normalize_quote(frame).unwrap();
        assert_eq!(update.symbol, "PERP_BTC_USDT");
        assert_eq!(update.best_bid, 100.0);
        assert_eq!(update.best_ask, 102.0);
        assert_eq!(update.mid_price, 101.0);
        assert_eq!(update.bid_size, 2.5);
        assert_eq!(update.ask_size, 1.5);
        assert_eq!(update.timestamp_ms, 1_700_000_000_000);
    }

    #[test]
    fn test_frames_without_data_are_discarded() {
        assert!(normalize_quote(r#"{"event":"subscribe","success":true}"#).is_none());
        assert!(normalize_quote(r#"{"topic":"PERP_BTC_USDT@bbo"}"#).is_none());
        assert!(normalize_quote("not json").is_none());
    }

    #[test]
    fn test_partial_data_is_discarded() {
        // ask missing
        let frame = r#"{"data":{"symbol":"PERP_BTC_USDT","bid":100.0}}"#;
        assert!(normalize_quote(frame).is_none());
    }

    #[test]
    fn test_server_ping_detection() {
        assert!(is_server_ping(r#"{"event":"ping","ts":1700000000000}"#));
        assert!(!is_server_ping(r#"{"event":"subscribe"}"#));
        assert!(!is_server_ping("garbage"));
    }
}
