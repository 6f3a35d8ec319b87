//! Private execution-report stream.
//!
//! Authenticates against the private WOO X stream, subscribes to
//! `executionreport` and broadcasts a `FillEvent` for every report
//! with status `FILLED`. All other lifecycle statuses (NEW,
//! PARTIAL_FILLED, CANCELLED, REJECTED) are dropped at this boundary
//! so the coordinator only ever reacts to completed executions.

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::adapters::api::WooAuth;
use crate::domain::market::Side;
use crate::ports::market_stream::{ConnectionState, FillEvent};

use super::backoff_delay;
use super::quotes::is_server_ping;

const FILL_CHANNEL_CAPACITY: usize = 256;

/// Private execution-report stream adapter.
pub struct FillFeed {
    url: String,
    auth: WooAuth,
    fill_tx: broadcast::Sender<FillEvent>,
    state_tx: watch::Sender<ConnectionState>,
}

impl FillFeed {
    pub fn new(url: String, auth: WooAuth) -> Self {
        let (fill_tx, _) = broadcast::channel(FILL_CHANNEL_CAPACITY);
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            url,
            auth,
            fill_tx,
            state_tx,
        }
    }

    /// Subscribe to completed fills.
    pub fn subscribe(&self) -> broadcast::Receiver<FillEvent> {
        self.fill_tx.subscribe()
    }

    /// Observe the feed connection state.
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Run the feed until shutdown, reconnecting on every failure.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut attempt: u32 = 0;
        loop {
            self.state_tx.send_replace(ConnectionState::Connecting);
            match self.session(&mut shutdown, &mut attempt).await {
                SessionEnd::Shutdown => {
                    self.state_tx.send_replace(ConnectionState::Disconnected);
                    info!("fill feed stopped");
                    return;
                }
                SessionEnd::Dropped(reason) => {
                    self.state_tx.send_replace(ConnectionState::Disconnected);
                    let delay = backoff_delay(attempt);
                    warn!(
                        %reason,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "fill feed disconnected, reconnecting"
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

        // The private stream requires an auth frame before any
        // subscription is accepted.
        let timestamp = now_ms();
        let auth_frame = json!({
            "event": "auth",
            "params": {
                "apikey": self.auth.api_key(),
                "sign": self.auth.sign(timestamp, ""),
                "timestamp": timestamp,
            }
        });
        if let Err(e) = write.send(Message::Text(auth_frame.to_string())).await {
            return SessionEnd::Dropped(format!("auth failed: {e}"));
        }

        let subscribe = json!({"event": "subscribe", "topic": "executionreport"});
        if let Err(e) = write.send(Message::Text(subscribe.to_string())).await {
            return SessionEnd::Dropped(format!("subscribe failed: {e}"));
        }

        self.state_tx.send_replace(ConnectionState::Subscribed);
        *attempt = 0;
        info!(url = %self.url, "fill feed subscribed");

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
                        if let Some(fill) = normalize_fill(&text) {
                            info!(
                                symbol = %fill.symbol,
                                side = %fill.side,
                                price = fill.price,
                                quantity = fill.quantity,
                                "fill received"
                            );
                            let _ = self.fill_tx.send(fill);
                        } else {
                            debug!("discarded non-fill frame");
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

/// Normalize an execution-report frame into a `FillEvent`.
///
/// Returns `None` for frames without a `data` object, for reports in
/// any status other than `FILLED`, and for unparseable sides.
pub fn normalize_fill(text: &str) -> Option<FillEvent> {
    let msg: Value = serde_json::from_str(text).ok()?;
    let data = msg.get("data")?;

    if data.get("status").and_then(Value::as_str) != Some("FILLED") {
        return None;
    }

    let side = Side::from_exchange_str(data.get("side")?.as_str()?)?;

    Some(FillEvent {
        symbol: data.get("symbol")?.as_str()?.to_string(),
        side,
        price: data.get("executedPrice")?.as_f64()?,
        quantity: data.get("executedQuantity")?.as_f64()?,
        timestamp_ms: msg
            .get("ts")
            .and_then(Value::as_u64)
            .unwrap_or_else(now_ms),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: &str) -> String {
        format!(
            r#"{{
                "topic": "executionreport",
                "ts": 1700000000500,
                "data": {{
                    "symbol": "PERP_BTC_USDT",
                    "side": "BUY",
                    "status": "{status}",
                    "executedPrice": 29991.0,
                    "executedQuantity": 0.01
                }}
            }}"#
        )
    }

    #[test]
    fn test_filled_report_is_normalized() {
        let fill = normalize_fill(&report("FILLED")).unwrap();
        assert_eq!(fill.symbol, "PERP_BTC_USDT");
        assert_eq!(fill.side, Side::Bid);
        assert_eq!(fill.price, 29_991.0);
        assert_eq!(fill.quantity, 0.01);
        assert_eq!(fill.timestamp_ms, 1_700_000_000_500);
    }

    #[test]
    fn test_non_filled_statuses_are_dropped() {
        for status in ["NEW", "PARTIAL_FILLED", "CANCELLED", "REJECTED"] {
            assert!(normalize_fill(&report(status)).is_none(), "{status}");
        }
    }

    #[test]
    fn test_frames_without_data_are_dropped() {
        assert!(normalize_fill(r#"{"event":"auth","success":true}"#).is_none());
        assert!(normalize_fill("garbage").is_none());
    }

    #[test]
    fn test_sell_side_maps_to_ask() {
        let frame = report("FILLED").replace("\"BUY\"", "\"SELL\"");
        assert_eq!(normalize_fill(&frame).unwrap().side, Side::Ask);
    }

    #[test]
    fn test_unknown_side_is_dropped() {
        let frame = report("FILLED").replace("\"BUY\"", "\"HOLD\"");
        assert!(normalize_fill(&frame).is_none());
    }
}
