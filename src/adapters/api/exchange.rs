//! `Execution` port implementation for WOO X.
//!
//! Maps the five port operations onto WOO X REST endpoints:
//!
//! | operation           | endpoint                      |
//! |---------------------|-------------------------------|
//! | `place_order`       | `POST /v1/order`              |
//! | `cancel_all_orders` | `DELETE /v3/orders/pending`   |
//! | `position`          | `GET /v1/position/{symbol}`   |
//! | `balances`          | `GET /v1/client/holding`      |

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::domain::market::OrderRequest;
use crate::ports::execution::{CancelAck, Execution, OrderAck};

use super::client::RestClient;

/// Authenticated WOO X exchange client.
pub struct WooExchange {
    client: RestClient,
}

impl WooExchange {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Execution for WooExchange {
    async fn place_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        let params = [
            ("symbol", order.symbol.clone()),
            ("order_type", "LIMIT".to_string()),
            ("side", order.side.as_exchange_str().to_string()),
            ("order_price", order.price.to_string()),
            ("order_quantity", order.size.to_string()),
        ];
        let body = self
            .client
            .post_form("/v1/order", &params)
            .await
            .with_context(|| {
                format!(
                    "placing {} {} @ {} x {}",
                    order.side, order.symbol, order.price, order.size
                )
            })?;

        let ack = OrderAck {
            success: body.get("success").and_then(Value::as_bool).unwrap_or(true),
            order_id: body.get("order_id").and_then(Value::as_u64),
            status: body
                .get("order_status")
                .and_then(Value::as_str)
                .map(str::to_string),
        };
        info!(
            symbol = %order.symbol,
            side = %order.side,
            price = order.price,
            size = order.size,
            order_id = ?ack.order_id,
            "order placed"
        );
        Ok(ack)
    }

    async fn cancel_all_orders(&self) -> Result<CancelAck> {
        let body = self
            .client
            .delete("/v3/orders/pending")
            .await
            .context("cancelling all pending orders")?;
        Ok(CancelAck {
            success: body.get("success").and_then(Value::as_bool).unwrap_or(true),
            status: body
                .pointer("/data/status")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    async fn position(&self, symbol: &str) -> Result<f64> {
        let body = self
            .client
            .get(&format!("/v1/position/{symbol}"))
            .await
            .with_context(|| format!("querying position for {symbol}"))?;
        // An account without a holding record answers with a bare
        // success body; that reads as a flat position.
        Ok(body.get("holding").and_then(Value::as_f64).unwrap_or(0.0))
    }

    async fn balances(&self) -> Result<HashMap<String, f64>> {
        let body = self
            .client
            .get("/v1/client/holding")
            .await
            .context("querying account balances")?;
        let mut balances = HashMap::new();
        if let Some(holding) = body.get("holding").and_then(Value::as_object) {
            for (token, amount) in holding {
                if let Some(amount) = amount.as_f64() {
                    balances.insert(token.clone(), amount);
                }
            }
        }
        Ok(balances)
    }

    async fn is_healthy(&self) -> bool {
        self.client.ping().await
    }
}
