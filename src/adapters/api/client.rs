//! Signed HTTP transport for the WOO X REST API.
//!
//! Thin wrapper over `reqwest` that stamps, signs and dispatches one
//! request per call. No retries happen here: the quoting cycle
//! re-quotes every few seconds anyway, so a failed request is logged
//! by the caller and superseded by the next cycle.

use chrono::Utc;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use super::auth::WooAuth;
use super::error::ApiError;

/// Signed WOO X REST client.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    auth: WooAuth,
}

impl RestClient {
    /// Create a client for `base_url` with the given request timeout.
    pub fn new(auth: WooAuth, base_url: String, timeout_ms: u64) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    /// Credentials in use, shared with the private stream adapter.
    pub fn auth(&self) -> &WooAuth {
        &self.auth
    }

    /// Signed GET request.
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        let timestamp = now_ms();
        let signature = self.auth.sign(timestamp, "");
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header("x-api-key", self.auth.api_key())
            .header("x-api-signature", signature)
            .header("x-api-timestamp", timestamp.to_string())
            .send()
            .await?;
        self.parse_response(path, response).await
    }

    /// Signed DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let timestamp = now_ms();
        let signature = self.auth.sign(timestamp, "");
        let response = self
            .http
            .delete(format!("{}{path}", self.base_url))
            .header("x-api-key", self.auth.api_key())
            .header("x-api-signature", signature)
            .header("x-api-timestamp", timestamp.to_string())
            .send()
            .await?;
        self.parse_response(path, response).await
    }

    /// Signed POST with an url-encoded form body.
    ///
    /// The signature covers the exact encoded body, so the body is
    /// built here and sent verbatim rather than through `reqwest`'s
    /// form serializer.
    pub async fn post_form(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let content = encode_form(params);
        let timestamp = now_ms();
        let signature = self.auth.sign(timestamp, &content);
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .header("x-api-key", self.auth.api_key())
            .header("x-api-signature", signature)
            .header("x-api-timestamp", timestamp.to_string())
            .header("content-type", "application/x-www-form-urlencoded")
            .body(content)
            .send()
            .await?;
        self.parse_response(path, response).await
    }

    /// Unsigned probe of a public endpoint, used for health checks.
    pub async fn ping(&self) -> bool {
        self.http
            .get(format!("{}/v1/public/system_info", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn parse_response(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<Value, ApiError> {
        let status = response.status();
        let text = response.text().await?;
        debug!(path, %status, body = %text, "api response");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Auth(text));
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::Protocol(format!("invalid json from {path}: {e}")))?;

        // WOO X reports failures in-band with success == false
        if body.get("success").and_then(Value::as_bool) == Some(false) {
            let code = body.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(&text)
                .to_string();
            return Err(ApiError::Exchange { code, message });
        }

        Ok(body)
    }
}

fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Url-encode a form body with keys in the order given.
///
/// WOO X parameter values (symbols, sides, decimal numbers) contain no
/// reserved characters, so plain `key=value` joining is sufficient and
/// keeps the signed content byte-identical to the request body.
fn encode_form(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_form_preserves_order() {
        let body = encode_form(&[
            ("symbol", "PERP_BTC_USDT".to_string()),
            ("order_type", "LIMIT".to_string()),
            ("side", "BUY".to_string()),
            ("order_price", "29991".to_string()),
            ("order_quantity", "0.01".to_string()),
        ]);
        assert_eq!(
            body,
            "symbol=PERP_BTC_USDT&order_type=LIMIT&side=BUY&order_price=29991&order_quantity=0.01"
        );
    }

    #[test]
    fn test_encode_form_empty() {
        assert_eq!(encode_form(&[]), "");
    }
}
