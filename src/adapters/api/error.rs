//! Typed errors for the WOO X REST adapter.

use thiserror::Error;

/// Errors surfaced by the signed REST client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Authentication rejected by the exchange (HTTP 401/403).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The exchange accepted the request but reported failure in the
    /// response body (`success == false`).
    #[error("exchange rejected request (code {code}): {message}")]
    Exchange { code: i64, message: String },

    /// The response body did not have the expected shape.
    #[error("protocol error: {0}")]
    Protocol(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_error_display() {
        let err = ApiError::Exchange {
            code: -1101,
            message: "insufficient margin".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("-1101"));
        assert!(text.contains("insufficient margin"));
    }

    #[test]
    fn test_auth_error_display() {
        let err = ApiError::Auth("invalid signature".to_string());
        assert!(err.to_string().contains("invalid signature"));
    }
}
