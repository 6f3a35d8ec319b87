//! WOO X REST API adapters.
//!
//! - `auth`: credentials and HMAC-SHA256 request signing
//! - `error`: typed API error taxonomy
//! - `client`: signed HTTP transport over `reqwest`
//! - `exchange`: the `Execution` port implementation

pub mod auth;
pub mod client;
pub mod error;
pub mod exchange;

pub use auth::WooAuth;
pub use client::RestClient;
pub use error::ApiError;
pub use exchange::WooExchange;
