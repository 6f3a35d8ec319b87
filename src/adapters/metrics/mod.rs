//! Monitoring adapters.
//!
//! - `prometheus`: metric registry shared across the bot
//! - `health`: HTTP server exposing /metrics, /live and /ready

pub mod health;
pub mod prometheus;

pub use prometheus::MetricsRegistry;
