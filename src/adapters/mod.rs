//! Adapters Layer - External System Implementations
//!
//! Concrete implementations of the port traits defined in `ports/`.
//! This is the only layer that performs network I/O.
//!
//! Adapter categories:
//! - `api`: signed WOO X REST access and the `Execution` implementation
//! - `feeds`: WebSocket market data and execution report streams
//! - `metrics`: Prometheus registry and the monitoring HTTP server

pub mod api;
pub mod feeds;
pub mod metrics;
