//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) and event types that the
//! usecases layer requires from the outside world. Adapters
//! implement these traits.
//!
//! Port categories:
//! - `Execution`: authenticated order placement and account queries
//! - `market_stream`: normalized streaming events (quotes, fills)

pub mod execution;
pub mod market_stream;
