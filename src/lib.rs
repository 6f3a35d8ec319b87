//! Grid market-making bot for WOO X perpetual futures.
//!
//! Quotes a symmetric ladder of limit orders around the live mid-price
//! and re-quotes on a fixed cadence, reacting to fills with a single
//! opposite-side order. Hexagonal layout:
//!
//! - `domain`: pure grid math and market types
//! - `ports`: traits and events the usecases depend on
//! - `usecases`: the market-maker coordinator
//! - `adapters`: WOO X REST/WebSocket implementations and monitoring
//! - `config`: TOML configuration

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
