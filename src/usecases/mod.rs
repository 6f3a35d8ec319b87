//! Usecases Layer - Trading Orchestration
//!
//! Business logic that composes the domain quote engine with the
//! execution and stream ports. Depends on traits only, never on
//! concrete adapters, so every usecase is testable with mocks.

pub mod market_maker;

pub use market_maker::MarketMaker;
