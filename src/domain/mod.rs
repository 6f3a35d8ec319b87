//! Domain layer - Core business logic and models.
//!
//! Pure quoting logic and market types for the WOO X grid bot.
//! No external dependencies allowed here (hexagonal architecture inner ring).
//! All types are serializable and testable in isolation.

pub mod grid;
pub mod market;

// Re-export core types for convenience
pub use grid::{GridLevel, GridSpec};
pub use market::{OrderRequest, Position, Side};
