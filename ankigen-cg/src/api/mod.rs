//! HTTP API handlers for ankigen-cg
//!
//! Thin adapter over the generation core: wire formats, status-code mapping,
//! and input validation live here and nowhere deeper.

pub mod decks;
pub mod generation;
pub mod health;

pub use decks::deck_routes;
pub use generation::generation_routes;
pub use health::health_routes;
