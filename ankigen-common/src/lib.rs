//! # ankigen Common Library
//!
//! Shared code for the ankigen services including:
//! - Error types
//! - Configuration loading and root folder resolution
//! - Database bootstrap (SQLite pool + schema)

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
