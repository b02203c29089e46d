//! Database bootstrap for ankigen
//!
//! Shared SQLite access: pool initialization and schema creation.

pub mod init;

pub use init::{init_database_pool, init_tables};
