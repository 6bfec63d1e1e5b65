//! LinkLens Storage Layer
//!
//! SQLite-based persistence for cleaning statistics. Increments are
//! serialized through a single connection so no update is lost.

mod database;
mod error;
mod migrations;
mod stats;

pub use database::Database;
pub use error::StorageError;
pub use stats::{StatsSnapshot, StatsStore};

pub type Result<T> = std::result::Result<T, StorageError>;
