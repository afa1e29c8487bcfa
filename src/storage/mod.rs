//! SQLite storage layer for the tracker.
//!
//! - WAL mode for concurrent reads
//! - Transaction discipline for atomic writes, including whole-set
//!   replacement on import
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - Main SQLite storage implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStorage;
