//! Persistence layer for the vessel server.
//!
//! Provides SQLite-backed storage for historical fuel samples.

pub mod db;
pub mod fuel_samples;

pub use db::{init_database, Database};
pub use fuel_samples::SqliteFuelRepository;
