//! Shared library surface for the vessel server and its tools.

pub mod api;
pub mod backoff;
pub mod cache;
pub mod config;
pub mod persistence;
pub mod state;
pub mod weather;
