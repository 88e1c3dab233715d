//! Vessel CLI - Command line tools for the vessel fuel estimation service.
//!
//! - estimate_route: submit routes and print fuel and CO2 per route

pub mod client;
pub mod voyage;

pub use client::{EstimateRequest, RouteConsumption, VesselClient};
pub use voyage::LinearVoyage;
