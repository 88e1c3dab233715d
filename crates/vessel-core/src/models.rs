//! Core data models for route fuel estimation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// IMO number identifying a vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VesselId(pub i64);

impl std::fmt::Display for VesselId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A single timestamped position reported along a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

impl Waypoint {
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
        }
    }

    pub fn has_valid_coordinates(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Waypoints ordered by time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(pub Vec<Waypoint>);

impl Route {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self(waypoints)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Waypoint>> for Route {
    fn from(waypoints: Vec<Waypoint>) -> Self {
        Self(waypoints)
    }
}

/// The leg between two consecutive waypoints.
///
/// Speed and elapsed time are set when the segment is built. Weather and
/// consumption are filled in by the later passes, in that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub source: Waypoint,
    pub destination: Waypoint,
    pub elapsed_minutes: f64,
    pub avg_speed_knots: f64,
    pub avg_weather_beaufort: f64,
    /// Matched consumption for a full 24 hours at this speed and weather.
    pub avg_daily_consumption: f64,
    /// Daily consumption scaled to the time actually spent on the segment.
    pub exact_consumption: f64,
}

impl Segment {
    /// Record the weather of the segment from its endpoint intensities.
    pub fn apply_weather(&mut self, source_beaufort: f64, destination_beaufort: f64) {
        self.avg_weather_beaufort = if source_beaufort == destination_beaufort {
            source_beaufort
        } else {
            (source_beaufort + destination_beaufort) / 2.0
        };
    }

    /// Record the matched daily consumption and derive the exact one.
    pub fn apply_consumption(&mut self, daily_consumption: f64) {
        self.avg_daily_consumption = daily_consumption;
        self.exact_consumption = daily_consumption * (self.elapsed_minutes / MINUTES_PER_DAY);
    }
}

pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Historical fuel consumption observed for a vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelSample {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(rename = "imo")]
    pub vessel_id: VesselId,
    pub draught: f64,
    #[serde(rename = "beaufort")]
    pub weather_beaufort: f64,
    #[serde(rename = "speed")]
    pub speed_knots: f64,
    pub consumption: f64,
}
