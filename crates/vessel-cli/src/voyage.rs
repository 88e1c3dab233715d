//! Synthetic voyages for exercising the estimation API.

use chrono::{DateTime, Duration, Utc};
use vessel_core::{distance_nm, Route, Waypoint};

const MILLISECOND_IN_MINUTES: f64 = 1.0 / 60_000.0;

/// Straight voyage between two positions at constant speed.
#[derive(Debug, Clone)]
pub struct LinearVoyage {
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
    pub speed_knots: f64,
    pub departure: DateTime<Utc>,
    pub distance_nm: f64,
    /// Minutes from departure to arrival
    pub duration_minutes: f64,
}

impl LinearVoyage {
    pub fn new(
        start_lat: f64,
        start_lon: f64,
        end_lat: f64,
        end_lon: f64,
        speed_knots: f64,
        departure: DateTime<Utc>,
    ) -> Self {
        let distance_nm = distance_nm(start_lat, start_lon, end_lat, end_lon);
        let duration_minutes = if speed_knots > 0.0 {
            distance_nm / speed_knots * 60.0
        } else {
            0.0
        };

        Self {
            start_lat,
            start_lon,
            end_lat,
            end_lon,
            speed_knots,
            departure,
            distance_nm,
            duration_minutes,
        }
    }

    /// Position and timestamp `minutes` after departure, clamped to the voyage.
    pub fn waypoint_at(&self, minutes: f64) -> Waypoint {
        let minutes = minutes.clamp(0.0, self.duration_minutes);
        let progress = if self.duration_minutes > 0.0 {
            minutes / self.duration_minutes
        } else {
            0.0
        };

        let lat = self.start_lat + progress * (self.end_lat - self.start_lat);
        let lon = self.start_lon + progress * (self.end_lon - self.start_lon);
        let timestamp = self.departure + Duration::milliseconds((minutes * 60_000.0).round() as i64);

        Waypoint::new(timestamp, lat, lon)
    }

    /// Waypoints every `interval_minutes`, always ending at arrival.
    pub fn route(&self, interval_minutes: f64) -> Route {
        let mut waypoints = vec![self.waypoint_at(0.0)];
        if self.duration_minutes <= 0.0 || interval_minutes <= 0.0 {
            return Route::new(waypoints);
        }

        // Timestamps have millisecond resolution; a step closer than that to
        // arrival would repeat the arrival time.
        let mut t = interval_minutes;
        while self.duration_minutes - t >= MILLISECOND_IN_MINUTES {
            waypoints.push(self.waypoint_at(t));
            t += interval_minutes;
        }
        waypoints.push(self.waypoint_at(self.duration_minutes));

        Route::new(waypoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use vessel_core::spatial::nm_to_lat_degrees;

    fn departure() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn sixty_miles_north_at_twelve_knots_takes_five_hours() {
        let voyage = LinearVoyage::new(0.0, 0.0, nm_to_lat_degrees(60.0), 0.0, 12.0, departure());
        assert!((voyage.distance_nm - 60.0).abs() < 1e-6);
        assert!((voyage.duration_minutes - 300.0).abs() < 1e-4);
    }

    #[test]
    fn route_starts_at_departure_and_ends_at_arrival() {
        let voyage = LinearVoyage::new(10.0, 20.0, 11.0, 21.0, 10.0, departure());
        let route = voyage.route(60.0);
        let waypoints = route.waypoints();

        let first = waypoints.first().unwrap();
        let last = waypoints.last().unwrap();
        assert_eq!(first.timestamp, departure());
        assert_eq!((first.latitude, first.longitude), (10.0, 20.0));
        assert!((last.latitude - 11.0).abs() < 1e-9);
        assert!((last.longitude - 21.0).abs() < 1e-9);
        assert!(waypoints.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn step_landing_just_before_arrival_is_dropped() {
        let voyage = LinearVoyage {
            duration_minutes: 120.000_004,
            ..LinearVoyage::new(10.0, 20.0, 11.0, 20.0, 12.0, departure())
        };

        let route = voyage.route(60.0);
        let waypoints = route.waypoints();
        assert_eq!(waypoints.len(), 3);
        assert!(waypoints.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn stationary_voyage_has_single_waypoint() {
        let voyage = LinearVoyage::new(10.0, 20.0, 10.0, 20.0, 10.0, departure());
        assert_eq!(voyage.route(60.0).len(), 1);

        let stopped = LinearVoyage::new(10.0, 20.0, 11.0, 20.0, 0.0, departure());
        assert_eq!(stopped.route(60.0).len(), 1);
    }
}
