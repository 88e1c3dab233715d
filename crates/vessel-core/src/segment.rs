//! Splits a route into point-to-point segments.

use crate::error::{Error, Result};
use crate::models::{Segment, Waypoint};
use crate::spatial::{distance_nm, speed_knots};

/// Build one segment per pair of consecutive waypoints.
///
/// The route is expected to be sorted by time already; waypoints are never
/// reordered. A route with fewer than two waypoints has no segments.
///
/// Returns an error if a waypoint has coordinates outside the valid range,
/// or if a segment does not move forward in time (speed would be undefined).
pub fn segment(route: &[Waypoint]) -> Result<Vec<Segment>> {
    if let Some((index, wp)) = route
        .iter()
        .enumerate()
        .find(|(_, wp)| !wp.has_valid_coordinates())
    {
        return Err(Error::InvalidCoordinates {
            index,
            latitude: wp.latitude,
            longitude: wp.longitude,
        });
    }

    route
        .windows(2)
        .enumerate()
        .map(|(index, pair)| build_segment(index, pair[0], pair[1]))
        .collect()
}

fn build_segment(index: usize, source: Waypoint, destination: Waypoint) -> Result<Segment> {
    let elapsed_minutes = elapsed_minutes(&source, &destination);
    if elapsed_minutes <= 0.0 {
        tracing::warn!(
            segment = index,
            elapsed_minutes,
            "rejecting segment that does not move forward in time"
        );
        return Err(Error::NonPositiveElapsed {
            index,
            elapsed_minutes,
        });
    }

    let distance = distance_nm(
        source.latitude,
        source.longitude,
        destination.latitude,
        destination.longitude,
    );

    Ok(Segment {
        source,
        destination,
        elapsed_minutes,
        avg_speed_knots: speed_knots(distance, elapsed_minutes),
        avg_weather_beaufort: 0.0,
        avg_daily_consumption: 0.0,
        exact_consumption: 0.0,
    })
}

fn elapsed_minutes(source: &Waypoint, destination: &Waypoint) -> f64 {
    let elapsed = destination.timestamp - source.timestamp;
    elapsed.num_milliseconds() as f64 / 60_000.0
}
