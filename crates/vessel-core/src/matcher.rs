//! Nearest-neighbour matching of segments against fuel samples.

use crate::error::{Error, Result};
use crate::models::{FuelSample, Segment};
use std::cmp::Ordering;

/// Pick the fuel sample closest to the segment's conditions.
///
/// Weather distance decides first, speed distance breaks ties. Remaining
/// ties keep the earliest candidate. The candidate list is only read, so the
/// same slice can be shared by every segment of a request.
pub fn closest_sample<'a>(
    weather_beaufort: f64,
    speed_knots: f64,
    candidates: &'a [FuelSample],
) -> Option<&'a FuelSample> {
    let distance = |sample: &FuelSample| {
        (
            (sample.weather_beaufort - weather_beaufort).abs(),
            (sample.speed_knots - speed_knots).abs(),
        )
    };

    candidates.iter().fold(None, |best, candidate| match best {
        None => Some(candidate),
        Some(current) => {
            if compare(distance(candidate), distance(current)) == Ordering::Less {
                Some(candidate)
            } else {
                Some(current)
            }
        }
    })
}

fn compare(a: (f64, f64), b: (f64, f64)) -> Ordering {
    a.0.total_cmp(&b.0).then_with(|| a.1.total_cmp(&b.1))
}

/// Expected daily consumption for the segment at `index` of its route.
pub fn match_consumption(index: usize, segment: &Segment, candidates: &[FuelSample]) -> Result<f64> {
    closest_sample(segment.avg_weather_beaufort, segment.avg_speed_knots, candidates)
        .map(|sample| sample.consumption)
        .ok_or(Error::EmptyCandidates { index })
}
