//! Spatial math for segment distances.

use std::f64::consts::PI;

/// Historical degrees-of-arc to nautical miles chain (statute miles first).
/// Applied step by step so results stay bit-compatible with existing tables.
fn degrees_to_nm(degrees: f64) -> f64 {
    degrees * 60.0 * 1.1515 * 0.8684
}

/// Great-circle distance in nautical miles (spherical law of cosines).
pub fn distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let rad_lat1 = PI * lat1 / 180.0;
    let rad_lat2 = PI * lat2 / 180.0;
    let rad_theta = PI * (lon1 - lon2) / 180.0;

    let cos_angle =
        rad_lat1.sin() * rad_lat2.sin() + rad_lat1.cos() * rad_lat2.cos() * rad_theta.cos();
    // rounding can push the argument just above 1.0 for coincident points
    let angle = cos_angle.min(1.0).acos();

    degrees_to_nm(angle * 180.0 / PI)
}

/// Average speed in knots for a distance covered in the given minutes.
pub fn speed_knots(distance_nm: f64, elapsed_minutes: f64) -> f64 {
    distance_nm * 60.0 / elapsed_minutes
}

/// Latitude change (degrees) needed to travel the given nautical miles due north.
pub fn nm_to_lat_degrees(distance_nm: f64) -> f64 {
    distance_nm / degrees_to_nm(1.0)
}
