mod cancel;
pub mod consumption;
pub mod error;
pub mod matcher;
pub mod models;
pub mod segment;
pub mod spatial;
pub mod weather;

pub use consumption::{
    consumption_for_route, route_segments, total_consumption, ConsumptionEstimator,
    FuelSampleRepository,
};
pub use error::{BoxError, Error, Kind, Result};
pub use matcher::{closest_sample, match_consumption};
pub use models::{FuelSample, Route, Segment, VesselId, Waypoint, MINUTES_PER_DAY};
pub use segment::segment;
pub use spatial::distance_nm;
pub use weather::{enrich_weather, WeatherLookup};
pub use tokio_util::sync::CancellationToken;
