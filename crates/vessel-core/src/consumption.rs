//! Per-route and per-request fuel consumption totals.

use crate::cancel::cancellable;
use crate::error::{BoxError, Error, Result};
use crate::matcher::match_consumption;
use crate::models::{FuelSample, Route, Segment, VesselId};
use crate::segment::segment;
use crate::weather::{enrich_weather, WeatherLookup};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Source of historical fuel samples.
#[async_trait]
pub trait FuelSampleRepository: Send + Sync {
    /// All samples of the vessel recorded at the draught closest to `draught`.
    ///
    /// An empty list means the vessel has no samples at all.
    async fn samples_for_closest_draught(
        &self,
        vessel_id: VesselId,
        draught: f64,
    ) -> std::result::Result<Vec<FuelSample>, BoxError>;
}

/// Total consumption of one route.
///
/// Segments the route, enriches it with weather, matches every segment
/// against `samples` and sums the time-scaled consumption.
pub async fn consumption_for_route(
    route: &Route,
    samples: &[FuelSample],
    weather: &dyn WeatherLookup,
    cancel: &CancellationToken,
) -> Result<f64> {
    let segments = route_segments(route, samples, weather, cancel).await?;
    Ok(total_consumption(&segments))
}

/// The fully computed segments of a route.
pub async fn route_segments(
    route: &Route,
    samples: &[FuelSample],
    weather: &dyn WeatherLookup,
    cancel: &CancellationToken,
) -> Result<Vec<Segment>> {
    let mut segments = segment(route.waypoints())?;
    enrich_weather(&mut segments, weather, cancel).await?;

    for (index, segment) in segments.iter_mut().enumerate() {
        let daily = match_consumption(index, segment, samples)?;
        segment.apply_consumption(daily);
    }

    Ok(segments)
}

pub fn total_consumption(segments: &[Segment]) -> f64 {
    segments.iter().map(|s| s.exact_consumption).sum()
}

/// Estimates fuel consumption for routes of a vessel.
#[derive(Clone)]
pub struct ConsumptionEstimator {
    samples: Arc<dyn FuelSampleRepository>,
    weather: Arc<dyn WeatherLookup>,
}

impl ConsumptionEstimator {
    pub fn new(samples: Arc<dyn FuelSampleRepository>, weather: Arc<dyn WeatherLookup>) -> Self {
        Self { samples, weather }
    }

    /// Consumption of every route, in input order.
    ///
    /// Fuel samples for the closest draught are fetched once and shared by
    /// all routes. The first failing route aborts the whole request and no
    /// partial totals are returned.
    pub async fn estimate_consumption(
        &self,
        vessel_id: VesselId,
        draught: f64,
        routes: &[Route],
        cancel: &CancellationToken,
    ) -> Result<Vec<f64>> {
        let samples = self.fuel_samples(vessel_id, draught, cancel).await?;
        debug!(
            %vessel_id,
            draught,
            samples = samples.len(),
            routes = routes.len(),
            "estimating route consumption"
        );

        let mut totals = Vec::with_capacity(routes.len());
        for (index, route) in routes.iter().enumerate() {
            let total = consumption_for_route(route, &samples, self.weather.as_ref(), cancel)
                .await
                .map_err(|err| err.in_route(index))?;
            debug!(route = index, waypoints = route.len(), total, "route consumption");
            totals.push(total);
        }

        info!(%vessel_id, routes = totals.len(), "estimated route consumption");
        Ok(totals)
    }

    async fn fuel_samples(
        &self,
        vessel_id: VesselId,
        draught: f64,
        cancel: &CancellationToken,
    ) -> Result<Vec<FuelSample>> {
        let samples = cancellable(cancel, "fuel sample lookup", async {
            self.samples
                .samples_for_closest_draught(vessel_id, draught)
                .await
                .map_err(|source| Error::FuelSampleLookup {
                    vessel_id,
                    draught,
                    source,
                })
        })
        .await?;

        if samples.is_empty() {
            return Err(Error::NoFuelSamples { vessel_id, draught });
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;
    use crate::models::Waypoint;
    use crate::weather::tests::{day, TableWeather};
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    const VESSEL: VesselId = VesselId(9_321_483);

    struct StaticSamples {
        samples: Mutex<std::result::Result<Vec<FuelSample>, String>>,
        calls: AtomicUsize,
    }

    impl StaticSamples {
        fn ok(samples: Vec<FuelSample>) -> Self {
            Self {
                samples: Mutex::new(Ok(samples)),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                samples: Mutex::new(Err(message.to_string())),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FuelSampleRepository for StaticSamples {
        async fn samples_for_closest_draught(
            &self,
            _vessel_id: VesselId,
            _draught: f64,
        ) -> std::result::Result<Vec<FuelSample>, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.samples.lock().unwrap().clone().map_err(Into::into)
        }
    }

    fn sample(weather: f64, speed: f64, consumption: f64) -> FuelSample {
        FuelSample {
            id: Uuid::new_v4(),
            vessel_id: VESSEL,
            draught: 11.5,
            weather_beaufort: weather,
            speed_knots: speed,
            consumption,
        }
    }

    fn fuel_table() -> Vec<FuelSample> {
        vec![
            sample(6.0, 14.0, 42.0),
            sample(2.0, 10.0, 24.0),
            sample(2.0, 14.0, 31.0),
            sample(4.0, 12.0, 33.0),
            sample(6.0, 10.0, 36.0),
        ]
    }

    fn weather() -> TableWeather {
        TableWeather::with(&[(day(1), 2.0), (day(2), 4.0), (day(3), 6.0), (day(4), 6.0)])
    }

    /// Route starting 2024-03-01 00:00 with a waypoint every `step_hours`.
    fn route(points: &[(f64, f64)], step_hours: i64) -> Route {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        points
            .iter()
            .enumerate()
            .map(|(i, &(lat, lon))| {
                Waypoint::new(start + Duration::hours(step_hours * i as i64), lat, lon)
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn estimator(samples: Arc<StaticSamples>, weather: Arc<TableWeather>) -> ConsumptionEstimator {
        ConsumptionEstimator::new(samples, weather)
    }

    #[tokio::test]
    async fn route_total_sums_time_scaled_segments() {
        // Two 12 hour legs: day 1 -> day 1 (2.0) and day 1 -> day 2 (avg 3.0)
        let route = route(&[(59.0, 10.0), (59.0, 10.0), (59.0, 10.0)], 12);
        let samples = fuel_table();

        let segments = route_segments(&route, &samples, &weather(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].avg_weather_beaufort, 2.0);
        assert_eq!(segments[1].avg_weather_beaufort, 3.0);
        // stationary, so speed 0 picks the slowest sample at the closest weather
        assert_eq!(segments[0].avg_daily_consumption, 24.0);
        assert_eq!(segments[0].exact_consumption, 12.0);

        let total = consumption_for_route(&route, &samples, &weather(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(total, total_consumption(&segments));
    }

    #[tokio::test]
    async fn short_routes_contribute_nothing() {
        let samples = fuel_table();
        let cancel = CancellationToken::new();

        let empty = consumption_for_route(&Route::default(), &samples, &weather(), &cancel)
            .await
            .unwrap();
        let single = consumption_for_route(&route(&[(59.0, 10.0)], 1), &samples, &weather(), &cancel)
            .await
            .unwrap();
        assert_eq!(empty, 0.0);
        assert_eq!(single, 0.0);
    }

    #[tokio::test]
    async fn empty_route_list_gives_empty_result() {
        let samples = Arc::new(StaticSamples::ok(fuel_table()));
        let estimator = estimator(samples.clone(), Arc::new(weather()));

        let totals = estimator
            .estimate_consumption(VESSEL, 11.0, &[], &CancellationToken::new())
            .await
            .unwrap();
        assert!(totals.is_empty());
        assert_eq!(samples.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn totals_are_aligned_with_routes() {
        let estimator = estimator(
            Arc::new(StaticSamples::ok(fuel_table())),
            Arc::new(weather()),
        );
        let routes = vec![
            route(&[(59.0, 10.0), (59.5, 10.0), (60.0, 10.2)], 6),
            Route::default(),
            route(&[(58.0, 9.0), (58.1, 9.3)], 24),
        ];

        let totals = estimator
            .estimate_consumption(VESSEL, 11.0, &routes, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(totals.len(), routes.len());
        assert!(totals[0] > 0.0);
        assert_eq!(totals[1], 0.0);
        assert!(totals[2] > 0.0);
    }

    #[tokio::test]
    async fn empty_sample_set_is_not_found() {
        let estimator = estimator(Arc::new(StaticSamples::ok(vec![])), Arc::new(weather()));
        let routes = vec![route(&[(59.0, 10.0), (59.5, 10.0)], 6)];

        let err = estimator
            .estimate_consumption(VESSEL, 11.0, &routes, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::NotFound);
        assert!(matches!(err, Error::NoFuelSamples { .. }));
    }

    #[tokio::test]
    async fn repository_failure_is_upstream() {
        let estimator = estimator(
            Arc::new(StaticSamples::failing("database is locked")),
            Arc::new(weather()),
        );

        let err = estimator
            .estimate_consumption(VESSEL, 11.0, &[], &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Upstream);
        assert_eq!(err.causes().last().unwrap(), "database is locked");
    }

    #[tokio::test]
    async fn first_failing_route_aborts_the_request() {
        let weather = Arc::new(weather());
        let estimator = estimator(Arc::new(StaticSamples::ok(fuel_table())), weather.clone());
        let routes = vec![
            route(&[(59.0, 10.0), (59.5, 10.0)], 6),
            // second leg goes back in time
            Route::new(vec![
                Waypoint::new(Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap(), 59.0, 10.0),
                Waypoint::new(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(), 59.1, 10.0),
            ]),
            route(&[(58.0, 9.0), (58.1, 9.3)], 6),
        ];

        let err = estimator
            .estimate_consumption(VESSEL, 11.0, &routes, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::BadInput);
        assert!(matches!(err, Error::Route { index: 1, .. }));
        // only the first route reached the weather lookup
        assert_eq!(weather.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn weather_failure_aborts_with_upstream_kind() {
        let estimator = estimator(
            Arc::new(StaticSamples::ok(fuel_table())),
            Arc::new(TableWeather::with(&[(day(1), 3.0)])),
        );
        let routes = vec![route(&[(59.0, 10.0), (59.5, 10.0)], 30)];

        let err = estimator
            .estimate_consumption(VESSEL, 11.0, &routes, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Upstream);
    }

    #[tokio::test]
    async fn cancelled_request_reports_cancellation() {
        let samples = Arc::new(StaticSamples::ok(fuel_table()));
        let estimator = estimator(samples.clone(), Arc::new(weather()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = estimator
            .estimate_consumption(VESSEL, 11.0, &[], &cancel)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::Cancelled);
        assert_eq!(samples.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn repeated_runs_are_bit_identical() {
        let samples = Arc::new(StaticSamples::ok(fuel_table()));
        let estimator = estimator(samples, Arc::new(weather()));
        let routes = vec![
            route(&[(59.0, 10.0), (59.4, 10.5), (59.9, 10.7), (60.3, 11.0)], 9),
            route(&[(58.0, 9.0), (58.2, 9.6), (58.1, 10.1)], 20),
        ];
        let cancel = CancellationToken::new();

        let first = estimator
            .estimate_consumption(VESSEL, 11.0, &routes, &cancel)
            .await
            .unwrap();
        let second = estimator
            .estimate_consumption(VESSEL, 11.0, &routes, &cancel)
            .await
            .unwrap();

        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[tokio::test]
    async fn shared_samples_are_not_reordered_by_matching() {
        let samples = fuel_table();
        let before = samples.clone();
        let route = route(&[(59.0, 10.0), (59.4, 10.5), (59.9, 10.7)], 9);

        consumption_for_route(&route, &samples, &weather(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(samples, before);
    }
}
