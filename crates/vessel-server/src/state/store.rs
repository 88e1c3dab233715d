//! Application state shared by all request handlers.

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use vessel_core::{ConsumptionEstimator, FuelSample, VesselId, WeatherLookup};

use crate::config::Config;
use crate::persistence::{fuel_samples, Database, SqliteFuelRepository};

/// Services wired together at startup and injected into handlers.
pub struct AppState {
    config: Config,
    db: Database,
    estimator: ConsumptionEstimator,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(db: Database, config: Config, weather: Arc<dyn WeatherLookup>) -> Self {
        let repository = Arc::new(SqliteFuelRepository::new(db.pool().clone()));
        Self {
            config,
            estimator: ConsumptionEstimator::new(repository, weather),
            db,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn pool(&self) -> &SqlitePool {
        self.db.pool()
    }

    pub fn estimator(&self) -> &ConsumptionEstimator {
        &self.estimator
    }

    /// Token for a single request. Cancelled together with the server.
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Cancel every in-flight request.
    pub fn begin_shutdown(&self) {
        info!("Cancelling in-flight requests");
        self.shutdown.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub async fn closest_consumption(
        &self,
        vessel_id: VesselId,
        draught: f64,
        speed_knots: f64,
        weather_beaufort: f64,
    ) -> Result<Option<FuelSample>> {
        fuel_samples::closest_consumption(
            self.pool(),
            vessel_id,
            draught,
            speed_knots,
            weather_beaufort,
        )
        .await
    }

    /// Load a JSON fuel table into the database.
    pub async fn seed_fuel_table(&self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let samples = fuel_samples::load_fuel_table(path)?;
        let inserted = fuel_samples::insert_fuel_samples(self.pool(), &samples).await?;
        info!("Seeded {} fuel samples from {}", inserted, path.display());
        Ok(inserted)
    }
}
