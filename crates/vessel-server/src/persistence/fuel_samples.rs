//! Fuel sample persistence operations.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::path::Path;
use uuid::Uuid;
use vessel_core::{BoxError, FuelSample, FuelSampleRepository, VesselId};

/// Load every sample of the vessel recorded at the draught closest to `draught`.
pub async fn samples_for_closest_draught(
    pool: &SqlitePool,
    vessel_id: VesselId,
    draught: f64,
) -> Result<Vec<FuelSample>> {
    let rows = sqlx::query_as::<_, FuelSampleRow>(
        r#"
        SELECT id, imo, draught, beaufort, speed, consumption
        FROM fuel_samples
        WHERE imo = ?1 AND draught = (
            SELECT draught FROM fuel_samples
            WHERE imo = ?1
            ORDER BY ABS(draught - ?2)
            LIMIT 1
        )
        ORDER BY rowid
        "#,
    )
    .bind(vessel_id.0)
    .bind(draught)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
}

/// The single sample closest to the given draught, speed and weather, in that priority.
pub async fn closest_consumption(
    pool: &SqlitePool,
    vessel_id: VesselId,
    draught: f64,
    speed_knots: f64,
    weather_beaufort: f64,
) -> Result<Option<FuelSample>> {
    let row = sqlx::query_as::<_, FuelSampleRow>(
        r#"
        SELECT id, imo, draught, beaufort, speed, consumption
        FROM fuel_samples
        WHERE imo = ?1
        ORDER BY ABS(draught - ?2), ABS(beaufort - ?3), ABS(speed - ?4), rowid
        LIMIT 1
        "#,
    )
    .bind(vessel_id.0)
    .bind(draught)
    .bind(weather_beaufort)
    .bind(speed_knots)
    .fetch_optional(pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
}

/// Insert samples in a single transaction.
///
/// A sample for a vessel and operating condition (draught, beaufort, speed)
/// that is already stored replaces its consumption, so loading the same
/// table again leaves the row count unchanged. Existing ids are replaced too.
pub async fn insert_fuel_samples(pool: &SqlitePool, samples: &[FuelSample]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut written = 0;

    for sample in samples {
        let result = sqlx::query(
            r#"
            INSERT INTO fuel_samples (id, imo, draught, beaufort, speed, consumption)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(imo, draught, beaufort, speed) DO UPDATE SET
                consumption = excluded.consumption
            ON CONFLICT(id) DO UPDATE SET
                imo = ?2, draught = ?3, beaufort = ?4, speed = ?5, consumption = ?6
            "#,
        )
        .bind(sample.id.to_string())
        .bind(sample.vessel_id.0)
        .bind(sample.draught)
        .bind(sample.weather_beaufort)
        .bind(sample.speed_knots)
        .bind(sample.consumption)
        .execute(&mut *tx)
        .await?;
        written += result.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}

/// Read a JSON array of fuel samples from disk.
pub fn load_fuel_table(path: impl AsRef<Path>) -> Result<Vec<FuelSample>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fuel table {}", path.display()))?;
    let samples: Vec<FuelSample> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid fuel table {}", path.display()))?;

    for (index, sample) in samples.iter().enumerate() {
        let values = [
            sample.draught,
            sample.weather_beaufort,
            sample.speed_knots,
            sample.consumption,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            anyhow::bail!("fuel table entry {} has a non-finite value", index);
        }
    }

    Ok(samples)
}

/// SQLite-backed source of fuel samples for the estimator.
#[derive(Clone)]
pub struct SqliteFuelRepository {
    pool: SqlitePool,
}

impl SqliteFuelRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FuelSampleRepository for SqliteFuelRepository {
    async fn samples_for_closest_draught(
        &self,
        vessel_id: VesselId,
        draught: f64,
    ) -> std::result::Result<Vec<FuelSample>, BoxError> {
        samples_for_closest_draught(&self.pool, vessel_id, draught)
            .await
            .map_err(Into::into)
    }
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct FuelSampleRow {
    id: String,
    imo: i64,
    draught: f64,
    beaufort: f64,
    speed: f64,
    consumption: f64,
}

impl TryFrom<FuelSampleRow> for FuelSample {
    type Error = anyhow::Error;

    fn try_from(row: FuelSampleRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .with_context(|| format!("invalid fuel sample id {}", row.id))?;

        Ok(FuelSample {
            id,
            vessel_id: VesselId(row.imo),
            draught: row.draught,
            weather_beaufort: row.beaufort,
            speed_knots: row.speed,
            consumption: row.consumption,
        })
    }
}
