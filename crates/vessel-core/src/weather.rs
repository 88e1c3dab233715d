//! Weather enrichment of route segments.

use crate::cancel::cancellable;
use crate::error::{BoxError, Error, Result};
use crate::models::Segment;
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

/// Source of weather intensity (Beaufort) for a calendar day.
///
/// Implementations may cache; the pipeline only relies on getting the same
/// value for the same date, or an error.
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn weather_for_date(&self, date: NaiveDate) -> std::result::Result<f64, BoxError>;
}

/// Fill in the average weather of every segment.
///
/// Both endpoint dates are looked up for each segment, by UTC calendar day.
/// The first failed lookup aborts the pass; the segments must then be
/// discarded.
pub async fn enrich_weather(
    segments: &mut [Segment],
    lookup: &dyn WeatherLookup,
    cancel: &CancellationToken,
) -> Result<()> {
    for segment in segments.iter_mut() {
        let source = beaufort_for(lookup, segment.source.timestamp.date_naive(), cancel).await?;
        let destination =
            beaufort_for(lookup, segment.destination.timestamp.date_naive(), cancel).await?;
        segment.apply_weather(source, destination);
    }
    Ok(())
}

async fn beaufort_for(
    lookup: &dyn WeatherLookup,
    date: NaiveDate,
    cancel: &CancellationToken,
) -> Result<f64> {
    cancellable(cancel, "weather lookup", async {
        lookup
            .weather_for_date(date)
            .await
            .map_err(|source| Error::WeatherLookup { date, source })
    })
    .await
}
