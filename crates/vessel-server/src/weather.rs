//! HTTP client for the external weather service.
//!
//! Looks up the Beaufort intensity for a calendar day. Answers are cached per
//! day and failed calls are retried with backoff, so the estimation pipeline
//! only ever sees a value or a final error.

use crate::backoff::Backoff;
use crate::cache::{prune_cache, CacheEntry};
use crate::config::Config;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use vessel_core::{BoxError, WeatherLookup};

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("weather request failed")]
    Request(#[from] reqwest::Error),
    #[error("weather api responded with status {0}")]
    Status(StatusCode),
    #[error("weather api returned a non-finite intensity")]
    InvalidIntensity,
    #[error("weather api failed {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<WeatherError>,
    },
}

#[derive(Debug, Serialize)]
struct WeatherRequest {
    #[serde(rename = "Date")]
    date: String,
}

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    #[serde(rename = "Beaufort")]
    beaufort: f64,
}

#[derive(Debug, Clone, Copy)]
struct CachedWeather {
    fetched_at: Instant,
    beaufort: f64,
}

impl CacheEntry for CachedWeather {
    fn fetched_at(&self) -> Instant {
        self.fetched_at
    }
}

pub struct WeatherClient {
    client: Client,
    url: String,
    api_key: String,
    cache: DashMap<NaiveDate, CachedWeather>,
    cache_ttl: Duration,
    cache_max_entries: usize,
    max_attempts: u32,
    retry_base: Duration,
    retry_max: Duration,
}

impl WeatherClient {
    pub fn new(config: &Config) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.weather_timeout_s.max(1)))
            .build()?;

        Ok(Self {
            client,
            url: config.weather_api_url.clone(),
            api_key: config.weather_api_key.clone(),
            cache: DashMap::new(),
            cache_ttl: Duration::from_secs(config.weather_cache_ttl_s),
            cache_max_entries: config.weather_cache_max_entries.max(1),
            max_attempts: config.weather_max_attempts.max(1),
            retry_base: Duration::from_millis(config.weather_retry_base_ms),
            retry_max: Duration::from_millis(config.weather_retry_max_ms),
        })
    }

    /// Beaufort intensity for the given day.
    pub async fn beaufort_for_day(&self, date: NaiveDate) -> Result<f64, WeatherError> {
        if let Some(entry) = self.cache.get(&date) {
            if entry.fetched_at.elapsed() <= self.cache_ttl {
                return Ok(entry.beaufort);
            }
        }

        let beaufort = self.fetch_with_retry(date).await?;
        self.cache.insert(
            date,
            CachedWeather {
                fetched_at: Instant::now(),
                beaufort,
            },
        );
        if self.cache.len() > self.cache_max_entries {
            prune_cache(&self.cache, self.cache_max_entries, self.cache_ttl);
        }

        Ok(beaufort)
    }

    async fn fetch_with_retry(&self, date: NaiveDate) -> Result<f64, WeatherError> {
        let mut backoff = Backoff::new(self.retry_base, self.retry_max);
        let mut attempt = 1;
        loop {
            match self.fetch(date).await {
                Ok(beaufort) => {
                    debug!(%date, beaufort, attempt, "fetched weather");
                    return Ok(beaufort);
                }
                Err(err) if attempt < self.max_attempts => {
                    let delay = backoff.next_delay();
                    warn!(%date, attempt, ?delay, "weather lookup failed, retrying: {}", err);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(WeatherError::Exhausted {
                        attempts: attempt,
                        last: Box::new(err),
                    })
                }
            }
        }
    }

    async fn fetch(&self, date: NaiveDate) -> Result<f64, WeatherError> {
        let request = WeatherRequest {
            date: date.format("%Y-%m-%d").to_string(),
        };
        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status));
        }

        let body: WeatherResponse = response.json().await?;
        if !body.beaufort.is_finite() {
            return Err(WeatherError::InvalidIntensity);
        }
        Ok(body.beaufort)
    }
}

#[async_trait]
impl WeatherLookup for WeatherClient {
    async fn weather_for_date(&self, date: NaiveDate) -> Result<f64, BoxError> {
        self.beaufort_for_day(date).await.map_err(Into::into)
    }
}
