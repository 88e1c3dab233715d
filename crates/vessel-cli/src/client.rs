//! HTTP client for the vessel server.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use vessel_core::{FuelSample, Route};

/// Body of `POST /v1/vessels/consumption`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub imo: i64,
    pub draught: f64,
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RouteConsumption {
    pub consumption_metric_tons: f64,
    pub consumption_co2: f64,
}

/// Client for the vessel server REST API.
pub struct VesselClient {
    base_url: String,
    client: reqwest::Client,
}

impl VesselClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Estimate consumption for every route in the request.
    pub async fn estimate(&self, request: &EstimateRequest) -> Result<Vec<RouteConsumption>> {
        let url = format!("{}/v1/vessels/consumption", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("estimate failed ({}): {}", status, body);
        }
        Ok(response.json().await?)
    }

    /// The recorded fuel sample nearest to the given conditions.
    pub async fn closest_consumption(
        &self,
        imo: i64,
        draught: f64,
        speed_knots: f64,
        beaufort: f64,
    ) -> Result<FuelSample> {
        let url = format!("{}/v1/vessels/{}/consumption/closest", self.base_url, imo);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("draught", draught),
                ("speed", speed_knots),
                ("beaufort", beaufort),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("closest consumption lookup failed ({}): {}", status, body);
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_routes_and_reads_totals() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/vessels/consumption"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "consumption_metric_tons": 10.0, "consumption_co2": 31.14 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = VesselClient::new(format!("{}/", server.uri()));
        let totals = client
            .estimate(&EstimateRequest {
                imo: 9_434_656,
                draught: 10.0,
                routes: vec![Route::default()],
            })
            .await
            .unwrap();

        assert_eq!(
            totals,
            vec![RouteConsumption {
                consumption_metric_tons: 10.0,
                consumption_co2: 31.14,
            }]
        );
    }

    #[tokio::test]
    async fn surfaces_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status": 404, "error": "not found", "cause": [], "request_id": "r"
            })))
            .mount(&server)
            .await;

        let client = VesselClient::new(server.uri());
        let err = client
            .estimate(&EstimateRequest {
                imo: 1,
                draught: 10.0,
                routes: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn queries_closest_consumption() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/vessels/42/consumption/closest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "6f1c1b36-1f3a-4b8e-9d62-3c2f8f5a0b11",
                "imo": 42, "draught": 10.0, "beaufort": 3.0, "speed": 12.0, "consumption": 100.0
            })))
            .mount(&server)
            .await;

        let client = VesselClient::new(server.uri());
        let sample = client.closest_consumption(42, 10.0, 12.0, 3.0).await.unwrap();
        assert_eq!(sample.consumption, 100.0);
    }
}
