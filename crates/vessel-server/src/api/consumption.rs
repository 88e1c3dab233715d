//! Vessel consumption endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use vessel_core::{FuelSample, Route, VesselId};

use crate::api::error::ApiError;
use crate::api::request_id::RequestId;
use crate::state::AppState;

/// Metric tons of CO2 emitted per metric ton of fuel burned.
pub const CO2_PER_METRIC_TON: f64 = 3.114;

#[derive(Debug, Deserialize)]
pub struct ConsumptionRequest {
    pub imo: i64,
    pub draught: f64,
    pub routes: Vec<Route>,
}

impl ConsumptionRequest {
    fn validate(&self) -> Result<(), String> {
        if self.imo <= 0 {
            return Err(format!("imo must be positive, got {}", self.imo));
        }
        if !self.draught.is_finite() || self.draught <= 0.0 {
            return Err(format!("draught must be a positive number, got {}", self.draught));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteConsumption {
    pub consumption_metric_tons: f64,
    pub consumption_co2: f64,
}

impl From<f64> for RouteConsumption {
    fn from(consumption: f64) -> Self {
        Self {
            consumption_metric_tons: consumption,
            consumption_co2: consumption * CO2_PER_METRIC_TON,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ClosestQuery {
    pub draught: f64,
    pub speed: f64,
    pub beaufort: f64,
}

/// Liveness check. Reports unavailable once shutdown has started.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    if state.is_shutting_down() {
        (StatusCode::SERVICE_UNAVAILABLE, "SHUTTING DOWN")
    } else {
        (StatusCode::OK, "OK")
    }
}

/// Estimate fuel consumption for each submitted route.
pub async fn estimate_consumption(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<ConsumptionRequest>, JsonRejection>,
) -> Result<Json<Vec<RouteConsumption>>, ApiError> {
    let Json(req) = payload.map_err(|r| ApiError::bad_request(r.body_text(), &request_id))?;
    req.validate()
        .map_err(|message| ApiError::bad_request(message, &request_id))?;

    // Cancelled on deadline, on shutdown, or when this handler is dropped.
    let cancel = state.request_token();
    let _guard = cancel.clone().drop_guard();
    let deadline = state.config().request_timeout();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(deadline) => {
                    warn!(?deadline, "estimation deadline exceeded");
                    cancel.cancel();
                }
            }
        }
    });

    let vessel_id = VesselId(req.imo);
    let totals = state
        .estimator()
        .estimate_consumption(vessel_id, req.draught, &req.routes, &cancel)
        .await
        .map_err(|err| ApiError::from_core(&err, &request_id))?;

    info!(%vessel_id, routes = totals.len(), "served consumption estimate");
    Ok(Json(totals.into_iter().map(RouteConsumption::from).collect()))
}

/// The recorded sample closest to the given draught, weather and speed.
pub async fn closest_consumption(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    imo: Result<Path<i64>, PathRejection>,
    query: Result<Query<ClosestQuery>, QueryRejection>,
) -> Result<Json<FuelSample>, ApiError> {
    let Path(imo) = imo.map_err(|r| ApiError::bad_request(r.body_text(), &request_id))?;
    let Query(query) = query.map_err(|r| ApiError::bad_request(r.body_text(), &request_id))?;
    if imo <= 0 {
        return Err(ApiError::bad_request(
            format!("imo must be positive, got {}", imo),
            &request_id,
        ));
    }
    if [query.draught, query.speed, query.beaufort]
        .iter()
        .any(|v| !v.is_finite())
    {
        return Err(ApiError::bad_request(
            "draught, speed and beaufort must be finite numbers",
            &request_id,
        ));
    }

    let vessel_id = VesselId(imo);
    state
        .closest_consumption(vessel_id, query.draught, query.speed, query.beaufort)
        .await
        .map_err(|err| ApiError::internal(&err, &request_id))?
        .map(Json)
        .ok_or_else(|| {
            ApiError::not_found(format!("no fuel samples for vessel {}", vessel_id), &request_id)
        })
}
