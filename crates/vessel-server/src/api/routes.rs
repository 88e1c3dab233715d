//! REST API routes.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::{consumption, request_id};
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(consumption::health))
        .route("/v1/vessels/consumption", post(consumption::estimate_consumption))
        .route(
            "/v1/vessels/:imo/consumption/closest",
            get(consumption::closest_consumption),
        )
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::ensure_request_id))
}
