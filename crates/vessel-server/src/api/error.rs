//! Error responses for the REST API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use vessel_core::Kind;

use crate::api::request_id::RequestId;

/// JSON error body: `{"status", "error", "cause", "request_id"}`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(serialize_with = "serialize_status")]
    status: StatusCode,
    error: &'static str,
    cause: Vec<String>,
    request_id: String,
}

impl ApiError {
    pub fn new(status: StatusCode, cause: Vec<String>, request_id: &RequestId) -> Self {
        Self {
            status,
            error: label(status),
            cause,
            request_id: request_id.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>, request_id: &RequestId) -> Self {
        Self::new(StatusCode::BAD_REQUEST, vec![message.into()], request_id)
    }

    pub fn not_found(message: impl Into<String>, request_id: &RequestId) -> Self {
        Self::new(StatusCode::NOT_FOUND, vec![message.into()], request_id)
    }

    pub fn internal(err: &anyhow::Error, request_id: &RequestId) -> Self {
        tracing::error!(request_id = %request_id, "internal error: {:#}", err);
        let cause = err.chain().map(|e| e.to_string()).collect();
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, cause, request_id)
    }

    pub fn from_core(err: &vessel_core::Error, request_id: &RequestId) -> Self {
        let status = status_for(err.kind());
        if status.is_server_error() {
            tracing::error!(request_id = %request_id, kind = %err.kind(), "estimation failed: {}", err);
        } else {
            tracing::info!(request_id = %request_id, kind = %err.kind(), "estimation rejected: {}", err);
        }
        Self::new(status, err.causes(), request_id)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// HTTP status for a failure kind.
pub fn status_for(kind: Kind) -> StatusCode {
    match kind {
        Kind::BadInput => StatusCode::BAD_REQUEST,
        Kind::NotFound => StatusCode::NOT_FOUND,
        Kind::Upstream => StatusCode::SERVICE_UNAVAILABLE,
        Kind::Cancelled => StatusCode::GATEWAY_TIMEOUT,
        Kind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn label(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "bad request",
        StatusCode::NOT_FOUND => "not found",
        StatusCode::SERVICE_UNAVAILABLE => "external systems not available",
        StatusCode::GATEWAY_TIMEOUT => "request cancelled",
        _ => "internal server error",
    }
}

fn serialize_status<S: serde::Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}
