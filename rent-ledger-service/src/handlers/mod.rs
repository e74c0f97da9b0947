//! HTTP handlers for rent-ledger-service.

pub mod payments;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::services::metrics::get_metrics;

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "rent-ledger-service" })),
    )
}

pub async fn metrics() -> impl IntoResponse {
    get_metrics()
}
