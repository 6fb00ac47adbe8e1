use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use opusgate_core::AuthMethod;
use serde::Serialize;
use std::sync::Arc;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
    pub requires_auth: bool,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

/// GET /
pub async fn index(State(state): State<Arc<AppState>>) -> Json<IndexResponse> {
    let gated = state.config().auth.method != AuthMethod::None;

    let endpoint = |method, path, description, protected: bool| EndpointInfo {
        method,
        path,
        description,
        requires_auth: protected && gated,
    };

    Json(IndexResponse {
        service: "opusgate",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: vec![
            endpoint("GET", "/", "This endpoint index", false),
            endpoint("GET", "/health", "Liveness check", false),
            endpoint("GET", "/metrics", "Prometheus metrics", false),
            endpoint(
                "POST",
                "/convert",
                "Convert the multipart field 'audio' to Opus",
                true,
            ),
            endpoint(
                "POST",
                "/convert-url",
                "Download JSON {\"url\"} and convert it to Opus",
                true,
            ),
        ],
    })
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
