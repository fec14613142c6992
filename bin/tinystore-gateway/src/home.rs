//! Service routes outside the blob API

use axum::{
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::info;

/// Root page; confirms the caller passed the gate
pub async fn home(method: Method) -> Response {
    info!("[home:{}]", method);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format!("tinystore [{method}]\n"),
    )
        .into_response()
}

/// Liveness probe
pub async fn health_check() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        r#"{"status":"healthy"}"#,
    )
        .into_response()
}

/// Catch-all for unknown paths
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Not Found",
    )
        .into_response()
}
