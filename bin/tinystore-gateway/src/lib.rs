//! tinystore gateway
//!
//! HTTP front end for [`BlobStore`]: the `/data/{bucket}/{*key}` blob API
//! behind a shared-secret gate, plus a few service routes.

pub mod auth_middleware;
pub mod data;
pub mod error;
pub mod home;

use auth_middleware::{GateState, gate_layer};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{any, get},
};
use std::sync::Arc;
use tinystore_store::BlobStore;
use tower_http::trace::TraceLayer;

/// Shared handler state
pub struct AppState {
    pub store: Arc<BlobStore>,
}

/// Build the gateway router
pub fn build_router(state: Arc<AppState>, gate: Arc<GateState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(home::health_check))
        .route("/favicon.ico", any(home::not_found))
        .route("/robots.txt", any(home::not_found))
        .route("/", get(home::home))
        .route(
            "/data/{bucket}/{*key}",
            get(data::get_blob)
                .head(data::head_blob)
                .put(data::put_blob)
                .post(data::put_blob)
                .delete(data::delete_blob)
                .fallback(data::method_not_allowed),
        )
        .fallback(home::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(middleware::from_fn_with_state(gate, gate_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
