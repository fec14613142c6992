//! Request gate for the blob API
//!
//! Runs before any handler: rejects keys carrying the metadata delimiter,
//! then requires one of the configured shared secrets in the
//! `x-secret-squirrel` header or query parameter.

use crate::error::ApiError;
use axum::{
    body::Body,
    extract::{Query, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use std::borrow::Cow;
use std::sync::Arc;
use tinystore_common::{Error, METADATA_DELIMITER, ObjectKeyError};
use tracing::{debug, warn};

/// Header and query parameter carrying the shared secret
pub const SECRET_PARAM: &str = "x-secret-squirrel";

/// Route prefix of the blob API
pub const DATA_PREFIX: &str = "/data/";

/// Paths served without a secret
const UNGATED_PATHS: [&str; 3] = ["/health", "/favicon.ico", "/robots.txt"];

/// Gate state shared across requests
pub struct GateState {
    /// Accepted shared secrets
    secrets: Vec<String>,
    /// When false every request passes the secret check (development mode)
    enabled: bool,
}

impl GateState {
    /// Create a gate accepting any of `secrets`
    pub fn new(secrets: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            secrets: secrets.into_iter().map(Into::into).collect(),
            enabled: true,
        }
    }

    /// Create a gate that skips the secret check
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            secrets: Vec::new(),
            enabled: false,
        }
    }

    /// Check whether any presented value is an accepted secret
    pub fn is_authorized<'a>(&self, presented: impl IntoIterator<Item = &'a str>) -> bool {
        if !self.enabled {
            return true;
        }
        presented
            .into_iter()
            .any(|candidate| self.secrets.iter().any(|secret| secret == candidate))
    }
}

/// Gate middleware layer
pub async fn gate_layer(
    State(gate): State<Arc<GateState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let path = request.uri().path();

    if UNGATED_PATHS.contains(&path) {
        return Ok(next.run(request).await);
    }

    if let Some(key) = data_key(path)
        && key.contains(METADATA_DELIMITER)
    {
        warn!("Invalid request URL: {}", request.uri());
        return Err(Error::InvalidObjectKey(ObjectKeyError::ReservedDelimiter).into());
    }

    let header = request
        .headers()
        .get(SECRET_PARAM)
        .and_then(|v| v.to_str().ok());
    let query = Query::<Vec<(String, String)>>::try_from_uri(request.uri())
        .map(|Query(pairs)| pairs)
        .unwrap_or_default();
    let from_query = query
        .iter()
        .filter(|(name, _)| name == SECRET_PARAM)
        .map(|(_, value)| value.as_str());

    if !gate.is_authorized(header.into_iter().chain(from_query)) {
        warn!("Gate rejected {} {}", request.method(), request.uri());
        return Err(Error::AccessDenied.into());
    }

    debug!("Gate passed {} {}", request.method(), path);
    Ok(next.run(request).await)
}

/// Percent-decoded key of a `/data/{bucket}/{key}` path
fn data_key(path: &str) -> Option<Cow<'_, str>> {
    let rest = path.strip_prefix(DATA_PREFIX)?;
    let (_bucket, raw_key) = rest.split_once('/')?;
    Some(urlencoding::decode(raw_key).unwrap_or(Cow::Borrowed(raw_key)))
}
