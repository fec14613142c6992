//! Blob API handlers (`/data/{bucket}/{*key}`)
//!
//! Each handler validates the address, then runs exactly one store
//! operation on the blocking pool.

use crate::AppState;
use crate::error::ApiError;
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tinystore_common::{BucketName, Error, ObjectKey};
use tinystore_store::StoreResult;
use tracing::{debug, info};

/// Request header overriding the stored or sniffed content type
pub const CONTENT_TYPE_OVERRIDE: &str = "x-content-type";

/// GET: payload with resolved content type
pub async fn get_blob(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (bucket, key) = parse_address(bucket, key)?;
    debug!("GET blob: {}/{}", bucket, key);

    let override_type = content_type_override(&headers);
    let store = Arc::clone(&state.store);
    let (b, k) = (bucket.clone(), key.clone());
    let blob = run_blocking(move || store.get(&b, &k, override_type.as_deref()))
        .await?
        .ok_or_else(|| Error::not_found(bucket.as_str(), key.as_str()))?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::CONTENT_TYPE, content_type_value(&key, &blob.content_type)?);
    insert_modified(&mut response_headers, blob.modified);

    Ok((StatusCode::OK, response_headers, Body::from(blob.payload)).into_response())
}

/// HEAD: metadata headers, no body
pub async fn head_blob(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let (bucket, key) = parse_address(bucket, key)?;
    debug!("HEAD blob: {}/{}", bucket, key);

    let override_type = content_type_override(&headers);
    let store = Arc::clone(&state.store);
    let (b, k) = (bucket.clone(), key.clone());
    let head = run_blocking(move || store.head(&b, &k, override_type.as_deref()))
        .await?
        .ok_or_else(|| Error::not_found(bucket.as_str(), key.as_str()))?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(header::CONTENT_TYPE, content_type_value(&key, &head.content_type)?);
    response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(head.length));
    insert_modified(&mut response_headers, head.modified);

    Ok((StatusCode::OK, response_headers, Body::empty()).into_response())
}

/// PUT/POST: store the request body
pub async fn put_blob(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let (bucket, key) = parse_address(bucket, key)?;
    let size = body.len();

    let override_type = content_type_override(&headers);
    let store = Arc::clone(&state.store);
    let (b, k) = (bucket.clone(), key.clone());
    let modified =
        run_blocking(move || store.put(&b, &k, &body, override_type.as_deref())).await?;

    info!("PUT blob: {}/{} ({} bytes)", bucket, key, size);

    let mut response_headers = HeaderMap::new();
    insert_modified(&mut response_headers, Some(modified));
    Ok((StatusCode::OK, response_headers).into_response())
}

/// DELETE: remove the blob; missing blobs are not an error
pub async fn delete_blob(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let (bucket, key) = parse_address(bucket, key)?;

    let store = Arc::clone(&state.store);
    let (b, k) = (bucket.clone(), key.clone());
    run_blocking(move || store.delete(&b, &k)).await?;

    info!("DELETE blob: {}/{}", bucket, key);
    Ok(StatusCode::OK.into_response())
}

/// Any other verb on a blob path
pub async fn method_not_allowed(method: Method, Path((bucket, key)): Path<(String, String)>) -> ApiError {
    debug!("Unsupported method {} on {}/{}", method, bucket, key);
    ApiError(Error::MethodNotAllowed(method.to_string()))
}

fn parse_address(bucket: String, key: String) -> Result<(BucketName, ObjectKey), Error> {
    Ok((BucketName::new(bucket)?, ObjectKey::new(key)?))
}

fn content_type_override(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE_OVERRIDE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn content_type_value(key: &ObjectKey, content_type: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(content_type).map_err(|e| Error::CorruptMetadata {
        key: format!("{key}::content-type"),
        reason: format!("not a valid header value: {e}"),
    })
}

fn insert_modified(headers: &mut HeaderMap, modified: Option<DateTime<Utc>>) {
    let Some(modified) = modified else {
        return;
    };
    if let Ok(value) = HeaderValue::from_str(&http_date(&modified)) {
        headers.insert(header::LAST_MODIFIED, value.clone());
        headers.insert(header::DATE, value);
    }
}

/// RFC 7231 date, e.g. "Sun, 06 Nov 1994 08:49:37 GMT"
pub fn http_date(t: &DateTime<Utc>) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

async fn run_blocking<T, F>(f: F) -> Result<T, Error>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::internal(format!("store task failed: {e}")))?
        .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_http_date() {
        let t = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(http_date(&t), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_content_type_override() {
        let mut headers = HeaderMap::new();
        assert_eq!(content_type_override(&headers), None);

        headers.insert(CONTENT_TYPE_OVERRIDE, HeaderValue::from_static(""));
        assert_eq!(content_type_override(&headers), None);

        headers.insert(CONTENT_TYPE_OVERRIDE, HeaderValue::from_static("text/x-custom"));
        assert_eq!(content_type_override(&headers).as_deref(), Some("text/x-custom"));
    }

    #[test]
    fn test_parse_address() {
        assert!(parse_address("b".into(), "k".into()).is_ok());
        assert!(matches!(
            parse_address("b".into(), "a::b".into()),
            Err(Error::InvalidObjectKey(_))
        ));
        assert!(matches!(
            parse_address(String::new(), "k".into()),
            Err(Error::InvalidBucketName(_))
        ));
    }
}
