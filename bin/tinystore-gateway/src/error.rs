//! HTTP mapping of the tinystore error taxonomy

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tinystore_common::Error;
use tracing::error;

/// Handler error; renders as a plain-text response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl<E: Into<Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self.0 {
            Error::ObjectNotFound { .. } => "Not Found".to_string(),
            Error::AccessDenied => "Not Authorized".to_string(),
            Error::InvalidObjectKey(e) => format!("Invalid Request: {e}"),
            Error::InvalidBucketName(e) => format!("Invalid Request: {e}"),
            Error::MethodNotAllowed(method) => format!("Method Not Allowed: {method}"),
            other => {
                error!("Request failed: {}", other);
                other.to_string()
            }
        };

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinystore_common::ObjectKeyError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::not_found("b", "k"), StatusCode::NOT_FOUND),
            (Error::AccessDenied, StatusCode::FORBIDDEN),
            (
                Error::InvalidObjectKey(ObjectKeyError::ReservedDelimiter),
                StatusCode::BAD_REQUEST,
            ),
            (
                Error::MethodNotAllowed("PATCH".into()),
                StatusCode::METHOD_NOT_ALLOWED,
            ),
            (Error::storage("disk gone"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }
}
