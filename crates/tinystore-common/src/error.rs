//! Error types for tinystore
//!
//! This module defines the error taxonomy shared by the store and the gateway.

use crate::types::{BucketNameError, ObjectKeyError};
use thiserror::Error;

/// Common result type for tinystore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for tinystore
#[derive(Debug, Error)]
pub enum Error {
    // Lookup outcomes
    #[error("object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    // Request validation
    #[error("invalid bucket name: {0}")]
    InvalidBucketName(#[from] BucketNameError),

    #[error("invalid object key: {0}")]
    InvalidObjectKey(#[from] ObjectKeyError),

    #[error("access denied")]
    AccessDenied,

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    // Storage errors
    #[error("corrupt metadata at {key}: {reason}")]
    CorruptMetadata { key: String, reason: String },

    #[error("storage error: {0}")]
    Storage(String),

    // Internal errors
    #[error("internal error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a not found error for a bucket/key address
    pub fn not_found(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::InvalidBucketName(_) | Self::InvalidObjectKey(_) => 400,

            // 403 Forbidden
            Self::AccessDenied => 403,

            // 404 Not Found
            Self::ObjectNotFound { .. } => 404,

            // 405 Method Not Allowed
            Self::MethodNotAllowed(_) => 405,

            // 500 Internal Server Error
            Self::CorruptMetadata { .. }
            | Self::Storage(_)
            | Self::Internal(_)
            | Self::Configuration(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_http_status() {
        assert_eq!(Error::AccessDenied.http_status_code(), 403);
        assert_eq!(Error::not_found("b", "k").http_status_code(), 404);
        assert_eq!(
            Error::from(ObjectKeyError::ReservedDelimiter).http_status_code(),
            400
        );
        assert_eq!(Error::MethodNotAllowed("PATCH".into()).http_status_code(), 405);
        assert_eq!(Error::storage("io").http_status_code(), 500);
        assert_eq!(
            Error::CorruptMetadata {
                key: "k::modified".into(),
                reason: "short".into()
            }
            .http_status_code(),
            500
        );
    }

    #[test]
    fn test_error_display_carries_detail() {
        let err = Error::CorruptMetadata {
            key: "a::modified".into(),
            reason: "unsupported version 7".into(),
        };
        assert_eq!(
            err.to_string(),
            "corrupt metadata at a::modified: unsupported version 7"
        );
    }
}
