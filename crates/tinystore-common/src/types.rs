//! Core type definitions for tinystore
//!
//! Validated bucket and key names. Every address that reaches the store has
//! been through one of these constructors.

use derive_more::Display;
use std::fmt;

/// Reserved separator between a logical key and its metadata suffix.
///
/// Part of the on-disk format: `photo.jpg::length` is the length sidecar of
/// `photo.jpg`, so no user key may contain it.
pub const METADATA_DELIMITER: &str = "::";

/// Maximum bucket name length in bytes (UTF-8)
pub const MAX_BUCKET_LEN: usize = 255;

/// Name of a bucket (one table in the underlying database)
#[derive(Clone, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct BucketName(String);

impl BucketName {
    /// Create a new bucket name
    pub fn new(name: impl Into<String>) -> Result<Self, BucketNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Get the bucket name as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(name: &str) -> Result<(), BucketNameError> {
        if name.is_empty() {
            return Err(BucketNameError::Empty);
        }
        if name.len() > MAX_BUCKET_LEN {
            return Err(BucketNameError::TooLong);
        }
        if name.contains('/') {
            return Err(BucketNameError::InvalidChar('/'));
        }
        Ok(())
    }
}

impl fmt::Debug for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BucketName({:?})", self.0)
    }
}

/// Errors that can occur when creating a bucket name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BucketNameError {
    #[error("bucket name cannot be empty")]
    Empty,
    #[error("bucket name cannot exceed 255 bytes")]
    TooLong,
    #[error("bucket name contains invalid character: {0}")]
    InvalidChar(char),
}

/// Object key (logical key within a bucket)
#[derive(Clone, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new object key, rejecting the metadata delimiter
    pub fn new(key: impl Into<String>) -> Result<Self, ObjectKeyError> {
        let key = key.into();
        Self::validate(&key)?;
        Ok(Self(key))
    }

    /// Get the object key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate object key
    pub fn validate(key: &str) -> Result<(), ObjectKeyError> {
        if key.is_empty() {
            return Err(ObjectKeyError::Empty);
        }

        if key.contains(METADATA_DELIMITER) {
            return Err(ObjectKeyError::ReservedDelimiter);
        }

        Ok(())
    }
}

impl fmt::Debug for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectKey({:?})", self.0)
    }
}

/// Errors that can occur when creating an object key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectKeyError {
    #[error("object key cannot be empty")]
    Empty,
    #[error("object key cannot contain the reserved delimiter \"::\"")]
    ReservedDelimiter,
}
