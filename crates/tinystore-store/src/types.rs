//! Logical views of a stored blob.

use chrono::{DateTime, Utc};

/// A blob as returned by `BlobStore::get`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub payload: Vec<u8>,
    pub content_type: String,
    /// `None` when the record has no `::modified` sidecar
    pub modified: Option<DateTime<Utc>>,
}

/// Blob metadata as returned by `BlobStore::head`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobHead {
    pub content_type: String,
    pub length: u64,
    pub modified: Option<DateTime<Utc>>,
}
