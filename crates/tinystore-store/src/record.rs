//! Record codec: one logical blob as four physical entries.
//!
//! ```text
//! key                  -> payload bytes
//! key::content-type    -> content type (UTF-8)
//! key::length          -> payload length (decimal ASCII)
//! key::modified        -> last write time (binary, see `encode_modified`)
//! ```
//!
//! The suffix strings and the timestamp layout are the durable on-disk format.

use crate::error::{StoreError, StoreResult};
use crate::sniff::detect_content_type;
use chrono::{DateTime, Utc};

pub const CONTENT_TYPE_SUFFIX: &str = "::content-type";
pub const LENGTH_SUFFIX: &str = "::length";
pub const MODIFIED_SUFFIX: &str = "::modified";

/// Physical key of a sidecar entry
#[must_use]
pub fn decorate(key: &str, suffix: &str) -> String {
    format!("{key}{suffix}")
}

/// Physical keys for one logical key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeys {
    pub payload: String,
    pub content_type: String,
    pub length: String,
    pub modified: String,
}

impl RecordKeys {
    #[must_use]
    pub fn new(key: &str) -> Self {
        Self {
            payload: key.to_string(),
            content_type: decorate(key, CONTENT_TYPE_SUFFIX),
            length: decorate(key, LENGTH_SUFFIX),
            modified: decorate(key, MODIFIED_SUFFIX),
        }
    }

    /// All four physical keys, payload first
    #[must_use]
    pub fn all(&self) -> [&str; 4] {
        [
            self.payload.as_str(),
            self.content_type.as_str(),
            self.length.as_str(),
            self.modified.as_str(),
        ]
    }
}

// ---- Timestamps ----

// Go's `time.Time.MarshalBinary` layout, which existing databases carry:
// version(1) | seconds since 0001-01-01 UTC (i64 BE) | nanos (i32 BE) | offset minutes (i16 BE)
// Version 2 appends one byte of offset seconds.
const TIME_VERSION_V1: u8 = 1;
const TIME_VERSION_V2: u8 = 2;
const TIME_LEN_V1: usize = 15;
const TIME_LEN_V2: usize = 16;
const UTC_OFFSET_MARKER: i16 = -1;

/// Seconds between 0001-01-01T00:00:00Z and the Unix epoch
const ABSOLUTE_TO_UNIX_SECS: i64 = 62_135_596_800;

/// Encode a modification time for the `::modified` sidecar
#[must_use]
pub fn encode_modified(t: &DateTime<Utc>) -> Vec<u8> {
    let secs = t.timestamp() + ABSOLUTE_TO_UNIX_SECS;
    // chrono keeps leap seconds as nanos >= 1e9; that still fits an i32
    let nanos = t.timestamp_subsec_nanos() as i32;

    let mut buf = Vec::with_capacity(TIME_LEN_V1);
    buf.push(TIME_VERSION_V1);
    buf.extend_from_slice(&secs.to_be_bytes());
    buf.extend_from_slice(&nanos.to_be_bytes());
    buf.extend_from_slice(&UTC_OFFSET_MARKER.to_be_bytes());
    buf
}

/// Decode a `::modified` sidecar value
///
/// `key` is the physical key the bytes came from and only feeds the error.
pub fn decode_modified(key: &str, bytes: &[u8]) -> StoreResult<DateTime<Utc>> {
    let corrupt = |reason: String| StoreError::CorruptMetadata {
        key: key.to_string(),
        reason,
    };

    let (&version, rest) = bytes
        .split_first()
        .ok_or_else(|| corrupt("empty timestamp".to_string()))?;
    let expected_len = match version {
        TIME_VERSION_V1 => TIME_LEN_V1,
        TIME_VERSION_V2 => TIME_LEN_V2,
        other => return Err(corrupt(format!("unsupported timestamp version {other}"))),
    };
    if bytes.len() != expected_len {
        return Err(corrupt(format!(
            "timestamp is {} bytes, expected {expected_len}",
            bytes.len()
        )));
    }

    let mut secs = [0u8; 8];
    secs.copy_from_slice(&rest[0..8]);
    let mut nanos = [0u8; 4];
    nanos.copy_from_slice(&rest[8..12]);
    // The zone offset only affects presentation; the instant is absolute.
    let secs = i64::from_be_bytes(secs);
    let nanos = i32::from_be_bytes(nanos);

    let unix_secs = secs
        .checked_sub(ABSOLUTE_TO_UNIX_SECS)
        .ok_or_else(|| corrupt("timestamp out of range".to_string()))?;
    let nanos = u32::try_from(nanos).map_err(|_| corrupt(format!("negative nanoseconds {nanos}")))?;

    DateTime::<Utc>::from_timestamp(unix_secs, nanos)
        .ok_or_else(|| corrupt(format!("timestamp out of range: {unix_secs}s {nanos}ns")))
}

// ---- Length ----

#[must_use]
pub fn encode_length(len: usize) -> Vec<u8> {
    len.to_string().into_bytes()
}

pub fn decode_length(key: &str, bytes: &[u8]) -> StoreResult<u64> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(|| StoreError::CorruptMetadata {
            key: key.to_string(),
            reason: format!("length is not a decimal number: {bytes:?}"),
        })
}

// ---- Content type ----

/// Where a content type can come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTypeSource {
    /// Supplied by the caller for this request
    Override,
    /// The `::content-type` sidecar
    Stored,
    /// Detected from the payload bytes
    Sniffed,
}

/// Precedence on the write path
pub const WRITE_ORDER: &[ContentTypeSource] =
    &[ContentTypeSource::Override, ContentTypeSource::Sniffed];

/// Precedence on the read path
pub const READ_ORDER: &[ContentTypeSource] = &[
    ContentTypeSource::Override,
    ContentTypeSource::Stored,
    ContentTypeSource::Sniffed,
];

/// Candidate values for content-type resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentTypeInputs<'a> {
    pub override_type: Option<&'a str>,
    pub stored: Option<&'a str>,
    pub payload: &'a [u8],
}

impl ContentTypeInputs<'_> {
    fn lookup(&self, source: ContentTypeSource) -> Option<&str> {
        match source {
            ContentTypeSource::Override => self.override_type.filter(|s| !s.is_empty()),
            ContentTypeSource::Stored => self.stored.filter(|s| !s.is_empty()),
            ContentTypeSource::Sniffed => Some(detect_content_type(self.payload)),
        }
    }
}

/// First present source in `order` wins
#[must_use]
pub fn resolve_content_type(order: &[ContentTypeSource], inputs: &ContentTypeInputs<'_>) -> String {
    order
        .iter()
        .find_map(|source| inputs.lookup(*source))
        .unwrap_or(crate::sniff::OCTET_STREAM)
        .to_string()
}
