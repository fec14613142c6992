//! Redb table layout.
//!
//! One table per bucket, named after the bucket. Keys are the physical keys
//! produced by `record::RecordKeys`; values are raw bytes.

use redb::TableDefinition;
use tinystore_common::BucketName;

/// Table holding every entry of `bucket`
#[must_use]
pub fn bucket_table(bucket: &BucketName) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(bucket.as_str())
}
