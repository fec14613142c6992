//! Blob store backed by redb.
//!
//! Every public operation runs inside exactly one redb transaction, so the
//! four entries of a record (see `record`) are always observed together.
//! Isolation comes from redb: one writer at a time, readers on a snapshot.

use crate::error::{StoreError, StoreResult};
use crate::record::{
    ContentTypeInputs, READ_ORDER, RecordKeys, WRITE_ORDER, decode_length, decode_modified,
    encode_length, encode_modified, resolve_content_type,
};
use crate::tables::bucket_table;
use crate::types::{Blob, BlobHead};
use chrono::{DateTime, Utc};
use redb::{Database, ReadOnlyTable, ReadTransaction, ReadableTable, TableError};
use std::path::Path;
use tinystore_common::{BucketName, ObjectKey};
use tracing::debug;

type BucketTable = ReadOnlyTable<&'static str, &'static [u8]>;

/// Persistent blob store backed by redb.
pub struct BlobStore {
    db: Database,
}

impl BlobStore {
    /// Open (or create) the redb database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Ok(Self { db })
    }

    /// Fetch a blob with its resolved content type.
    ///
    /// Returns `Ok(None)` when the bucket or the payload entry is missing.
    pub fn get(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        content_type_override: Option<&str>,
    ) -> StoreResult<Option<Blob>> {
        let keys = RecordKeys::new(key.as_str());
        let read_txn = self.db.begin_read()?;
        let Some(table) = open_bucket(&read_txn, bucket)? else {
            return Ok(None);
        };

        let modified = read_modified(&table, &keys)?;
        let Some(payload) = table.get(keys.payload.as_str())? else {
            return Ok(None);
        };
        let payload = payload.value().to_vec();
        let stored = read_content_type(&table, &keys)?;

        let content_type = resolve_content_type(
            READ_ORDER,
            &ContentTypeInputs {
                override_type: content_type_override,
                stored: stored.as_deref(),
                payload: &payload,
            },
        );

        Ok(Some(Blob {
            payload,
            content_type,
            modified,
        }))
    }

    /// Fetch blob metadata without copying the payload out.
    ///
    /// `length` comes from the `::length` sidecar when present and from the
    /// stored payload otherwise.
    pub fn head(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        content_type_override: Option<&str>,
    ) -> StoreResult<Option<BlobHead>> {
        let keys = RecordKeys::new(key.as_str());
        let read_txn = self.db.begin_read()?;
        let Some(table) = open_bucket(&read_txn, bucket)? else {
            return Ok(None);
        };

        let modified = read_modified(&table, &keys)?;
        let Some(payload) = table.get(keys.payload.as_str())? else {
            return Ok(None);
        };
        let payload = payload.value();
        let stored = read_content_type(&table, &keys)?;

        let content_type = resolve_content_type(
            READ_ORDER,
            &ContentTypeInputs {
                override_type: content_type_override,
                stored: stored.as_deref(),
                payload,
            },
        );

        let length = match table.get(keys.length.as_str())? {
            Some(sidecar) => decode_length(&keys.length, sidecar.value())?,
            None => payload.len() as u64,
        };

        Ok(Some(BlobHead {
            content_type,
            length,
            modified,
        }))
    }

    /// Store a blob, replacing every field of any previous record.
    ///
    /// Creates the bucket if needed. Returns the recorded modification time.
    pub fn put(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        payload: &[u8],
        content_type_override: Option<&str>,
    ) -> StoreResult<DateTime<Utc>> {
        let keys = RecordKeys::new(key.as_str());
        let modified = Utc::now();
        let content_type = resolve_content_type(
            WRITE_ORDER,
            &ContentTypeInputs {
                override_type: content_type_override,
                stored: None,
                payload,
            },
        );

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(bucket_table(bucket))?;
            table.insert(keys.modified.as_str(), encode_modified(&modified).as_slice())?;
            table.insert(keys.length.as_str(), encode_length(payload.len()).as_slice())?;
            table.insert(keys.content_type.as_str(), content_type.as_bytes())?;
            table.insert(keys.payload.as_str(), payload)?;
        }
        write_txn.commit()?;

        debug!(
            "Stored {}/{} ({} bytes, {})",
            bucket,
            key,
            payload.len(),
            content_type
        );
        Ok(modified)
    }

    /// Remove a blob and all of its metadata.
    ///
    /// Deleting a missing blob (or one in a missing bucket) succeeds.
    pub fn delete(&self, bucket: &BucketName, key: &ObjectKey) -> StoreResult<()> {
        let keys = RecordKeys::new(key.as_str());
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(bucket_table(bucket))?;
            let mut existed = false;
            for physical in keys.all() {
                existed |= table.remove(physical)?.is_some();
            }
            existed
        };
        write_txn.commit()?;

        debug!("Deleted {}/{} (existed: {})", bucket, key, existed);
        Ok(())
    }
}

fn open_bucket(read_txn: &ReadTransaction, bucket: &BucketName) -> StoreResult<Option<BucketTable>> {
    match read_txn.open_table(bucket_table(bucket)) {
        Ok(table) => Ok(Some(table)),
        Err(TableError::TableDoesNotExist(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_modified(table: &BucketTable, keys: &RecordKeys) -> StoreResult<Option<DateTime<Utc>>> {
    table
        .get(keys.modified.as_str())?
        .map(|raw| decode_modified(&keys.modified, raw.value()))
        .transpose()
}

fn read_content_type(table: &BucketTable, keys: &RecordKeys) -> StoreResult<Option<String>> {
    let Some(raw) = table.get(keys.content_type.as_str())? else {
        return Ok(None);
    };
    String::from_utf8(raw.value().to_vec())
        .map(Some)
        .map_err(|e| StoreError::CorruptMetadata {
            key: keys.content_type.clone(),
            reason: format!("content type is not UTF-8: {e}"),
        })
}
