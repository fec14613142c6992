//! tinystore Blob Store - bucket/key blobs on redb
//!
//! A blob is stored as its payload plus three metadata sidecars in the
//! bucket's table; `record` defines that layout and `store` keeps the
//! entries consistent with one transaction per operation.

pub mod error;
pub mod record;
pub mod sniff;
pub mod store;
pub mod tables;
pub mod types;

// Re-exports
pub use error::{StoreError, StoreResult};
pub use store::BlobStore;
pub use types::{Blob, BlobHead};
