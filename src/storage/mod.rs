//! Object storage backends
//!
//! The registry document, wagons, plugin YAMLs and bundles all live in one
//! bucket. Backends expose get/put/delete by key plus an opaque ETag so the
//! registry can be updated with compare-and-swap semantics.

mod fs;
#[cfg(test)]
mod memory;
mod s3;

use std::path::Path;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{self, Result};

pub use fs::FsObjectStore;
#[cfg(test)]
pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

/// An object read from storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    /// Version token of the stored content, if the backend reports one
    pub etag: Option<String>,
}

/// Precondition for a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutCondition {
    /// Overwrite unconditionally
    Always,
    /// Only write if the current object still has this ETag
    IfMatch(String),
    /// Only write if no object exists under the key
    IfAbsent,
}

/// Minimal object storage surface: get, put and delete by key
pub trait ObjectStore {
    /// Fetch an object, `None` if the key does not exist
    fn get(&self, key: &str) -> Result<Option<StoredObject>>;

    /// Store an object and return its new ETag
    ///
    /// Fails with `PreconditionFailed` when `condition` does not hold.
    fn put(&self, key: &str, bytes: &[u8], condition: &PutCondition) -> Result<String>;

    /// Delete an object; deleting a missing key is not an error
    fn delete(&self, key: &str) -> Result<()>;

    /// Human readable location of a key, used in log lines
    fn describe(&self, key: &str) -> String;

    /// Upload a local file unconditionally
    fn put_file(&self, key: &str, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)
            .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;
        tracing::info!(
            local_path = %path.display(),
            destination = %self.describe(key),
            "uploading file"
        );
        self.put(key, &bytes, &PutCondition::Always)
    }
}

/// Reject keys that could escape a bucket-like root
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(error::storage::failed("validate", key, "empty object key"));
    }
    if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err(error::storage::failed(
            "validate",
            key,
            "object keys must be relative and must not contain '..'",
        ));
    }
    Ok(())
}

/// Open the backend selected by configuration
pub fn open(config: &StorageConfig) -> Result<Box<dyn ObjectStore>> {
    match &config.backend {
        StorageBackend::Fs { root } => Ok(Box::new(FsObjectStore::open(root)?)),
        StorageBackend::S3 => Ok(Box::new(S3ObjectStore::new(
            config.bucket.clone(),
            config.region.clone(),
        )?)),
    }
}
