//! Local directory acting as a bucket
//!
//! Keys map to paths below the root. ETags are MD5 digests of the content.
//! Conditional writes compare against the current digest; this is not safe
//! across processes writing the same root concurrently.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{ObjectStore, PutCondition, StoredObject, validate_key};
use crate::error::{self, Result};
use crate::hash::md5_bytes;

pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .map_err(|e| error::storage::failed("open", root.display().to_string(), e.to_string()))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn current_etag(path: &Path) -> Result<Option<String>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(md5_bytes(&bytes))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(error::fs::read_failed(path.display().to_string(), e.to_string())),
        }
    }
}

impl ObjectStore for FsObjectStore {
    fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                let etag = Some(md5_bytes(&bytes));
                Ok(Some(StoredObject { bytes, etag }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(error::storage::failed("get", key, e.to_string())),
        }
    }

    fn put(&self, key: &str, bytes: &[u8], condition: &PutCondition) -> Result<String> {
        let path = self.path_for(key)?;
        let current = Self::current_etag(&path)?;
        let allowed = match condition {
            PutCondition::Always => true,
            PutCondition::IfAbsent => current.is_none(),
            PutCondition::IfMatch(expected) => current.as_deref() == Some(expected.as_str()),
        };
        if !allowed {
            return Err(error::storage::precondition_failed(key));
        }

        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent).map_err(|e| error::storage::failed("put", key, e.to_string()))?;

        // Write beside the target and rename so readers never see a partial object
        let mut staged =
            NamedTempFile::new_in(parent).map_err(|e| error::storage::failed("put", key, e.to_string()))?;
        staged
            .write_all(bytes)
            .map_err(|e| error::storage::failed("put", key, e.to_string()))?;
        staged
            .persist(&path)
            .map_err(|e| error::storage::failed("put", key, e.error.to_string()))?;

        Ok(md5_bytes(bytes))
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(error::storage::failed("delete", key, e.to_string())),
        }
    }

    fn describe(&self, key: &str) -> String {
        self.root.join(key).display().to_string()
    }
}
