//! In-memory object store for tests

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::{ObjectStore, PutCondition, StoredObject, validate_key};
use crate::error::{self, Result};
use crate::hash::md5_bytes;

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RefCell<BTreeMap<String, Vec<u8>>>,
    /// Number of conditional writes to reject as if another writer won the race
    injected_conflicts: RefCell<u32>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.objects.borrow_mut().insert(key.to_string(), bytes.into());
    }

    pub fn contents(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.borrow().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.borrow().keys().cloned().collect()
    }

    /// Make the next `count` conditional writes fail with `PreconditionFailed`
    pub fn inject_conflicts(&self, count: u32) {
        *self.injected_conflicts.borrow_mut() = count;
    }
}

impl ObjectStore for MemoryObjectStore {
    fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        validate_key(key)?;
        Ok(self.objects.borrow().get(key).map(|bytes| StoredObject {
            bytes: bytes.clone(),
            etag: Some(md5_bytes(bytes)),
        }))
    }

    fn put(&self, key: &str, bytes: &[u8], condition: &PutCondition) -> Result<String> {
        validate_key(key)?;
        if *condition != PutCondition::Always {
            let mut conflicts = self.injected_conflicts.borrow_mut();
            if *conflicts > 0 {
                *conflicts -= 1;
                return Err(error::storage::precondition_failed(key));
            }
        }

        let current = self.objects.borrow().get(key).map(|b| md5_bytes(b));
        let allowed = match condition {
            PutCondition::Always => true,
            PutCondition::IfAbsent => current.is_none(),
            PutCondition::IfMatch(expected) => current.as_deref() == Some(expected.as_str()),
        };
        if !allowed {
            return Err(error::storage::precondition_failed(key));
        }

        self.objects.borrow_mut().insert(key.to_string(), bytes.to_vec());
        Ok(md5_bytes(bytes))
    }

    fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.objects.borrow_mut().remove(key);
        Ok(())
    }

    fn describe(&self, key: &str) -> String {
        format!("memory://{key}")
    }
}
