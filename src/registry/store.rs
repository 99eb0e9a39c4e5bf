//! Conditional read-modify-write of the registry document
//!
//! Several CI jobs may reconcile different plugins at the same time. Each
//! update reads the document with its ETag and writes back only if the ETag is
//! unchanged; a lost race reloads and reapplies the change.

use super::RegistryDocument;
use crate::error::{self, EcopackError, Result};
use crate::retry::RetryPolicy;
use crate::storage::{ObjectStore, PutCondition};

/// A registry document together with the version token it was read at
#[derive(Debug, Clone)]
pub struct VersionedDocument {
    pub document: RegistryDocument,
    /// `None` when no document exists yet
    pub etag: Option<String>,
}

pub struct RegistryStore<'a> {
    store: &'a dyn ObjectStore,
    key: String,
    retry: RetryPolicy,
}

impl<'a> RegistryStore<'a> {
    pub fn new(store: &'a dyn ObjectStore, key: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            store,
            key: key.into(),
            retry,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the document, treating a missing object as an empty registry
    pub fn fetch(&self) -> Result<VersionedDocument> {
        match self.store.get(&self.key)? {
            Some(object) => Ok(VersionedDocument {
                document: RegistryDocument::from_slice(&object.bytes)?,
                etag: object.etag,
            }),
            None => Ok(VersionedDocument {
                document: RegistryDocument::empty(),
                etag: None,
            }),
        }
    }

    /// Read the document, failing if it does not exist
    pub fn load(&self) -> Result<RegistryDocument> {
        let object = self
            .store
            .get(&self.key)?
            .ok_or_else(|| error::storage::not_found(&self.key))?;
        RegistryDocument::from_slice(&object.bytes)
    }

    /// Apply `change` to the current document and store the result
    ///
    /// `change` may run more than once if another writer gets in between. The
    /// document is only written when `change` actually modified it.
    pub fn update<T, F>(&self, mut change: F) -> Result<T>
    where
        F: FnMut(&RegistryDocument) -> Result<(RegistryDocument, T)>,
    {
        let attempts = self.retry.attempts();
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let current = self.fetch()?;
            let (updated, outcome) = change(&current.document)?;

            if updated == current.document {
                tracing::info!(key = %self.key, "registry already up to date");
                return Ok(outcome);
            }

            let condition = match current.etag {
                Some(etag) => PutCondition::IfMatch(etag),
                None => PutCondition::IfAbsent,
            };
            let bytes = updated.to_json_bytes()?;

            match self.store.put(&self.key, &bytes, &condition) {
                Ok(_) => {
                    tracing::info!(
                        destination = %self.store.describe(&self.key),
                        records = updated.len(),
                        "registry updated"
                    );
                    return Ok(outcome);
                }
                Err(err @ EcopackError::PreconditionFailed { .. }) => {
                    tracing::warn!(
                        key = %self.key,
                        attempt,
                        "registry changed concurrently, reloading"
                    );
                    last_error = err.to_string();
                    if attempt < attempts {
                        self.retry.wait(attempt);
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Err(error::retry::exhausted(
            "Registry update",
            attempts,
            last_error,
        ))
    }
}
