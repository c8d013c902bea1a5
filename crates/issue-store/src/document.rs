//! The document-store seam the issue service is written against.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::error::{Result, StoreError};
use crate::model::Issue;
use crate::query::{IssueFilter, IssueUpdate};
use crate::store::InMemoryStore;

/// Find/create/update/delete primitives over the issue collection.
///
/// Implementations must be safe to share across request handlers.
pub trait DocumentStore: Send + Sync {
    /// Issues matching `filter`, in the store's natural order.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter cannot be evaluated.
    fn find(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Persist a new issue, generating its ID when empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue is rejected or cannot be stored.
    fn create(&self, issue: Issue) -> Result<Issue>;

    /// Merge `update` into the issue with `id` and return the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is malformed or unknown, or the write fails.
    fn find_by_id_and_update(&self, id: &str, update: &IssueUpdate) -> Result<Issue>;

    /// Remove the issue with `id` and return it.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is malformed or unknown, or the write fails.
    fn find_by_id_and_delete(&self, id: &str) -> Result<Issue>;
}

/// Mutex-guarded `InMemoryStore` that writes through to its JSONL file.
///
/// When the inner store has a path, a mutation is applied to a copy, the
/// copy is saved, and only then does it replace the live collection; a
/// failed save leaves memory and disk as they were. Writers are
/// serialized; concurrent updates to the same issue resolve last-write-wins.
#[derive(Debug, Default)]
pub struct SharedStore {
    inner: Mutex<InMemoryStore>,
}

impl SharedStore {
    #[must_use]
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    /// Purely in-memory store with nothing on disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store persisted at `path`, loading existing issues if the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        InMemoryStore::open_or_create(path).map(Self::new)
    }

    /// Number of stored issues.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether the store holds no issues.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, InMemoryStore>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Storage("store lock poisoned".to_string()))
    }

    /// Run `op` under the lock and commit its result only once it is on disk.
    fn commit<T>(&self, op: impl FnOnce(&mut InMemoryStore) -> Result<T>) -> Result<T> {
        let mut store = self.lock()?;
        if store.path().is_none() {
            return op(&mut store);
        }

        let mut candidate = store.clone();
        let out = op(&mut candidate)?;
        candidate.save().inspect_err(|e| {
            warn!(error = %e, "Failed to write issues to disk; change discarded");
        })?;
        *store = candidate;
        Ok(out)
    }
}

impl DocumentStore for SharedStore {
    fn find(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        let store = self.lock()?;
        Ok(store.find(filter)?.into_iter().cloned().collect())
    }

    fn create(&self, issue: Issue) -> Result<Issue> {
        self.commit(|store| store.create_issue(&issue))
    }

    fn find_by_id_and_update(&self, id: &str, update: &IssueUpdate) -> Result<Issue> {
        self.commit(|store| store.update_issue(id, update))
    }

    fn find_by_id_and_delete(&self, id: &str) -> Result<Issue> {
        self.commit(|store| store.delete_issue(id))
    }
}
