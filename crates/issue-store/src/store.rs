//! In-memory issue collection backed by `HashMap`.
//!
//! Provides the find/create/update/delete primitives without any database
//! dependency. Insertion order is kept so `find` returns issues in the
//! order they were created.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::jsonl;
use crate::model::Issue;
use crate::query::{IssueFilter, IssueUpdate};
use crate::util;

/// In-memory issue store.
///
/// All data lives in memory. Use `open()` to load from a JSONL file
/// and `save()` to persist back.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    issues: HashMap<String, Issue>,
    order: Vec<String>,
    jsonl_path: Option<PathBuf>,
}

impl InMemoryStore {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            issues: HashMap::new(),
            order: Vec::new(),
            jsonl_path: None,
        }
    }

    /// Open and load from a JSONL file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loaded = jsonl::load(path)?;

        let mut store = Self::new();
        store.jsonl_path = Some(path.to_path_buf());

        for issue in loaded {
            store.insert(issue);
        }

        debug!(path = %path.display(), count = store.len(), "Loaded issues");
        Ok(store)
    }

    /// Open a JSONL file, starting empty if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::open(path) {
            Err(StoreError::FileNotFound(_)) => {
                debug!(path = %path.display(), "No issue file yet; starting empty");
                let mut store = Self::new();
                store.jsonl_path = Some(path.to_path_buf());
                Ok(store)
            }
            other => other,
        }
    }

    /// The JSONL file this store persists to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.jsonl_path.as_deref()
    }

    /// Save to the file that was opened.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if no file path is set, or `Io` on write failure.
    pub fn save(&self) -> Result<()> {
        let path = self
            .jsonl_path
            .as_ref()
            .ok_or_else(|| StoreError::Storage("No file path set; use save_to()".to_string()))?;
        self.save_to(path)
    }

    /// Save to a specific file path.
    ///
    /// # Errors
    ///
    /// Returns `Io` on write failure.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        jsonl::save(path.as_ref(), self.iter())
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Create a new issue in the store.
    ///
    /// If `issue.id` is empty, a new ID is generated; a supplied ID is kept
    /// (lowercased). Both timestamps are set to the same current instant.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if a required field is empty, `InvalidId` if the
    /// supplied ID is malformed, or `IdCollision` if it already exists.
    pub fn create_issue(&mut self, issue: &Issue) -> Result<Issue> {
        if let Some(field) = issue.missing_required_fields().first() {
            return Err(StoreError::validation(*field, "is required"));
        }

        let mut new_issue = issue.clone();
        let now = util::now();

        if new_issue.id.is_empty() {
            new_issue.id = util::generate_id(
                &new_issue.project,
                &new_issue.issue_title,
                &new_issue.created_by,
                now,
                |id| self.issues.contains_key(id),
            );
        } else {
            let id = util::normalize_id(&new_issue.id).ok_or_else(|| StoreError::InvalidId {
                id: new_issue.id.clone(),
            })?;
            if self.issues.contains_key(&id) {
                return Err(StoreError::IdCollision { id });
            }
            new_issue.id = id;
        }

        new_issue.created_on = now;
        new_issue.updated_on = now;

        self.insert(new_issue.clone());
        debug!(id = %new_issue.id, project = %new_issue.project, "Created issue");

        Ok(new_issue)
    }

    /// Merge `update` into an existing issue and refresh `updated_on`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the ID is malformed, `IssueNotFound` if no issue
    /// has it, or `Validation` if a required field would become empty.
    pub fn update_issue(&mut self, id: &str, update: &IssueUpdate) -> Result<Issue> {
        let key = Self::key(id)?;
        let issue = self
            .issues
            .get_mut(&key)
            .ok_or_else(|| StoreError::IssueNotFound { id: id.to_string() })?;

        for (field, value) in [
            ("issue_title", &update.issue_title),
            ("issue_text", &update.issue_text),
            ("created_by", &update.created_by),
        ] {
            if value.as_ref().is_some_and(String::is_empty) {
                return Err(StoreError::validation(field, "cannot be empty"));
            }
        }

        if let Some(ref title) = update.issue_title {
            issue.issue_title.clone_from(title);
        }
        if let Some(ref text) = update.issue_text {
            issue.issue_text.clone_from(text);
        }
        if let Some(ref creator) = update.created_by {
            issue.created_by.clone_from(creator);
        }
        if let Some(ref assignee) = update.assigned_to {
            issue.assigned_to.clone_from(assignee);
        }
        if let Some(ref status) = update.status_text {
            issue.status_text.clone_from(status);
        }
        if let Some(open) = update.open {
            issue.open = open;
        }

        // A clock step backwards must not put updated_on before created_on.
        issue.updated_on = util::now().max(issue.created_on);

        debug!(id = %key, fields = ?update.field_names(), "Updated issue");
        Ok(issue.clone())
    }

    /// Remove an issue and return it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the ID is malformed, or `IssueNotFound` if no
    /// issue has it.
    pub fn delete_issue(&mut self, id: &str) -> Result<Issue> {
        let key = Self::key(id)?;
        let removed = self
            .issues
            .remove(&key)
            .ok_or_else(|| StoreError::IssueNotFound { id: id.to_string() })?;
        self.order.retain(|existing| *existing != key);

        debug!(id = %key, "Deleted issue");
        Ok(removed)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Issues matching every set field of `filter`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the filter carries a malformed ID.
    pub fn find(&self, filter: &IssueFilter) -> Result<Vec<&Issue>> {
        let normalized;
        let filter = match filter.id {
            Some(ref id) => {
                normalized = IssueFilter {
                    id: Some(Self::key(id)?),
                    ..filter.clone()
                };
                &normalized
            }
            None => filter,
        };

        Ok(self.iter().filter(|issue| filter.matches(issue)).collect())
    }

    /// All issues in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.order.iter().filter_map(|id| self.issues.get(id))
    }

    /// Get total issue count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn key(id: &str) -> Result<String> {
        util::normalize_id(id).ok_or_else(|| StoreError::InvalidId { id: id.to_string() })
    }

    fn insert(&mut self, issue: Issue) {
        let id = issue.id.clone();
        if self.issues.insert(id.clone(), issue).is_none() {
            self.order.push(id);
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "5f1e9b8c2a4d3e6f7a8b9c0d";

    fn make_issue(id: &str, project: &str, title: &str) -> Issue {
        Issue {
            id: id.to_string(),
            project: project.to_string(),
            issue_title: title.to_string(),
            issue_text: "text".to_string(),
            created_by: "Chai".to_string(),
            ..Default::default()
        }
    }

    fn get<'a>(store: &'a InMemoryStore, id: &str) -> &'a Issue {
        let filter = IssueFilter {
            id: Some(id.to_string()),
            ..Default::default()
        };
        store.find(&filter).unwrap().into_iter().next().unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let mut store = InMemoryStore::new();
        let created = store
            .create_issue(&make_issue("", "apitest", "Test issue"))
            .unwrap();
        assert!(util::is_valid_id(&created.id));
        assert_eq!(created.issue_title, "Test issue");
        assert_eq!(created.created_on, created.updated_on);
        assert!(created.open);

        let fetched = get(&store, &created.id);
        assert_eq!(fetched, &created);
    }

    #[test]
    fn test_create_with_explicit_id() {
        let mut store = InMemoryStore::new();
        let created = store.create_issue(&make_issue(ID, "p", "Explicit")).unwrap();
        assert_eq!(created.id, ID);
    }

    #[test]
    fn test_create_lowercases_explicit_id() {
        let mut store = InMemoryStore::new();
        let created = store
            .create_issue(&make_issue(&ID.to_uppercase(), "p", "Explicit"))
            .unwrap();
        assert_eq!(created.id, ID);
        assert_eq!(get(&store, &ID.to_uppercase()).id, ID);
    }

    #[test]
    fn test_create_id_collision() {
        let mut store = InMemoryStore::new();
        store.create_issue(&make_issue(ID, "p", "First")).unwrap();

        let result = store.create_issue(&make_issue(ID, "p", "Duplicate"));
        assert!(matches!(result, Err(StoreError::IdCollision { .. })));
        assert_eq!(get(&store, ID).issue_title, "First");
    }

    #[test]
    fn test_create_invalid_id_rejected() {
        let mut store = InMemoryStore::new();
        let result = store.create_issue(&make_issue("not-an-id", "p", "Bad"));
        assert!(matches!(result, Err(StoreError::InvalidId { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_missing_required_rejected() {
        let mut store = InMemoryStore::new();
        let mut issue = make_issue("", "p", "T");
        issue.created_by.clear();
        let result = store.create_issue(&issue);
        assert!(matches!(result, Err(StoreError::Validation { ref field, .. }) if field == "created_by"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_merges_only_set_fields() {
        let mut store = InMemoryStore::new();
        let mut issue = make_issue(ID, "p", "Original");
        issue.assigned_to = "Mocha".to_string();
        let created = store.create_issue(&issue).unwrap();

        let update = IssueUpdate {
            status_text: Some("In QA".to_string()),
            ..Default::default()
        };
        let updated = store.update_issue(ID, &update).unwrap();
        assert_eq!(updated.status_text, "In QA");
        assert_eq!(updated.issue_title, "Original");
        assert_eq!(updated.assigned_to, "Mocha");
        assert!(updated.open);
        assert_eq!(updated.created_on, created.created_on);
        assert!(updated.updated_on >= created.updated_on);
    }

    #[test]
    fn test_update_can_close_and_reopen() {
        let mut store = InMemoryStore::new();
        store.create_issue(&make_issue(ID, "p", "T")).unwrap();

        let close = IssueUpdate {
            open: Some(false),
            ..Default::default()
        };
        assert!(!store.update_issue(ID, &close).unwrap().open);

        let reopen = IssueUpdate {
            open: Some(true),
            ..Default::default()
        };
        assert!(store.update_issue(ID, &reopen).unwrap().open);
    }

    #[test]
    fn test_update_nonexistent() {
        let mut store = InMemoryStore::new();
        let result = store.update_issue(ID, &IssueUpdate::default());
        assert!(matches!(result, Err(StoreError::IssueNotFound { .. })));
    }

    #[test]
    fn test_update_invalid_id() {
        let mut store = InMemoryStore::new();
        let result = store.update_issue("invalid", &IssueUpdate::default());
        assert!(matches!(result, Err(StoreError::InvalidId { .. })));
    }

    #[test]
    fn test_update_rejects_emptying_required_field() {
        let mut store = InMemoryStore::new();
        store.create_issue(&make_issue(ID, "p", "Keep")).unwrap();
        let update = IssueUpdate {
            issue_title: Some(String::new()),
            status_text: Some("x".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_issue(ID, &update),
            Err(StoreError::Validation { .. })
        ));
        let kept = get(&store, ID);
        assert_eq!(kept.issue_title, "Keep");
        assert_eq!(kept.status_text, "");
    }

    #[test]
    fn test_delete_issue() {
        let mut store = InMemoryStore::new();
        store.create_issue(&make_issue(ID, "p", "Gone")).unwrap();
        let removed = store.delete_issue(ID).unwrap();
        assert_eq!(removed.id, ID);
        assert!(store.is_empty());
        assert_eq!(store.iter().count(), 0);
        assert!(matches!(
            store.delete_issue(ID),
            Err(StoreError::IssueNotFound { .. })
        ));
    }

    #[test]
    fn test_find_by_project_in_insertion_order() {
        let mut store = InMemoryStore::new();
        for title in ["one", "two", "three"] {
            store.create_issue(&make_issue("", "a", title)).unwrap();
        }
        store.create_issue(&make_issue("", "b", "other")).unwrap();

        let titles: Vec<&str> = store
            .find(&IssueFilter::for_project("a"))
            .unwrap()
            .into_iter()
            .map(|i| i.issue_title.as_str())
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
        assert_eq!(store.find(&IssueFilter::default()).unwrap().len(), 4);
    }

    #[test]
    fn test_find_by_id() {
        let mut store = InMemoryStore::new();
        store.create_issue(&make_issue(ID, "p", "T")).unwrap();
        store.create_issue(&make_issue("", "p", "U")).unwrap();

        let filter = IssueFilter {
            id: Some(ID.to_uppercase()),
            ..IssueFilter::for_project("p")
        };
        let found = store.find(&filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ID);
    }

    #[test]
    fn test_find_with_malformed_id_fails() {
        let store = InMemoryStore::new();
        let filter = IssueFilter {
            id: Some("zzz".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            store.find(&filter),
            Err(StoreError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_roundtrip_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.jsonl");

        let mut store = InMemoryStore::open_or_create(&path).unwrap();
        assert!(store.is_empty());
        let first = store.create_issue(&make_issue("", "p", "First")).unwrap();
        let second = store.create_issue(&make_issue("", "p", "Second")).unwrap();
        store.save().unwrap();

        let loaded = InMemoryStore::open(&path).unwrap();
        let issues: Vec<&Issue> = loaded.iter().collect();
        assert_eq!(issues, vec![&first, &second]);
        assert_eq!(loaded.path(), Some(path.as_path()));
    }

    #[test]
    fn test_save_without_path_fails() {
        let store = InMemoryStore::new();
        assert!(matches!(store.save(), Err(StoreError::Storage(_))));
    }
}
