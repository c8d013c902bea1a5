//! The issue record service.
//!
//! Validates requests, turns them into store operations and maps store
//! failures onto the service's error taxonomy. Holds nothing but the store
//! handle, so clones are cheap and share the same collection.

use std::sync::Arc;

use issue_store::{DocumentStore, Issue};
use tracing::{debug, info, warn};

use crate::error::{Result, ServiceError};
use crate::params::RequestFields;
use crate::response::Acknowledgement;

/// CRUD over one issue collection, partitioned by project.
#[derive(Clone)]
pub struct IssueService {
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for IssueService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueService").finish_non_exhaustive()
    }
}

impl IssueService {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Issues of `project` matching every present filter parameter.
    ///
    /// # Errors
    ///
    /// Returns `ListFailed` if a parameter cannot be cast or the store
    /// rejects the query.
    pub fn list(&self, project: &str, fields: &RequestFields) -> Result<Vec<Issue>> {
        let filter = fields.filter_for(project).map_err(|e| {
            warn!(project, error = %e, "Rejected list filter");
            ServiceError::ListFailed {
                kind: "CastError",
                reason: e.to_string(),
            }
        })?;

        let issues = self.store.find(&filter).map_err(|e| {
            warn!(project, error = %e, "Issue query failed");
            ServiceError::ListFailed {
                kind: e.kind(),
                reason: e.to_string(),
            }
        })?;

        debug!(project, count = issues.len(), "Listed issues");
        Ok(issues)
    }

    /// Create an open issue in `project` from the request body.
    ///
    /// # Errors
    ///
    /// Returns `RequiredFieldsMissing` before any write if `issue_title`,
    /// `issue_text` or `created_by` is absent, or `CouldNotCreate` if the
    /// store rejects the issue.
    pub fn create(&self, project: &str, fields: &RequestFields) -> Result<Issue> {
        let issue = fields.new_issue(project);

        let missing = issue.missing_required_fields();
        if !missing.is_empty() {
            debug!(project, ?missing, "Create rejected");
            return Err(ServiceError::RequiredFieldsMissing { fields: missing });
        }

        let requested_id = fields.identifier().map(String::from);
        let created = self.store.create(issue).map_err(|e| {
            warn!(project, id = ?requested_id, error = %e, "Could not create issue");
            ServiceError::CouldNotCreate {
                id: requested_id.clone(),
                reason: e.to_string(),
            }
        })?;

        info!(project, id = %created.id, "Created issue");
        Ok(created)
    }

    /// Apply the body's fields to the issue named by `_id`.
    ///
    /// Checks run in order and stop at the first failure: identifier
    /// present, at least one field to change, then the store write.
    ///
    /// # Errors
    ///
    /// Returns `MissingId`, `NoUpdateFields`, or `CouldNotUpdate` for any
    /// failure to apply the update.
    pub fn update(&self, fields: &RequestFields) -> Result<Acknowledgement> {
        let id = fields.identifier().ok_or(ServiceError::MissingId)?;

        let could_not_update = |reason: String| {
            warn!(id, %reason, "Could not update issue");
            ServiceError::CouldNotUpdate {
                id: id.to_string(),
                reason,
            }
        };

        let update = match fields.update_set() {
            Ok(update) if update.is_empty() => {
                return Err(ServiceError::NoUpdateFields { id: id.to_string() });
            }
            Ok(update) => update,
            Err(e) => return Err(could_not_update(e.to_string())),
        };

        self.store
            .find_by_id_and_update(id, &update)
            .map_err(|e| could_not_update(e.to_string()))?;

        info!(id, fields = ?update.field_names(), "Updated issue");
        Ok(Acknowledgement::updated(id))
    }

    /// Permanently remove the issue named by `_id`.
    ///
    /// # Errors
    ///
    /// Returns `MissingId`, or `CouldNotDelete` for any failure to remove.
    pub fn delete(&self, fields: &RequestFields) -> Result<Acknowledgement> {
        let id = fields.identifier().ok_or(ServiceError::MissingId)?;

        self.store.find_by_id_and_delete(id).map_err(|e| {
            warn!(id, error = %e, "Could not delete issue");
            ServiceError::CouldNotDelete {
                id: id.to_string(),
                reason: e.to_string(),
            }
        })?;

        info!(id, "Deleted issue");
        Ok(Acknowledgement::deleted(id))
    }
}
