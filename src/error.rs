//! Request-level error taxonomy for the issue service.
//!
//! Every variant is reported to the client as a JSON payload with status
//! 200; the variant itself is what tells success and failure apart.

use thiserror::Error;

/// Outcome of a rejected or failed issue request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Create was missing one of the required fields; nothing was written.
    #[error("required field(s) missing")]
    RequiredFieldsMissing { fields: Vec<&'static str> },

    /// The store rejected a create (bad or duplicate `_id`, write failure).
    #[error("could not create")]
    CouldNotCreate { id: Option<String>, reason: String },

    /// Update or delete without an identifier.
    #[error("missing _id")]
    MissingId,

    /// Update with an identifier but nothing to change.
    #[error("no update field(s) sent")]
    NoUpdateFields { id: String },

    /// Update failed: malformed ID, unknown ID, bad value or write failure.
    #[error("could not update")]
    CouldNotUpdate { id: String, reason: String },

    /// Delete failed: malformed ID, unknown ID or write failure.
    #[error("could not delete")]
    CouldNotDelete { id: String, reason: String },

    /// The store could not evaluate a list query.
    #[error("could not list issues")]
    ListFailed { kind: &'static str, reason: String },

    /// The request could not be read: an oversized or broken body, or a
    /// path segment that is not UTF-8.
    #[error("invalid request")]
    InvalidRequest { reason: String },

    /// The request handler itself failed (e.g. a panicked worker).
    #[error("internal error")]
    Internal(String),
}

impl ServiceError {
    /// The `_id` echoed back with the error, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::CouldNotCreate { id, .. } => id.as_deref(),
            Self::NoUpdateFields { id }
            | Self::CouldNotUpdate { id, .. }
            | Self::CouldNotDelete { id, .. } => Some(id),
            Self::RequiredFieldsMissing { .. }
            | Self::MissingId
            | Self::ListFailed { .. }
            | Self::InvalidRequest { .. }
            | Self::Internal(_) => None,
        }
    }
}

/// Result type using `ServiceError`.
pub type Result<T> = std::result::Result<T, ServiceError>;
