//! Store error taxonomy.
//!
//! Every failure the store can report, plus `kind()` for callers that
//! surface a stable name instead of the message.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    // === Lookup ===
    #[error("no issue with _id {id}")]
    IssueNotFound { id: String },

    /// A client-chosen `_id` is already taken.
    #[error("_id {id} is already in use")]
    IdCollision { id: String },

    /// Not 24 hex digits.
    #[error("malformed _id '{id}'")]
    InvalidId { id: String },

    // === Field rules ===
    #[error("{field} {reason}")]
    Validation { field: String, reason: String },

    // === Backing file ===
    /// A line of the issue file is not an issue record (1-based).
    #[error("issue file line {line}: {reason}")]
    JsonlParse { line: usize, reason: String },

    #[error("issue file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Lock poisoning or a save with no file attached.
    #[error("store unavailable: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("could not encode issue: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// A field broke a create/update rule, e.g. `("created_by", "is required")`.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable name of the variant, reported alongside list failures.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::IssueNotFound { .. } => "IssueNotFound",
            Self::IdCollision { .. } => "IdCollision",
            Self::InvalidId { .. } => "InvalidId",
            Self::Validation { .. } => "ValidationError",
            Self::JsonlParse { .. } => "JsonlParseError",
            Self::FileNotFound(_) => "FileNotFound",
            Self::Storage(_) => "StorageError",
            Self::Io(_) => "IoError",
            Self::Json(_) => "JsonError",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
