//! Core data types for issue-store.
//!
//! Serialized field names match the HTTP payloads, so a stored line in the
//! JSONL file is the same object a client receives.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const fn default_open() -> bool {
    true
}

/// Serde adapter for timestamps rendered as ISO-8601 with milliseconds.
pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&crate::util::format_timestamp(value))
    }

    /// # Errors
    ///
    /// Returns an error if the string is not an RFC 3339 timestamp.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// The primary issue entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Unique ID, 24 lowercase hex digits.
    #[serde(rename = "_id", default)]
    pub id: String,

    /// Project the issue belongs to (from the request path).
    #[serde(default)]
    pub project: String,

    pub issue_title: String,

    pub issue_text: String,

    /// Creation timestamp, never modified.
    #[serde(with = "iso_millis")]
    pub created_on: DateTime<Utc>,

    /// Last update timestamp.
    #[serde(with = "iso_millis")]
    pub updated_on: DateTime<Utc>,

    pub created_by: String,

    #[serde(default)]
    pub assigned_to: String,

    /// `false` once the issue has been closed.
    #[serde(default = "default_open")]
    pub open: bool,

    #[serde(default)]
    pub status_text: String,
}

impl Default for Issue {
    fn default() -> Self {
        let now = crate::util::now();
        Self {
            id: String::new(),
            project: String::new(),
            issue_title: String::new(),
            issue_text: String::new(),
            created_on: now,
            updated_on: now,
            created_by: String::new(),
            assigned_to: String::new(),
            open: true,
            status_text: String::new(),
        }
    }
}

impl Issue {
    /// Names of required fields that are empty, in schema order.
    #[must_use]
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        [
            ("issue_title", &self.issue_title),
            ("issue_text", &self.issue_text),
            ("created_by", &self.created_by),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}
