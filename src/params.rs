//! Request parameter extraction.
//!
//! Issue requests carry their fields in the query string and in a form or
//! JSON body. `RequestFields` flattens both into string maps and translates
//! them into the store's typed filter, update and create shapes. A value
//! counts as present only when it is non-empty.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use issue_store::{Issue, IssueFilter, IssueUpdate};
use thiserror::Error;
use tracing::warn;

use crate::error::ServiceError;

/// Name of the identifier field on the wire.
pub const ID_FIELD: &str = "_id";

/// A present value that cannot be converted to the field's type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("Cast to boolean failed for value \"{value}\" at path \"{field}\"")]
    InvalidBool { field: &'static str, value: String },
}

/// Query-string and body fields of one request, kept apart so lookups can
/// choose which source wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFields {
    query: HashMap<String, String>,
    body: HashMap<String, String>,
}

impl RequestFields {
    /// Build from a raw query string, the request's `Content-Type`, and the
    /// body bytes. A body that does not parse is treated as empty.
    #[must_use]
    pub fn from_parts(query: &str, content_type: Option<&str>, body: &[u8]) -> Self {
        let is_json = content_type.is_some_and(|ct| {
            ct.split(';')
                .next()
                .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        });

        let body = if body.is_empty() {
            HashMap::new()
        } else if is_json {
            parse_json_body(body)
        } else {
            parse_form(body)
        };

        Self {
            query: parse_form(query.as_bytes()),
            body,
        }
    }

    /// Fields from the query string only.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        Self::from_parts(query, None, &[])
    }

    /// Fields from a form-encoded body only.
    #[must_use]
    pub fn from_form(body: &str) -> Self {
        Self::from_parts("", None, body.as_bytes())
    }

    /// Present query-string value for `name`.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        present(&self.query, name)
    }

    /// Present body value for `name`.
    #[must_use]
    pub fn body(&self, name: &str) -> Option<&str> {
        present(&self.body, name)
    }

    /// The issue identifier; the body wins over the query string.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.body(ID_FIELD).or_else(|| self.query(ID_FIELD))
    }

    /// Filter for listing `project`: every present query parameter that
    /// names an issue field, plus the identifier.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBool` if `open` is present but not a boolean.
    pub fn filter_for(&self, project: &str) -> Result<IssueFilter, ParamError> {
        let owned = |name: &str| self.query(name).map(String::from);
        Ok(IssueFilter {
            project: Some(project.to_string()),
            id: self.identifier().map(String::from),
            issue_title: owned("issue_title"),
            issue_text: owned("issue_text"),
            created_on: owned("created_on"),
            updated_on: owned("updated_on"),
            created_by: owned("created_by"),
            assigned_to: owned("assigned_to"),
            open: self.query("open").map(|v| parse_bool("open", v)).transpose()?,
            status_text: owned("status_text"),
        })
    }

    /// The partial update carried in the body. Only present fields are set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBool` if `open` is present but not a boolean.
    pub fn update_set(&self) -> Result<IssueUpdate, ParamError> {
        let owned = |name: &str| self.body(name).map(String::from);
        Ok(IssueUpdate {
            issue_title: owned("issue_title"),
            issue_text: owned("issue_text"),
            created_by: owned("created_by"),
            assigned_to: owned("assigned_to"),
            status_text: owned("status_text"),
            open: self.body("open").map(|v| parse_bool("open", v)).transpose()?,
        })
    }

    /// A new open issue for `project` built from the body. Absent optional
    /// fields default to empty strings; an absent identifier is left empty
    /// for the store to generate.
    #[must_use]
    pub fn new_issue(&self, project: &str) -> Issue {
        let text = |name: &str| self.body(name).unwrap_or_default().to_string();
        Issue {
            id: self.identifier().unwrap_or_default().to_string(),
            project: project.to_string(),
            issue_title: text("issue_title"),
            issue_text: text("issue_text"),
            created_by: text("created_by"),
            assigned_to: text("assigned_to"),
            status_text: text("status_text"),
            open: true,
            ..Default::default()
        }
    }
}

impl<S> FromRequest<S> for RequestFields
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().unwrap_or_default().to_string();
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = Bytes::from_request(req, state).await.map_err(|e| {
            warn!(error = %e, "Could not read request body");
            ServiceError::InvalidRequest {
                reason: e.body_text(),
            }
        })?;

        Ok(Self::from_parts(&query, content_type.as_deref(), &body))
    }
}

/// The `{project}` segment of the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project(pub String);

impl<S> FromRequestParts<S> for Project
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(project) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                warn!(error = %e, "Rejected project path");
                ServiceError::InvalidRequest {
                    reason: e.body_text(),
                }
            })?;
        Ok(Self(project))
    }
}

/// Parse a boolean the way form clients send it.
///
/// # Errors
///
/// Returns `InvalidBool` for anything but true/false, 1/0 or yes/no.
pub fn parse_bool(field: &'static str, value: &str) -> Result<bool, ParamError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ParamError::InvalidBool {
            field,
            value: value.to_string(),
        }),
    }
}

fn present<'a>(map: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    map.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

/// First occurrence of each key wins.
fn collect_first(pairs: impl IntoIterator<Item = (String, String)>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (key, value) in pairs {
        map.entry(key).or_insert(value);
    }
    map
}

fn parse_form(raw: &[u8]) -> HashMap<String, String> {
    serde_urlencoded::from_bytes::<Vec<(String, String)>>(raw)
        .map(collect_first)
        .unwrap_or_default()
}

fn parse_json_body(raw: &[u8]) -> HashMap<String, String> {
    let Ok(serde_json::Value::Object(object)) = serde_json::from_slice(raw) else {
        return HashMap::new();
    };

    collect_first(object.into_iter().filter_map(|(key, value)| {
        let text = match value {
            serde_json::Value::Null => return None,
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Some((key, text))
    }))
}
