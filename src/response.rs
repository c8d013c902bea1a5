//! JSON payload shapes and their HTTP rendering.
//!
//! All responses, including errors, go out with status 200.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::ServiceError;

/// `{result, _id}` acknowledgement for a successful update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acknowledgement {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

impl Acknowledgement {
    #[must_use]
    pub fn updated(id: impl Into<String>) -> Self {
        Self {
            result: "successfully updated",
            id: id.into(),
        }
    }

    #[must_use]
    pub fn deleted(id: impl Into<String>) -> Self {
        Self {
            result: "successfully deleted",
            id: id.into(),
        }
    }
}

impl IntoResponse for Acknowledgement {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// `{error, _id?}` body sent for every `ServiceError`.
///
/// Only list failures carry the underlying store error and only unreadable
/// requests carry a `reason`; update and delete failures carry just the `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&ServiceError> for ErrorPayload {
    fn from(err: &ServiceError) -> Self {
        let (name, reason) = match err {
            ServiceError::ListFailed { kind, reason } => (Some(*kind), Some(reason.clone())),
            ServiceError::InvalidRequest { reason } => (None, Some(reason.clone())),
            _ => (None, None),
        };
        Self {
            error: err.to_string(),
            id: err.id().map(String::from),
            name,
            reason,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(ErrorPayload::from(&self))).into_response()
    }
}
