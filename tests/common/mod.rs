//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use issue_store::SharedStore;
use issue_tracker::build_router;
use serde_json::Value;
use tower::ServiceExt;

/// A router over a fresh in-memory store, driven without a socket.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(SharedStore::in_memory())
    }

    pub fn with_store(store: SharedStore) -> Self {
        Self {
            router: build_router(Arc::new(store)),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: impl Into<Body>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(body.into()).expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let json = serde_json::from_slice(&bytes).expect("response is JSON");
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> Value {
        let (status, json) = self.send(Method::GET, uri, None, Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        json
    }

    pub async fn form(&self, method: Method, uri: &str, body: &str) -> Value {
        let (status, json) = self
            .send(
                method,
                uri,
                Some("application/x-www-form-urlencoded"),
                body.to_string(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        json
    }

    pub async fn json(&self, method: Method, uri: &str, body: &Value) -> Value {
        let (status, json) = self
            .send(method, uri, Some("application/json"), body.to_string())
            .await;
        assert_eq!(status, StatusCode::OK);
        json
    }

    /// Create an issue with the three required fields and return its id.
    pub async fn create(&self, project: &str, title: &str) -> String {
        let created = self
            .form(
                Method::POST,
                &format!("/api/issues/{project}"),
                &format!("issue_title={title}&issue_text=Body&created_by=Tester"),
            )
            .await;
        created["_id"]
            .as_str()
            .expect("created issue has _id")
            .to_string()
    }
}
