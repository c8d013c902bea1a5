//! HTTP surface: one resource collection under `/api/issues/{project}`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use issue_store::DocumentStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::ServiceError;
use crate::params::{Project, RequestFields};
use crate::service::IssueService;

/// Route serving every issue operation.
pub const ISSUES_ROUTE: &str = "/api/issues/{project}";

/// Build the application router around a store handle.
pub fn build_router(store: Arc<dyn DocumentStore>) -> Router {
    Router::new()
        .route(
            ISSUES_ROUTE,
            get(list_issues)
                .post(create_issue)
                .put(update_issue)
                .delete(delete_issue),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(IssueService::new(store))
}

/// Bind `addr` and serve until SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, store: Arc<dyn DocumentStore>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local = listener.local_addr().unwrap_or(addr);
    info!(addr = %local, "Issue service listening");

    axum::serve(listener, build_router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Issue service stopped");
    Ok(())
}

async fn list_issues(
    State(service): State<IssueService>,
    Project(project): Project,
    fields: RequestFields,
) -> Response {
    match blocking(move || service.list(&project, &fields)).await {
        Ok(issues) => Json(issues).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn create_issue(
    State(service): State<IssueService>,
    Project(project): Project,
    fields: RequestFields,
) -> Response {
    match blocking(move || service.create(&project, &fields)).await {
        Ok(issue) => Json(issue).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn update_issue(State(service): State<IssueService>, fields: RequestFields) -> Response {
    match blocking(move || service.update(&fields)).await {
        Ok(ack) => ack.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn delete_issue(State(service): State<IssueService>, fields: RequestFields) -> Response {
    match blocking(move || service.delete(&fields)).await {
        Ok(ack) => ack.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Run a store-touching call off the async workers; the store may write
/// its file on every mutation.
async fn blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap_or_else(|e| {
        error!(error = %e, "Request worker failed");
        Err(ServiceError::Internal(e.to_string()))
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("Shutdown signal received");
}
