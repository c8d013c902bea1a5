//! `issue_tracker` - Project-scoped issue tracker HTTP service
//!
//! This crate provides the request handling for the `issue-tracker`
//! binary: a single `/api/issues/{project}` collection with create, list,
//! update and delete, backed by the `issue-store` document store.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Configuration layering (file, env, CLI)
//! - [`error`] - Request error taxonomy
//! - [`logging`] - Tracing subscriber setup
//! - [`params`] - Query/body extraction and typed translation
//! - [`response`] - JSON payload shapes
//! - [`server`] - axum router and listener
//! - [`service`] - Issue record service

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod params;
pub mod response;
pub mod server;
pub mod service;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use issue_store::SharedStore;
use tracing::info;

pub use error::{Result, ServiceError};
pub use server::build_router;
pub use service::IssueService;

/// Run the service.
///
/// This is the main entry point called from `main()`: parse arguments,
/// resolve configuration, open the store and serve until shutdown.
///
/// # Errors
///
/// Returns an error if configuration, store loading or serving fails.
pub fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let config = config::load_config(cli.config.as_deref(), &cli.overrides())?;

    logging::init_logging(cli.verbose, cli.quiet, config.log_json)?;

    let store = match &config.store {
        Some(path) => {
            let store = SharedStore::open(path)
                .with_context(|| format!("failed to open issue store {}", path.display()))?;
            info!(path = %path.display(), issues = store.len()?, "Opened issue store");
            store
        }
        None => {
            info!("Using in-memory issue store");
            SharedStore::in_memory()
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    runtime.block_on(server::serve(config.bind, Arc::new(store)))
}
