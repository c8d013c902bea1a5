//! Command-line interface for the issue service.
//!
//! This module provides the CLI parsing using clap.

use std::path::PathBuf;

use clap::Parser;

use crate::config::CliOverrides;

/// issue-tracker - Project-scoped issue tracker HTTP service.
#[derive(Parser, Debug, Default)]
#[command(name = "issue-tracker")]
#[command(
    author,
    version,
    about = "Project-scoped issue tracker HTTP service",
    long_about = None,
    after_help = "Serves GET/POST/PUT/DELETE on /api/issues/{project}."
)]
pub struct Cli {
    /// Config file (YAML); defaults to ./issues.yaml when present
    #[arg(long, env = "ISSUES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on (e.g. 127.0.0.1:3000)
    #[arg(long)]
    pub bind: Option<String>,

    /// JSONL file to persist issues to (in-memory only when unset)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Flags that override file and environment configuration.
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            bind: self.bind.clone(),
            store: self.store.clone(),
            log_json: self.log_json.then_some(true),
        }
    }
}
