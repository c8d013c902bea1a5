//! `issue-store` - project-scoped issue document store.
//!
//! Provides the find/create/update/delete primitives behind the issue
//! service. Data is held in memory and optionally persisted as JSONL.
//!
//! # Quick Start
//!
//! ```no_run
//! use issue_store::{DocumentStore, Issue, IssueFilter, IssueUpdate, SharedStore};
//!
//! let store = SharedStore::open("data/issues.jsonl").unwrap();
//!
//! // Create
//! let issue = store
//!     .create(Issue {
//!         project: "apitest".into(),
//!         issue_title: "Broken link".into(),
//!         issue_text: "The footer link 404s".into(),
//!         created_by: "Chai".into(),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//! // Query
//! let open = store
//!     .find(&IssueFilter { open: Some(true), ..IssueFilter::for_project("apitest") })
//!     .unwrap();
//!
//! // Update
//! let close = IssueUpdate { open: Some(false), ..Default::default() };
//! store.find_by_id_and_update(&issue.id, &close).unwrap();
//! ```

pub mod document;
pub mod error;
pub mod jsonl;
pub mod model;
pub mod query;
pub mod store;
pub mod util;

pub use document::{DocumentStore, SharedStore};
pub use error::{Result, StoreError};
pub use model::Issue;
pub use query::{IssueFilter, IssueUpdate};
pub use store::InMemoryStore;
