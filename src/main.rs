//! `issue-tracker` - Project-scoped issue tracker HTTP service
//!
//! Serves create/list/update/delete for issues under `/api/issues/{project}`,
//! persisted to a JSONL file or kept in memory.

use issue_tracker::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
