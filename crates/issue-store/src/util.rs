//! ID generation, ID validation and timestamp helpers.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

/// Length of an issue identifier in hex digits.
pub const ID_LEN: usize = 24;

// ============================================================================
// ID Generation
// ============================================================================

/// Generate a unique 24-digit hex issue ID.
///
/// The ID is the leading digits of a SHA256 digest over the issue's
/// identifying content and creation time. The `exists` closure checks for
/// collisions; on a hit the nonce is bumped and the digest recomputed.
#[must_use]
pub fn generate_id<F>(
    project: &str,
    title: &str,
    creator: &str,
    created_on: DateTime<Utc>,
    exists: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    let mut nonce = 0u64;
    loop {
        let seed = generate_id_seed(project, title, creator, created_on, nonce);
        let id = compute_id_hash(&seed);
        if !exists(&id) {
            return id;
        }
        nonce += 1;
    }
}

fn generate_id_seed(
    project: &str,
    title: &str,
    creator: &str,
    created_on: DateTime<Utc>,
    nonce: u64,
) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        project,
        title,
        creator,
        created_on.timestamp_nanos_opt().unwrap_or(0),
        nonce
    )
}

fn compute_id_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..ID_LEN].to_string()
}

// ============================================================================
// ID Validation
// ============================================================================

/// Whether `id` has the shape of an issue identifier (24 hex digits).
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Canonical (lowercase) form of a well-formed ID, or `None` if malformed.
#[must_use]
pub fn normalize_id(id: &str) -> Option<String> {
    is_valid_id(id).then(|| id.to_ascii_lowercase())
}

// ============================================================================
// Timestamps
// ============================================================================

/// Current time truncated to millisecond precision.
///
/// Stored timestamps carry milliseconds only, so an issue read back from
/// JSONL compares equal to the one that was written.
#[must_use]
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// ISO-8601 rendering used on the wire (`2024-05-01T12:00:00.000Z`).
#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
