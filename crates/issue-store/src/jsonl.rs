//! The issue file: one JSON-encoded `Issue` per line.
//!
//! Blank lines are ignored on load; every `_id` must be well formed and
//! unique, and is lowercased as it is read. Saves replace the whole file by
//! writing a sibling `.jsonl.tmp` and renaming it into place.

use std::collections::HashSet;
use std::fs;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::model::Issue;
use crate::util;

/// Read every issue from `path`, in file order.
///
/// # Errors
///
/// Returns `FileNotFound` if `path` does not exist, `Io` if it cannot be
/// read, or `JsonlParse` naming the first line that is not an issue or
/// carries a malformed or repeated `_id`.
pub fn load(path: &Path) -> Result<Vec<Issue>> {
    let file = fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StoreError::FileNotFound(path.to_path_buf()),
        _ => StoreError::Io(e),
    })?;

    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line_no = index + 1;
        let Some(mut issue) = parse_line(line_no, &line?)? else {
            continue;
        };

        let id = util::normalize_id(&issue.id).ok_or_else(|| StoreError::JsonlParse {
            line: line_no,
            reason: format!("malformed _id '{}'", issue.id),
        })?;
        if !seen.insert(id.clone()) {
            return Err(StoreError::JsonlParse {
                line: line_no,
                reason: format!("duplicate _id {id}"),
            });
        }
        issue.id = id;
        issues.push(issue);
    }
    Ok(issues)
}

fn parse_line(line_no: usize, line: &str) -> Result<Option<Issue>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| StoreError::JsonlParse {
            line: line_no,
            reason: e.to_string(),
        })
}

/// Replace the contents of `path` with `issues`, creating the parent
/// directory if needed.
///
/// # Errors
///
/// Returns `Io` if the temp file cannot be written or renamed, or `Json`
/// if an issue fails to encode.
pub fn save<'a>(path: &Path, issues: impl IntoIterator<Item = &'a Issue>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let staging = path.with_extension("jsonl.tmp");
    {
        let mut out = BufWriter::new(fs::File::create(&staging)?);
        for issue in issues {
            serde_json::to_writer(&mut out, issue)?;
            out.write_all(b"\n")?;
        }
        out.into_inner().map_err(|e| StoreError::Io(e.into_error()))?.sync_all()?;
    }
    fs::rename(&staging, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(id: &str, title: &str) -> Issue {
        Issue {
            id: id.to_string(),
            project: "apitest".to_string(),
            issue_title: title.to_string(),
            issue_text: "text".to_string(),
            created_by: "Chai".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_roundtrip_preserves_order_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.jsonl");

        let mut closed = issue("bbbbbbbbbbbbbbbbbbbbbbbb", "Second");
        closed.open = false;
        closed.status_text = "done".to_string();
        let issues = vec![issue("aaaaaaaaaaaaaaaaaaaaaaaa", "First"), closed];

        save(&path, &issues).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, issues);
        assert!(!path.with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("issues.jsonl");
        save(&path, &[issue("aaaaaaaaaaaaaaaaaaaaaaaa", "First")]).unwrap();
        assert_eq!(load(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load(Path::new("/nonexistent/issues.jsonl"));
        assert!(matches!(result, Err(StoreError::FileNotFound(_))));
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        fs::write(&path, "").unwrap();

        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blanks.jsonl");
        let json = serde_json::to_string(&issue("aaaaaaaaaaaaaaaaaaaaaaaa", "T")).unwrap();
        fs::write(&path, format!("\n{json}\n\n")).unwrap();

        assert_eq!(load(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_load_reports_bad_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        let json = serde_json::to_string(&issue("aaaaaaaaaaaaaaaaaaaaaaaa", "T")).unwrap();
        fs::write(&path, format!("{json}\n{{not json\n")).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, StoreError::JsonlParse { line: 2, .. }));
    }

    #[test]
    fn test_load_lowercases_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upper.jsonl");
        let json = serde_json::to_string(&issue("AAAAAAAAAAAAAAAAAAAAAAAA", "T")).unwrap();
        fs::write(&path, format!("{json}\n")).unwrap();

        assert_eq!(load(&path).unwrap()[0].id, "aaaaaaaaaaaaaaaaaaaaaaaa");
    }

    #[test]
    fn test_load_rejects_malformed_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("malformed.jsonl");
        let good = serde_json::to_string(&issue("aaaaaaaaaaaaaaaaaaaaaaaa", "T")).unwrap();
        let bad = serde_json::to_string(&issue("not-an-id", "T")).unwrap();
        fs::write(&path, format!("{good}\n\n{bad}\n")).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, StoreError::JsonlParse { line: 3, ref reason } if reason.contains("not-an-id")));
    }

    #[test]
    fn test_load_rejects_duplicate_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dup.jsonl");
        let first = serde_json::to_string(&issue("aaaaaaaaaaaaaaaaaaaaaaaa", "First")).unwrap();
        let again = serde_json::to_string(&issue("AAAAAAAAAAAAAAAAAAAAAAAA", "Again")).unwrap();
        fs::write(&path, format!("{first}\n{again}\n")).unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, StoreError::JsonlParse { line: 2, ref reason } if reason.contains("duplicate")));
    }
}
