use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One candidate session log. The modification time bounds and orders the
/// lookback scan; it never decides which timestamps inside count.
#[derive(Debug, Clone)]
pub struct LogFile {
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
}

/// Collect every file under `root` whose extension matches `suffix`.
/// Unreadable entries are skipped rather than treated as fatal.
pub fn scan_log_files(root: &Path, suffix: &str) -> Vec<LogFile> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some(suffix) {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        let Ok(modified) = meta.modified() else {
            continue;
        };
        files.push(LogFile {
            path: path.to_path_buf(),
            modified: DateTime::<Utc>::from(modified),
        });
    }
    debug!(root = ?root, count = files.len(), "scanned log corpus");
    files
}

/// Newest first, so a lookback walk can stop at the first stale file.
pub fn sort_newest_first(files: &mut [LogFile]) {
    files.sort_by(|a, b| b.modified.cmp(&a.modified));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_nested_log_files_only() {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("project-a")).expect("mkdir");
        fs::create_dir_all(dir.path().join("project-b/nested")).expect("mkdir");
        fs::write(dir.path().join("project-a/session.jsonl"), "{}\n").expect("write");
        fs::write(dir.path().join("project-b/nested/other.jsonl"), "{}\n").expect("write");
        fs::write(dir.path().join("project-a/notes.txt"), "skip me").expect("write");

        let files = scan_log_files(dir.path(), "jsonl");
        assert_eq!(files.len(), 2);
        assert!(files
            .iter()
            .all(|f| f.path.extension().and_then(|s| s.to_str()) == Some("jsonl")));
    }

    #[test]
    fn missing_root_yields_empty() {
        let dir = tempdir().expect("tempdir");
        let files = scan_log_files(&dir.path().join("absent"), "jsonl");
        assert!(files.is_empty());
    }

    #[test]
    fn sorts_newest_first() {
        let t = |h| Utc.with_ymd_and_hms(2025, 6, 1, h, 0, 0).unwrap();
        let mut files = vec![
            LogFile {
                path: PathBuf::from("a.jsonl"),
                modified: t(9),
            },
            LogFile {
                path: PathBuf::from("b.jsonl"),
                modified: t(14),
            },
            LogFile {
                path: PathBuf::from("c.jsonl"),
                modified: t(11),
            },
        ];
        sort_newest_first(&mut files);
        let order: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            order,
            vec![
                PathBuf::from("b.jsonl"),
                PathBuf::from("c.jsonl"),
                PathBuf::from("a.jsonl")
            ]
        );
    }
}
