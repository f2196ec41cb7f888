use crate::parse::parse_timestamp_value;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// One parsed session-log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityRecord {
    pub timestamp: DateTime<Utc>,
    pub has_usage: bool,
    pub is_sidechain: bool,
}

/// Parse one log line. Returns None for anything without a parseable
/// timestamp; malformed input is skipped, never an error.
pub fn parse_activity_line(raw: &str) -> Option<ActivityRecord> {
    let json = serde_json::from_str::<Value>(raw).ok()?;
    let timestamp = json.get("timestamp").and_then(parse_timestamp_value)?;

    // Billable records carry both token counts under message.usage.
    let has_usage = json
        .pointer("/message/usage")
        .map(|usage| {
            usage.get("input_tokens").is_some_and(Value::is_number)
                && usage.get("output_tokens").is_some_and(Value::is_number)
        })
        .unwrap_or(false);

    let is_sidechain = json
        .get("isSidechain")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Some(ActivityRecord {
        timestamp,
        has_usage,
        is_sidechain,
    })
}

/// Timestamps of the billable main-chain activity in one log file. A file
/// that cannot be opened (deleted mid-scan) yields an empty list.
pub fn extract_timestamps(path: &Path) -> Vec<DateTime<Utc>> {
    let Ok(file) = fs::File::open(path) else {
        debug!(path = ?path, "log file vanished before read");
        return Vec::new();
    };

    let reader = BufReader::new(file);
    let mut timestamps = Vec::new();
    for line in reader.lines() {
        let Ok(line) = line else {
            continue;
        };
        // Cheap prefilter; billable records always name input_tokens.
        if !line.contains("\"input_tokens\"") {
            continue;
        }
        if let Some(record) = parse_activity_line(&line) {
            if record.has_usage && !record.is_sidechain {
                timestamps.push(record.timestamp);
            }
        }
    }
    timestamps
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_billable_line() {
        let raw = r#"{"timestamp":"2025-06-15T16:30:00Z","isSidechain":false,"message":{"role":"assistant","usage":{"input_tokens":1200,"output_tokens":45}}}"#;
        let record = parse_activity_line(raw).expect("record");
        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2025, 6, 15, 16, 30, 0).unwrap()
        );
        assert!(record.has_usage);
        assert!(!record.is_sidechain);
    }

    #[test]
    fn missing_output_tokens_is_not_usage() {
        let raw = r#"{"timestamp":"2025-06-15T16:30:00Z","message":{"usage":{"input_tokens":1200}}}"#;
        let record = parse_activity_line(raw).expect("record");
        assert!(!record.has_usage);
    }

    #[test]
    fn non_numeric_tokens_are_not_usage() {
        let raw = r#"{"timestamp":"2025-06-15T16:30:00Z","message":{"usage":{"input_tokens":"1200","output_tokens":45}}}"#;
        let record = parse_activity_line(raw).expect("record");
        assert!(!record.has_usage);
    }

    #[test]
    fn flags_sidechain_records() {
        let raw = r#"{"timestamp":"2025-06-15T16:30:00Z","isSidechain":true,"message":{"usage":{"input_tokens":10,"output_tokens":5}}}"#;
        let record = parse_activity_line(raw).expect("record");
        assert!(record.is_sidechain);
    }

    #[test]
    fn rejects_garbage_and_missing_timestamp() {
        assert!(parse_activity_line("not json at all").is_none());
        assert!(parse_activity_line(r#"{"message":{"usage":{}}}"#).is_none());
        assert!(parse_activity_line(r#"{"timestamp":"tuesday"}"#).is_none());
    }

    #[test]
    fn numeric_timestamps_are_accepted() {
        let raw = r#"{"timestamp":1750000200000,"message":{"usage":{"input_tokens":1,"output_tokens":1}}}"#;
        let record = parse_activity_line(raw).expect("record");
        assert_eq!(record.timestamp.timestamp_millis(), 1_750_000_200_000);
    }

    #[test]
    fn extracts_only_billable_main_chain_lines() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("session.jsonl");
        let lines = [
            // kept
            r#"{"timestamp":"2025-06-15T10:00:00Z","message":{"usage":{"input_tokens":10,"output_tokens":2}}}"#,
            // sidechain, skipped
            r#"{"timestamp":"2025-06-15T10:05:00Z","isSidechain":true,"message":{"usage":{"input_tokens":10,"output_tokens":2}}}"#,
            // no usage, skipped
            r#"{"timestamp":"2025-06-15T10:10:00Z","message":{"role":"user"}}"#,
            // malformed, skipped
            r#"{"timestamp": broken "input_tokens""#,
            // kept
            r#"{"timestamp":"2025-06-15T10:15:00Z","message":{"usage":{"input_tokens":7,"output_tokens":3}}}"#,
        ];
        fs::write(&path, lines.join("\n")).expect("write");

        let timestamps = extract_timestamps(&path);
        assert_eq!(
            timestamps,
            vec![
                Utc.with_ymd_and_hms(2025, 6, 15, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 6, 15, 10, 15, 0).unwrap(),
            ]
        );
    }

    #[test]
    fn unreadable_file_yields_empty() {
        let dir = tempdir().expect("tempdir");
        let timestamps = extract_timestamps(&dir.path().join("gone.jsonl"));
        assert!(timestamps.is_empty());
    }
}
