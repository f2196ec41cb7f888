use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Coerce a JSON timestamp field into UTC. Accepts ISO-8601 strings and
/// numeric epoch values in either seconds or milliseconds.
pub fn parse_timestamp_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s),
        Value::Number(n) => n.as_i64().and_then(parse_timestamp_i64),
        _ => None,
    }
}

pub fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(num) = raw.parse::<i64>() {
        return parse_timestamp_i64(num);
    }
    None
}

pub fn parse_timestamp_i64(num: i64) -> Option<DateTime<Utc>> {
    if num <= 0 {
        return None;
    }
    // Heuristic: treat values over ~year 2286 seconds as milliseconds.
    if num > 10_000_000_000 {
        let secs = num / 1000;
        let nsec = ((num % 1000) * 1_000_000) as u32;
        return Utc.timestamp_opt(secs, nsec).single();
    }
    Utc.timestamp_opt(num, 0).single()
}
