use chrono::{DateTime, Duration, TimeZone, Timelike};

/// Clock label like `4:30pm` for an already-zoned time.
pub fn clock_label<Z: TimeZone>(ts: &DateTime<Z>) -> String {
    let hour = ts.hour();
    let minute = ts.minute();
    let meridiem = if hour >= 12 { "pm" } else { "am" };
    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{display_hour}:{minute:02}{meridiem}")
}

/// Spaced remaining-time label: `1h 4m`, or `42m` under an hour.
/// Negative durations clamp to `0m`.
pub fn remaining_label(remaining: Duration) -> String {
    let total_minutes = remaining.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Compact remaining-time label for day-scale windows: `2d4h`, `3h20m`,
/// `42m`.
pub fn remaining_compact(remaining: Duration) -> String {
    let total_minutes = remaining.num_minutes().max(0);
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    if days > 0 {
        format!("{days}d{hours}h")
    } else if hours > 0 && minutes > 0 {
        format!("{hours}h{minutes}m")
    } else if hours > 0 {
        format!("{hours}h")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn clock_label_uses_twelve_hour_time() {
        let at = |h, m| Utc.with_ymd_and_hms(2025, 6, 15, h, m, 0).unwrap();
        assert_eq!(clock_label(&at(16, 30)), "4:30pm");
        assert_eq!(clock_label(&at(9, 7)), "9:07am");
        assert_eq!(clock_label(&at(0, 5)), "12:05am");
        assert_eq!(clock_label(&at(12, 0)), "12:00pm");
    }

    #[test]
    fn remaining_label_splits_hours_and_minutes() {
        assert_eq!(remaining_label(Duration::minutes(64)), "1h 4m");
        assert_eq!(remaining_label(Duration::minutes(42)), "42m");
        assert_eq!(remaining_label(Duration::minutes(180)), "3h 0m");
        assert_eq!(remaining_label(Duration::minutes(-10)), "0m");
    }

    #[test]
    fn compact_label_collapses_units() {
        assert_eq!(remaining_compact(Duration::minutes(2 * 24 * 60 + 4 * 60)), "2d4h");
        assert_eq!(remaining_compact(Duration::minutes(200)), "3h20m");
        assert_eq!(remaining_compact(Duration::minutes(300)), "5h");
        assert_eq!(remaining_compact(Duration::minutes(42)), "42m");
        assert_eq!(remaining_compact(Duration::minutes(-1)), "0m");
    }
}
