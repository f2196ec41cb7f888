use chrono::{DateTime, Duration, Utc};

// Floors below which the pace ratio is not judged.
const MIN_ELAPSED_PCT: f64 = 10.0;
const MIN_UTILIZATION_PCT: f64 = 15.0;

// Pace ratio cutoffs: quota consumed vs window elapsed.
const WARNING_RATIO: f64 = 1.0;
const DANGER_RATIO: f64 = 1.3;

/// Consumption pace for one usage window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BurnStatus {
    Safe,
    Warning,
    Danger,
}

impl BurnStatus {
    pub fn indicator(self) -> &'static str {
        match self {
            BurnStatus::Safe => "🟢",
            BurnStatus::Warning => "🟡",
            BurnStatus::Danger => "🔴",
        }
    }
}

/// Classify how fast a window's quota is being consumed relative to how
/// much of the window has passed. Early in a window, or at negligible
/// utilization, the ratio is noise and the status stays Safe.
pub fn classify(
    utilization_pct: f64,
    window_start: DateTime<Utc>,
    window_duration: Duration,
    now: DateTime<Utc>,
) -> BurnStatus {
    let total_ms = window_duration.num_milliseconds();
    if total_ms <= 0 {
        return BurnStatus::Safe;
    }
    let elapsed_ms = (now - window_start).num_milliseconds();
    let elapsed_pct = elapsed_ms as f64 / total_ms as f64 * 100.0;

    if elapsed_pct < MIN_ELAPSED_PCT || utilization_pct < MIN_UTILIZATION_PCT {
        return BurnStatus::Safe;
    }

    let pace = utilization_pct / elapsed_pct;
    if pace >= DANGER_RATIO {
        BurnStatus::Danger
    } else if pace >= WARNING_RATIO {
        BurnStatus::Warning
    } else {
        BurnStatus::Safe
    }
}
