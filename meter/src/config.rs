use anyhow::{Context, Result};
use chrono::Duration;
use chrono_tz::Tz;
use std::env;
use std::path::{Path, PathBuf};

// ── Default locations (relative to home) ────────────────────────────────

const DEFAULT_CLAUDE_PROJECTS_REL: &str = ".claude/projects";
const DEFAULT_CACHE_FILE_REL: &str = ".cache/cc-timeleft/usage-data.json";
const DEFAULT_CREDENTIALS_REL: &str = ".claude/.credentials.json";

// ── Default scan policy ─────────────────────────────────────────────────

const DEFAULT_SESSION_MINUTES: i64 = 300;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_LOOKBACK_HOURS: [i64; 3] = [10, 20, 48];
const DEFAULT_LOG_SUFFIX: &str = "jsonl";

/// Zone in which hour boundaries are computed, regardless of where the
/// tools run.
const DEFAULT_ZONE: Tz = chrono_tz::America::Los_Angeles;

/// Runtime configuration shared by the fuelgauge tools. Every field has a
/// default and a `FUELGAUGE_*` environment override.
#[derive(Clone, Debug)]
pub struct MeterConfig {
    /// Root of the Claude Code per-project session logs.
    pub claude_projects: PathBuf,
    /// Cached usage-API response.
    pub cache_file: PathBuf,
    /// Fallback OAuth credentials file.
    pub credentials_file: PathBuf,
    /// Extension of session log files.
    pub log_suffix: String,
    /// Length of one usage block.
    pub session_duration: Duration,
    pub cache_ttl_secs: u64,
    /// Widening lookback horizons for the block scan, in hours.
    pub lookback_hours: Vec<i64>,
    /// Zone for aligning block starts to hour boundaries.
    pub zone: Tz,
}

impl MeterConfig {
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().context("could not resolve home directory")?;

        Ok(Self {
            claude_projects: env_path(
                "FUELGAUGE_CLAUDE_PROJECTS",
                home.join(DEFAULT_CLAUDE_PROJECTS_REL),
                &home,
            ),
            cache_file: env_path(
                "FUELGAUGE_CACHE_FILE",
                home.join(DEFAULT_CACHE_FILE_REL),
                &home,
            ),
            credentials_file: env_path(
                "FUELGAUGE_CREDENTIALS_FILE",
                home.join(DEFAULT_CREDENTIALS_REL),
                &home,
            ),
            log_suffix: env_string("FUELGAUGE_LOG_SUFFIX", DEFAULT_LOG_SUFFIX),
            session_duration: Duration::minutes(env_i64(
                "FUELGAUGE_SESSION_MINUTES",
                DEFAULT_SESSION_MINUTES,
            )),
            cache_ttl_secs: env_u64("FUELGAUGE_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
            lookback_hours: env_hours("FUELGAUGE_LOOKBACK_HOURS", &DEFAULT_LOOKBACK_HOURS),
            zone: env_zone("FUELGAUGE_ZONE", DEFAULT_ZONE),
        })
    }
}

fn env_path(key: &str, default: PathBuf, home: &Path) -> PathBuf {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => expand_tilde(val.trim(), home),
        _ => default,
    }
}

fn env_string(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
        _ => default.to_string(),
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    match env::var(key) {
        Ok(val) => val.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(val) => val.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Comma-separated hour list, e.g. `10,20,48`. Non-positive entries are
/// dropped; an unparseable value falls back to the default.
fn env_hours(key: &str, default: &[i64]) -> Vec<i64> {
    match env::var(key) {
        Ok(val) => {
            let parsed: Vec<i64> = val
                .split(',')
                .filter_map(|part| part.trim().parse::<i64>().ok())
                .filter(|hours| *hours > 0)
                .collect();
            if parsed.is_empty() {
                default.to_vec()
            } else {
                parsed
            }
        }
        Err(_) => default.to_vec(),
    }
}

fn env_zone(key: &str, default: Tz) -> Tz {
    match env::var(key) {
        Ok(val) => val.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

fn expand_tilde(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        return home.join(rest);
    }
    PathBuf::from(raw)
}
