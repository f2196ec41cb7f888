use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use meter::api::{self, UsageSnapshot};
use meter::burn::classify;
use meter::cache::UsageCache;
use meter::config::MeterConfig;
use meter::credentials;
use meter::format::{clock_label, remaining_compact};
use meter::parse::parse_timestamp_str;
use tracing::debug;

fn main() -> Result<()> {
    let mut debug_enabled = false;
    let mut force_refresh = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--debug" => debug_enabled = true,
            "--force-refresh" => force_refresh = true,
            other => anyhow::bail!("unknown arg: {other} (use --help)"),
        }
    }

    init_tracing(debug_enabled);

    let config = MeterConfig::from_env()?;
    let now = Utc::now();
    let cache = UsageCache::new(config.cache_file.clone(), config.cache_ttl_secs);

    let cached = if force_refresh {
        debug!("force refresh requested, skipping cache");
        None
    } else {
        cache.read(now)
    };

    let snapshot = match cached {
        Some(snapshot) => snapshot,
        None => {
            let token = credentials::oauth_token(&config.credentials_file)
                .context("no OAuth token found (is Claude Code logged in?)")?;
            let snapshot = api::fetch_usage(&token)?;
            if let Err(err) = cache.write(&snapshot, now) {
                debug!(err = %err, "failed to write cache");
            }
            snapshot
        }
    };

    log_summary(&snapshot);

    match status_line(&snapshot, now, config.session_duration, &Local) {
        Some(line) => println!("{line}"),
        None => println!("No active block"),
    }
    Ok(())
}

/// Compose the one-line status: the five-hour window's pace indicator and
/// end time, plus a seven-day token when that window is present.
fn status_line<Z: TimeZone>(
    snapshot: &UsageSnapshot,
    now: DateTime<Utc>,
    session_duration: Duration,
    zone: &Z,
) -> Option<String> {
    let five = snapshot.five_hour.as_ref()?;
    let resets_at = five.resets_at.as_deref().and_then(parse_timestamp_str)?;

    let status = classify(
        five.utilization,
        resets_at - session_duration,
        session_duration,
        now,
    );
    let mut line = format!(
        "{}{}",
        status.indicator(),
        clock_label(&resets_at.with_timezone(zone))
    );

    if let Some(week) = snapshot.seven_day.as_ref()
        && let Some(week_resets) = week.resets_at.as_deref().and_then(parse_timestamp_str)
    {
        let week_status = classify(
            week.utilization,
            week_resets - Duration::days(7),
            Duration::days(7),
            now,
        );
        line.push_str(&format!(
            " {}{}",
            week_status.indicator(),
            remaining_compact(week_resets - now)
        ));
    }

    Some(line)
}

fn log_summary(snapshot: &UsageSnapshot) {
    if let Some(five) = snapshot.five_hour.as_ref() {
        debug!(
            utilization = five.utilization,
            resets_at = five.resets_at.as_deref().unwrap_or("none"),
            "five-hour window"
        );
    }
    if let Some(week) = snapshot.seven_day.as_ref() {
        debug!(
            utilization = week.utilization,
            resets_at = week.resets_at.as_deref().unwrap_or("none"),
            "seven-day window"
        );
    }
    if let Some(opus) = snapshot.seven_day_opus.as_ref() {
        debug!(
            utilization = opus.utilization,
            resets_at = opus.resets_at.as_deref().unwrap_or("none"),
            "seven-day opus window"
        );
    }
}

fn init_tracing(debug_enabled: bool) {
    let filter = if debug_enabled {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_help() {
    println!(
        r#"cc-timeleft

Current Claude Code usage-window status from the usage API, cached for
five minutes and suitable for a shell prompt.

Usage:
  cc-timeleft [--force-refresh] [--debug]

Options:
  --force-refresh  Bypass the cache and fetch fresh data
  --debug          Log cache, credential, and API detail to stderr
  --help, -h       Show this help

Output is one line like `🟢4:30pm 🟡2d4h` (five-hour window end, then
seven-day remaining), or `No active block` when no window is open.
Exits nonzero when credentials are missing or the API is unreachable."#
    );
}
