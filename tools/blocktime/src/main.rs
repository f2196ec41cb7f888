use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use meter::blocks::{SessionState, find_active_block};
use meter::config::MeterConfig;
use meter::format::{clock_label, remaining_label};
use meter::scan::{scan_log_files, sort_newest_first};
use std::path::PathBuf;
use tracing::debug;

fn main() -> Result<()> {
    let mut debug_enabled = false;
    let mut projects_override: Option<PathBuf> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--debug" => debug_enabled = true,
            "--projects" => {
                let val = args.next().context("--projects requires PATH")?;
                projects_override = Some(PathBuf::from(val));
            }
            other => anyhow::bail!("unknown arg: {other} (use --help)"),
        }
    }

    init_tracing(debug_enabled);

    let mut config = MeterConfig::from_env()?;
    if let Some(projects) = projects_override {
        config.claude_projects = projects;
    }

    let mut files = scan_log_files(&config.claude_projects, &config.log_suffix);
    sort_newest_first(&mut files);

    let now = Utc::now();
    let state = find_active_block(
        &files,
        now,
        config.session_duration,
        &config.lookback_hours,
        config.zone,
    );

    match state {
        Some(state) => {
            debug!(
                start = %state.start_time,
                last_activity = %state.last_activity,
                "active block"
            );
            println!("{}", block_line(&state, now, config.session_duration, &Local));
        }
        None => println!("No active block"),
    }
    Ok(())
}

/// `1h 4m (4:30pm)`: time left in the block, then its end on the clock.
fn block_line<Z: TimeZone>(
    state: &SessionState,
    now: DateTime<Utc>,
    session_duration: Duration,
    zone: &Z,
) -> String {
    let end = state.start_time + session_duration;
    format!(
        "{} ({})",
        remaining_label(end - now),
        clock_label(&end.with_timezone(zone))
    )
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
        r#"cc-blocktime

Time left in the current Claude Code session block, reconstructed
entirely from the local session logs under ~/.claude/projects.

Usage:
  cc-blocktime [--projects PATH] [--debug]

Options:
  --projects PATH  Scan PATH instead of ~/.claude/projects
  --debug          Log scan and tier detail to stderr
  --help, -h       Show this help

Output is one line like `1h 4m (4:30pm)`, or `No active block` when the
most recent activity is more than one session old."#
    );
}
