use anyhow::{Context, Result};
use meter::notifier::{Notifier, NotifyRequest, in_active_tmux_pane};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Hook event payload piped in on stdin by Claude Code.
#[derive(Debug, Default, Deserialize)]
struct HookEvent {
    #[serde(default)]
    hook_event_name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default)]
struct Options {
    title: Option<String>,
    subtitle: Option<String>,
    message: Option<String>,
    sound: Option<String>,
    force: bool,
    debug: bool,
    help: bool,
}

fn main() -> Result<()> {
    let options = parse_args(std::env::args().skip(1))?;
    if options.help {
        print_help();
        return Ok(());
    }
    init_tracing(options.debug);

    // Hooks pipe the event JSON on stdin; anything unparseable drops
    // through to flag mode.
    let mut raw = String::new();
    let _ = std::io::stdin().read_to_string(&mut raw);
    let event = parse_event(&raw);

    let cwd = std::env::current_dir().unwrap_or_default();
    let dir = DirInfo::from_path(&cwd);

    debug!(active_pane = in_active_tmux_pane(), event = ?event, "dispatch state");

    let request = match event {
        Some(event) => event_request(&event, &dir),
        None => flag_request(&options, &dir),
    };
    Notifier::new().send(&request);
    Ok(())
}

/// The working directory rendered two ways: its basename and its last
/// two path segments.
#[derive(Debug, Clone)]
struct DirInfo {
    current: String,
    last_two: String,
}

impl DirInfo {
    fn from_path(path: &Path) -> Self {
        let parts: Vec<&str> = path
            .iter()
            .filter_map(|part| part.to_str())
            .filter(|part| *part != "/")
            .collect();
        let current = parts.last().copied().unwrap_or_default().to_string();
        let last_two: Vec<&str> = parts.iter().rev().take(2).rev().copied().collect();
        Self {
            current,
            last_two: last_two.join("/"),
        }
    }
}

fn parse_event(raw: &str) -> Option<HookEvent> {
    if raw.trim().is_empty() {
        return None;
    }
    let event = serde_json::from_str::<HookEvent>(raw).ok()?;
    event.hook_event_name.as_ref()?;
    Some(event)
}

/// Map a hook event to its notification. Events never force through the
/// active-pane suppression.
fn event_request(event: &HookEvent, dir: &DirInfo) -> NotifyRequest {
    match event.hook_event_name.as_deref().unwrap_or_default() {
        "Notification" => NotifyRequest {
            title: "CC: Input Required".to_string(),
            subtitle: dir.current.clone(),
            message: event
                .message
                .clone()
                .unwrap_or_else(|| "Input required".to_string()),
            sound: "Ping".to_string(),
            force: false,
        },
        "Stop" => NotifyRequest {
            title: "CC: Done".to_string(),
            subtitle: dir.current.clone(),
            message: format!("Task completed: {}", dir.last_two),
            sound: "Glass".to_string(),
            force: false,
        },
        other => NotifyRequest {
            title: "Claude Code".to_string(),
            subtitle: dir.current.clone(),
            message: event
                .message
                .clone()
                .unwrap_or_else(|| format!("Event: {other}")),
            sound: "default".to_string(),
            force: false,
        },
    }
}

/// Build a notification from command-line flags, substituting `{{dir}}`
/// and `{{basename}}` placeholders.
fn flag_request(options: &Options, dir: &DirInfo) -> NotifyRequest {
    let substitute = |raw: &str| {
        raw.replace("{{dir}}", &dir.last_two)
            .replace("{{basename}}", &dir.current)
    };
    NotifyRequest {
        title: options
            .title
            .clone()
            .unwrap_or_else(|| "Claude Code".to_string()),
        subtitle: substitute(options.subtitle.as_deref().unwrap_or(&dir.current)),
        message: substitute(options.message.as_deref().unwrap_or_default()),
        sound: options.sound.clone().unwrap_or_else(|| "default".to_string()),
        force: options.force,
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options> {
    let mut options = Options::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => options.help = true,
            "--debug" => options.debug = true,
            "--force" => options.force = true,
            "--title" => options.title = Some(args.next().context("--title requires TEXT")?),
            "--subtitle" => {
                options.subtitle = Some(args.next().context("--subtitle requires TEXT")?)
            }
            "--message" => options.message = Some(args.next().context("--message requires TEXT")?),
            "--sound" => options.sound = Some(args.next().context("--sound requires NAME")?),
            other => anyhow::bail!("unknown arg: {other} (use --help)"),
        }
    }
    Ok(options)
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
        r#"cc-notify

Desktop notifications for Claude Code hook events, suppressed when the
originating tmux pane is already on screen.

Usage:
  claude hooks pipe an event:   ... | cc-notify
  or drive it with flags:       cc-notify --title T --message M

Options:
  --title TEXT     Notification title (default "Claude Code")
  --subtitle TEXT  Subtitle (default: current directory basename)
  --message TEXT   Body text
  --sound NAME     Sound name (default "default")
  --force          Deliver even when the current tmux pane is active
  --debug          Log dispatch detail to stderr
  --help, -h       Show this help

`{{dir}}` and `{{basename}}` in flag text expand to the last two path
segments and the basename of the working directory.

Recognized events: Notification (input required, Ping sound) and Stop
(task completed, Glass sound); anything else gets the defaults."#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir() -> DirInfo {
        DirInfo {
            current: "proj".to_string(),
            last_two: "code/proj".to_string(),
        }
    }

    #[test]
    fn splits_cwd_into_basename_and_last_two() {
        let info = DirInfo::from_path(Path::new("/home/u/code/proj"));
        assert_eq!(info.current, "proj");
        assert_eq!(info.last_two, "code/proj");

        let shallow = DirInfo::from_path(Path::new("/proj"));
        assert_eq!(shallow.current, "proj");
        assert_eq!(shallow.last_two, "proj");
    }

    #[test]
    fn ignores_event_without_a_name() {
        assert!(parse_event("").is_none());
        assert!(parse_event("   \n").is_none());
        assert!(parse_event("not json").is_none());
        assert!(parse_event(r#"{"message":"hi"}"#).is_none());

        let event = parse_event(r#"{"hook_event_name":"Stop"}"#).expect("event");
        assert_eq!(event.hook_event_name.as_deref(), Some("Stop"));
    }

    #[test]
    fn notification_event_asks_for_input() {
        let event = HookEvent {
            hook_event_name: Some("Notification".to_string()),
            message: Some("Claude needs your permission".to_string()),
        };
        let request = event_request(&event, &dir());
        assert_eq!(request.title, "CC: Input Required");
        assert_eq!(request.subtitle, "proj");
        assert_eq!(request.message, "Claude needs your permission");
        assert_eq!(request.sound, "Ping");
        assert!(!request.force);
    }

    #[test]
    fn stop_event_reports_completion() {
        let event = HookEvent {
            hook_event_name: Some("Stop".to_string()),
            message: None,
        };
        let request = event_request(&event, &dir());
        assert_eq!(request.title, "CC: Done");
        assert_eq!(request.message, "Task completed: code/proj");
        assert_eq!(request.sound, "Glass");
    }

    #[test]
    fn unknown_event_falls_back_to_defaults() {
        let event = HookEvent {
            hook_event_name: Some("PreToolUse".to_string()),
            message: None,
        };
        let request = event_request(&event, &dir());
        assert_eq!(request.title, "Claude Code");
        assert_eq!(request.message, "Event: PreToolUse");
        assert_eq!(request.sound, "default");
    }

    #[test]
    fn flags_substitute_directory_placeholders() {
        let options = Options {
            subtitle: Some("on {{dir}}".to_string()),
            message: Some("{{basename}} finished".to_string()),
            force: true,
            ..Default::default()
        };
        let request = flag_request(&options, &dir());
        assert_eq!(request.title, "Claude Code");
        assert_eq!(request.subtitle, "on code/proj");
        assert_eq!(request.message, "proj finished");
        assert!(request.force);
    }

    #[test]
    fn parses_flag_pairs() {
        let args = ["--title", "T", "--sound", "Glass", "--force"]
            .into_iter()
            .map(String::from);
        let options = parse_args(args).expect("options");
        assert_eq!(options.title.as_deref(), Some("T"));
        assert_eq!(options.sound.as_deref(), Some("Glass"));
        assert!(options.force);
        assert!(!options.debug);
    }

    #[test]
    fn rejects_unknown_and_dangling_flags() {
        assert!(parse_args(["--volume".to_string()].into_iter()).is_err());
        assert!(parse_args(["--title".to_string()].into_iter()).is_err());
    }
}
