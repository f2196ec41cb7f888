use notify_rust::Notification;
use std::env;
use std::process::Command;
use tracing::debug;

/// One desktop notification to dispatch.
#[derive(Debug, Clone)]
pub struct NotifyRequest {
    pub title: String,
    pub subtitle: String,
    pub message: String,
    pub sound: String,
    /// Deliver even when the user is watching the originating pane.
    pub force: bool,
}

#[derive(Default)]
pub struct Notifier;

impl Notifier {
    pub fn new() -> Self {
        Self
    }

    /// Dispatch unless the user is already looking at the originating
    /// tmux pane. Failures are logged, never fatal.
    pub fn send(&self, request: &NotifyRequest) {
        if !request.force && in_active_tmux_pane() {
            debug!("suppressing notification for the active tmux pane");
            return;
        }

        let body = if request.subtitle.is_empty() {
            request.message.clone()
        } else {
            format!("{}\n{}", request.subtitle, request.message)
        };
        let result = Notification::new()
            .summary(&request.title)
            .body(&body)
            .sound_name(&request.sound)
            .show();
        match result {
            Ok(_) => debug!(title = %request.title, "notification dispatched"),
            Err(err) => debug!(err = %err, "failed to send notification"),
        }
    }
}

/// True when running inside tmux and both the current pane and its window
/// are active, meaning the output is already on screen.
pub fn in_active_tmux_pane() -> bool {
    if env::var_os("TMUX").is_none() {
        return false;
    }
    let Some(pane) = env::var_os("TMUX_PANE") else {
        return false;
    };
    let output = match Command::new("tmux")
        .arg("display-message")
        .arg("-pt")
        .arg(&pane)
        .arg("#{pane_active} #{window_active}")
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => return false,
    };
    pane_status_is_active(&String::from_utf8_lossy(&output.stdout))
}

/// tmux prints `1 1` when both the pane and its window are active.
pub fn pane_status_is_active(raw: &str) -> bool {
    raw.trim() == "1 1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_pane_requires_both_flags() {
        assert!(pane_status_is_active("1 1"));
        assert!(pane_status_is_active("1 1\n"));
        assert!(!pane_status_is_active("1 0"));
        assert!(!pane_status_is_active("0 1"));
        assert!(!pane_status_is_active("0 0\n"));
        assert!(!pane_status_is_active(""));
    }
}
