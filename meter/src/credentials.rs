use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Keychain service under which Claude Code stores its OAuth credentials.
const KEYCHAIN_SERVICE: &str = "Claude Code-credentials";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredentials {
    claude_ai_oauth: Option<OauthCredentials>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OauthCredentials {
    access_token: String,
}

/// The OAuth access token: macOS keychain first, credentials file second.
/// None means the user is not logged in. Only the source is ever logged,
/// never the token itself.
pub fn oauth_token(credentials_file: &Path) -> Option<String> {
    if let Some(token) = keychain_token() {
        debug!("oauth token found in keychain");
        return Some(token);
    }
    if let Some(token) = file_token(credentials_file) {
        debug!(path = ?credentials_file, "oauth token found in credentials file");
        return Some(token);
    }
    debug!("no oauth token in keychain or credentials file");
    None
}

fn keychain_token() -> Option<String> {
    let user = whoami::username();
    let output = Command::new("security")
        .args([
            "find-generic-password",
            "-a",
            user.as_str(),
            "-s",
            KEYCHAIN_SERVICE,
            "-w",
        ])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let raw = String::from_utf8(output.stdout).ok()?;
    parse_credentials(raw.trim())
}

fn file_token(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    parse_credentials(&raw)
}

fn parse_credentials(raw: &str) -> Option<String> {
    let creds = serde_json::from_str::<StoredCredentials>(raw).ok()?;
    let token = creds.claude_ai_oauth?.access_token;
    if token.is_empty() {
        return None;
    }
    Some(token)
}
