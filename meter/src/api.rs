use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Anthropic OAuth usage endpoint.
pub const USAGE_URL: &str = "https://api.anthropic.com/api/oauth/usage";

/// Beta header value that admits OAuth bearer tokens on the endpoint.
const OAUTH_BETA: &str = "oauth-2025-04-20";

/// The endpoint expects a Claude Code client identity.
const CLIENT_USER_AGENT: &str = "claude-code/2.0.25";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One rate window from the usage API. `resets_at` is null for windows
/// without a scheduled reset, such as an untouched Opus allowance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateWindow {
    #[serde(default)]
    pub utilization: f64,
    #[serde(default)]
    pub resets_at: Option<String>,
}

/// Usage-API response body. Unknown fields are tolerated and dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    #[serde(default)]
    pub five_hour: Option<RateWindow>,
    #[serde(default)]
    pub seven_day: Option<RateWindow>,
    #[serde(default)]
    pub seven_day_opus: Option<RateWindow>,
}

/// Fetch the current usage snapshot with an OAuth bearer token.
pub fn fetch_usage(token: &str) -> Result<UsageSnapshot> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("build http client")?;

    let resp = client
        .get(USAGE_URL)
        .bearer_auth(token)
        .header("Content-Type", "application/json")
        .header("User-Agent", CLIENT_USER_AGENT)
        .header("anthropic-beta", OAUTH_BETA)
        .send()
        .context("usage request failed")?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        debug!(status = %status, body = %body, "usage endpoint rejected the request");
        anyhow::bail!("usage request failed: HTTP {status}");
    }

    let snapshot: UsageSnapshot = resp.json().context("parse usage response JSON")?;
    debug!(?snapshot, "fetched usage snapshot");
    Ok(snapshot)
}
