use crate::api::UsageSnapshot;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope {
    /// Milliseconds since the epoch at write time.
    timestamp: i64,
    data: UsageSnapshot,
}

/// On-disk cache for usage-API responses, shared by concurrent shell
/// prompts. Writers race with last-write-wins; a torn or stale read is a
/// miss, never an error.
pub struct UsageCache {
    path: PathBuf,
    ttl_secs: u64,
}

impl UsageCache {
    pub fn new(path: PathBuf, ttl_secs: u64) -> Self {
        Self { path, ttl_secs }
    }

    /// The cached snapshot, if present and younger than the TTL.
    pub fn read(&self, now: DateTime<Utc>) -> Option<UsageSnapshot> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let envelope = match serde_json::from_str::<CacheEnvelope>(&raw) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!(err = %err, "cache unreadable, refetching");
                return None;
            }
        };

        let age_ms = now.timestamp_millis() - envelope.timestamp;
        if age_ms >= (self.ttl_secs as i64).saturating_mul(1000) {
            debug!(age_secs = age_ms / 1000, "cache expired, fetching fresh data");
            return None;
        }
        debug!(age_secs = age_ms / 1000, "using cached usage data");
        Some(envelope.data)
    }

    /// Persist a fresh snapshot, stamped with `now`.
    pub fn write(&self, snapshot: &UsageSnapshot, now: DateTime<Utc>) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create cache dir {dir:?}"))?;
        }
        let envelope = CacheEnvelope {
            timestamp: now.timestamp_millis(),
            data: snapshot.clone(),
        };
        let body = serde_json::to_string_pretty(&envelope)?;
        fs::write(&self.path, body).with_context(|| format!("write cache {:?}", self.path))?;
        debug!(path = ?self.path, "cache updated");
        Ok(())
    }
}
