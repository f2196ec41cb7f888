use crate::align::align_to_hour;
use crate::extract::extract_timestamps;
use crate::scan::LogFile;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// A fixed-length usage window whose start sits on an hour boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionBlock {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SessionBlock {
    /// Both ends inclusive: a timestamp exactly at `end` still belongs to
    /// this block, and only strictly later activity seeds the next one.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// The block currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Where the lookback scan stands after a tier has been examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Nothing usable yet; the tier to examine next.
    Scanning { tier: usize },
    /// Recent activity with no bounding gap; its run may extend past this
    /// tier's horizon, so the next tier must be examined.
    FoundRecent { tier: usize },
    /// A gap of at least one session bounds the run; stop widening.
    GapFound { tier: usize },
    /// No tiers left, or the newest activity is already too old.
    Exhausted,
}

/// Summary of one tier's timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierScan {
    pub most_recent: Option<DateTime<Utc>>,
    /// Oldest timestamp of the continuous run ending at `most_recent`.
    pub run_start: Option<DateTime<Utc>>,
    pub gap_found: bool,
}

/// Walk a descending timestamp list from the newest entry, extending the
/// continuous run until the first inter-event gap of `session_duration`
/// or more. The run keeps the newer side of that gap.
pub fn scan_tier(timestamps_desc: &[DateTime<Utc>], session_duration: Duration) -> TierScan {
    let Some(&most_recent) = timestamps_desc.first() else {
        return TierScan::default();
    };

    let mut run_start = most_recent;
    let mut gap_found = false;
    for pair in timestamps_desc.windows(2) {
        if pair[0] - pair[1] >= session_duration {
            gap_found = true;
            break;
        }
        run_start = pair[1];
    }

    TierScan {
        most_recent: Some(most_recent),
        run_start: Some(run_start),
        gap_found,
    }
}

/// Drives the stop-or-widen decision across lookback tiers. Pure: the
/// caller performs all file reads and feeds each tier's summary in.
#[derive(Debug)]
pub struct LookbackScan {
    now: DateTime<Utc>,
    session_duration: Duration,
    tier_count: usize,
    most_recent: Option<DateTime<Utc>>,
    state: ScanState,
}

impl LookbackScan {
    pub fn new(now: DateTime<Utc>, session_duration: Duration, tier_count: usize) -> Self {
        let state = if tier_count == 0 {
            ScanState::Exhausted
        } else {
            ScanState::Scanning { tier: 0 }
        };
        Self {
            now,
            session_duration,
            tier_count,
            most_recent: None,
            state,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// The tier to gather next, while the scan is still running.
    pub fn pending_tier(&self) -> Option<usize> {
        match self.state {
            ScanState::Scanning { tier } | ScanState::FoundRecent { tier } => Some(tier),
            ScanState::GapFound { .. } | ScanState::Exhausted => None,
        }
    }

    /// True when the newest activity seen is more than one session old,
    /// which rules out any block containing `now`.
    pub fn expired(&self) -> bool {
        self.most_recent
            .map(|ts| self.now - ts > self.session_duration)
            .unwrap_or(false)
    }

    /// Advance by one tier's summary.
    pub fn advance(&mut self, scan: TierScan) -> ScanState {
        let Some(tier) = self.pending_tier() else {
            return self.state;
        };

        // The newest timestamp is recorded once, on the first tier that
        // yields anything; widening only adds older entries.
        if self.most_recent.is_none() {
            if let Some(most_recent) = scan.most_recent {
                self.most_recent = Some(most_recent);
                if self.now - most_recent > self.session_duration {
                    self.state = ScanState::Exhausted;
                    return self.state;
                }
            }
        }

        let last_tier = tier + 1 >= self.tier_count;
        self.state = match (scan.most_recent.is_some(), scan.gap_found) {
            (true, true) => ScanState::GapFound { tier },
            (true, false) if last_tier => ScanState::Exhausted,
            (true, false) => ScanState::FoundRecent { tier: tier + 1 },
            (false, _) if last_tier => ScanState::Exhausted,
            (false, _) => ScanState::Scanning { tier: tier + 1 },
        };
        self.state
    }
}

/// Chain fixed-length blocks forward through an ascending run. Each block
/// starts at the aligned hour floor of the first timestamp past the
/// previous block's end; timestamps inside an open block never move its
/// boundaries.
pub fn chain_blocks(
    run_asc: &[DateTime<Utc>],
    session_duration: Duration,
    zone: Tz,
) -> Vec<SessionBlock> {
    let mut blocks: Vec<SessionBlock> = Vec::new();
    for &ts in run_asc {
        if blocks.last().map(|block| ts <= block.end).unwrap_or(false) {
            continue;
        }
        let start = align_to_hour(ts, zone);
        blocks.push(SessionBlock {
            start,
            end: start + session_duration,
        });
    }
    blocks
}

/// Reconstruct the block containing `now` from a corpus of log files
/// sorted newest-first by modification time. None means no block is in
/// progress.
pub fn find_active_block(
    files: &[LogFile],
    now: DateTime<Utc>,
    session_duration: Duration,
    lookback_hours: &[i64],
    zone: Tz,
) -> Option<SessionState> {
    let mut machine = LookbackScan::new(now, session_duration, lookback_hours.len());
    let mut extracted: HashMap<PathBuf, Vec<DateTime<Utc>>> = HashMap::new();
    let mut final_timestamps: Vec<DateTime<Utc>> = Vec::new();
    let mut final_scan = TierScan::default();

    while let Some(tier) = machine.pending_tier() {
        let cutoff = now - Duration::hours(lookback_hours[tier]);
        let mut timestamps = gather_tier(files, cutoff, &mut extracted);
        timestamps.sort_unstable_by(|a, b| b.cmp(a));

        let scan = scan_tier(&timestamps, session_duration);
        debug!(
            tier,
            hours = lookback_hours[tier],
            count = timestamps.len(),
            gap_found = scan.gap_found,
            "scanned lookback tier"
        );
        if scan.most_recent.is_some() {
            final_timestamps = timestamps;
            final_scan = scan;
        }
        machine.advance(scan);
    }

    if machine.expired() {
        debug!("newest activity is more than one session old");
        return None;
    }
    let run_start = final_scan.run_start?;

    let mut run_asc: Vec<DateTime<Utc>> = final_timestamps
        .into_iter()
        .filter(|ts| *ts >= run_start)
        .collect();
    run_asc.reverse();

    let blocks = chain_blocks(&run_asc, session_duration, zone);
    let active = blocks
        .iter()
        .find(|block| block.contains(now) && run_asc.iter().any(|ts| block.contains(*ts)))?;

    let last_activity = run_asc
        .iter()
        .rev()
        .find(|ts| active.contains(**ts))
        .copied()?;

    Some(SessionState {
        start_time: active.start,
        last_activity,
    })
}

/// Timestamps from files modified at or after `cutoff`. Files arrive
/// newest-first, so the walk stops at the first stale one. Extractions
/// are memoized; widening a tier never re-reads a file.
fn gather_tier(
    files: &[LogFile],
    cutoff: DateTime<Utc>,
    extracted: &mut HashMap<PathBuf, Vec<DateTime<Utc>>>,
) -> Vec<DateTime<Utc>> {
    let mut timestamps = Vec::new();
    for file in files {
        if file.modified < cutoff {
            break;
        }
        let entry = extracted
            .entry(file.path.clone())
            .or_insert_with(|| extract_timestamps(&file.path));
        timestamps.extend(entry.iter().copied());
    }
    timestamps
}
