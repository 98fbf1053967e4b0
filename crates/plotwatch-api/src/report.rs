// Wire types for the worker status payload.
//
// A worker answers `GET http://<host>/` with a CBOR-encoded `HostReport`.
// The encoding is self-describing, so these structs double as the domain
// model -- there is no separate conversion layer.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Number of phase boundaries a job reports: start, four phase
/// completions. Four phases, five timestamps.
pub const PHASE_COUNT: usize = 5;

/// Lifecycle state of a plot job, as reported by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlotState {
    Running,
    Errored,
    Finished,
    Killed,
}

impl PlotState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Errored => "Errored",
            Self::Finished => "Finished",
            Self::Killed => "Killed",
        }
    }

    /// Errored and Killed both count as failures in directory stats.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Errored | Self::Killed)
    }
}

/// One multi-phase batch job tracked by the worker.
///
/// `id` is globally unique and stable for the job's lifetime; it is the
/// row key everywhere downstream. `phase_times[0]` is the start,
/// `phase_times[4]` the completion; `None` means the boundary has not
/// been reached yet. Present entries are non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotJob {
    pub id: String,
    pub state: PlotState,
    /// Current phase, 0..=4.
    #[serde(default)]
    pub phase: u8,
    /// Progress through the current phase, 0..=100.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub phase_times: [Option<DateTime<Utc>>; PHASE_COUNT],
    #[serde(default)]
    pub source_dir: String,
    #[serde(default)]
    pub dest_dir: String,
    /// Trailing log lines, oldest first. Lines keep their newlines.
    #[serde(default)]
    pub log_tail: Vec<String>,
}

impl PlotJob {
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.phase_times[0]
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.phase_times[PHASE_COUNT - 1]
    }

    /// Duration of phase `n` (1-based, 1..=4): the delta between
    /// consecutive phase boundaries. `None` until both are reported.
    pub fn phase_duration(&self, n: usize) -> Option<Duration> {
        if n == 0 || n >= PHASE_COUNT {
            return None;
        }
        match (self.phase_times[n], self.phase_times[n - 1]) {
            (Some(end), Some(start)) => Some(end - start),
            _ => None,
        }
    }

    /// Start-to-completion duration. `None` until the job finished.
    pub fn total_duration(&self) -> Option<Duration> {
        match (self.end_time(), self.start_time()) {
            (Some(end), Some(start)) => Some(end - start),
            _ => None,
        }
    }
}

/// A worker's self-reported state: everything the dashboard knows about
/// one host.
///
/// `status` is empty while the host is healthy; after a failed poll the
/// store overwrites it with the error text and leaves the rest of the
/// record untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub active: Vec<PlotJob>,
    #[serde(default)]
    pub archived: Vec<PlotJob>,
    /// Source (scratch) directories: path -> available bytes.
    #[serde(default)]
    pub source_dirs: HashMap<String, u64>,
    /// Destination directories: path -> available bytes.
    #[serde(default)]
    pub dest_dirs: HashMap<String, u64>,
}
