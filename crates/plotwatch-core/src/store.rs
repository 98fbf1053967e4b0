// ── Snapshot store ──
//
// One record per configured host: its most recently known-good report
// plus the current health status. Owned by the render loop; the poller
// never touches it directly.

use std::collections::BTreeMap;

use plotwatch_api::{ApiError, HostReport};

/// Per-host snapshot records with the stale-on-error merge policy.
///
/// On a successful poll the host's record is replaced wholesale and its
/// status cleared. On a failed poll only the status text is overwritten;
/// jobs and directory maps keep their last-known-good contents, so a
/// transient network blip never blanks the display. The status column is
/// the sole signal of staleness.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    // BTreeMap keeps host iteration order stable across polls.
    records: BTreeMap<String, HostReport>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one poll result for `host`.
    pub fn apply(&mut self, host: &str, result: Result<HostReport, ApiError>) {
        match result {
            Ok(mut report) => {
                report.status.clear();
                self.records.insert(host.to_owned(), report);
            }
            Err(err) => {
                // First contact may fail: keep an empty record so the
                // host still shows up in the hosts table.
                let record = self.records.entry(host.to_owned()).or_default();
                record.status = err.to_string();
            }
        }
    }

    pub fn get(&self, host: &str) -> Option<&HostReport> {
        self.records.get(host)
    }

    /// All host records, in stable host order.
    pub fn records(&self) -> impl Iterator<Item = (&str, &HostReport)> {
        self.records.iter().map(|(host, report)| (host.as_str(), report))
    }

    pub fn host_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve a job id to its log tail: active jobs first, archived as
    /// the fallback (a job keeps its id when it moves to the archive).
    pub fn log_tail(&self, job_id: &str) -> Option<&[String]> {
        let active = self
            .records
            .values()
            .flat_map(|r| &r.active)
            .find(|job| job.id == job_id);
        let job = active.or_else(|| {
            self.records
                .values()
                .flat_map(|r| &r.archived)
                .find(|job| job.id == job_id)
        })?;
        Some(&job.log_tail)
    }
}
