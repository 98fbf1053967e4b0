// ── Directory statistics ──
//
// Recomputed from scratch on every pass from the union of all host
// records. Never incremental: carrying sums across cycles is how drift
// bugs happen, and a full recompute over a few hundred archived jobs is
// cheap.

use std::collections::HashMap;

use chrono::Duration;

use plotwatch_api::{PHASE_COUNT, PlotState};

use crate::store::SnapshotStore;

/// Separator for `(host, path)` row keys. A unit separator cannot
/// appear in a filesystem path.
pub const DIR_KEY_SEP: char = '\u{1f}';

/// Row key for a directory table: `host + SEP + path`.
pub fn dir_key(host: &str, path: &str) -> String {
    format!("{host}{DIR_KEY_SEP}{path}")
}

/// Stats for one source (scratch) directory on one host.
///
/// `available_bytes` is `u64::MAX` when the directory is known only
/// from archived-job history and no longer advertised by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDirStats {
    pub host: String,
    pub path: String,
    pub available_bytes: u64,
    /// Average duration of each of the four phases, across finished
    /// jobs that used this directory. Zero until a sample exists.
    pub avg_phases: [Duration; PHASE_COUNT - 1],
    pub succeeded: i32,
    pub failed: i32,
}

impl SourceDirStats {
    fn seeded(host: &str, path: &str, available_bytes: u64) -> Self {
        Self {
            host: host.to_owned(),
            path: path.to_owned(),
            available_bytes,
            avg_phases: [Duration::zero(); PHASE_COUNT - 1],
            succeeded: 0,
            failed: 0,
        }
    }
}

/// Stats for one destination directory on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDirStats {
    pub host: String,
    pub path: String,
    pub available_bytes: u64,
    /// Average start-to-completion duration across finished jobs.
    pub avg_total: Duration,
    pub succeeded: i32,
    pub failed: i32,
}

impl DestDirStats {
    fn seeded(host: &str, path: &str, available_bytes: u64) -> Self {
        Self {
            host: host.to_owned(),
            path: path.to_owned(),
            available_bytes,
            avg_total: Duration::zero(),
            succeeded: 0,
            failed: 0,
        }
    }
}

/// Output of one aggregation pass, keyed by [`dir_key`].
#[derive(Debug, Default)]
pub struct DirectoryRollup {
    pub source: HashMap<String, SourceDirStats>,
    pub dest: HashMap<String, DestDirStats>,
}

/// Derive per-directory statistics from every host's current record.
///
/// Seeds one entry per advertised directory, then folds every archived
/// job into the matching entries: finished jobs contribute duration
/// samples, errored/killed jobs only bump the failure count. Directories
/// that only exist in history get the capacity sentinel.
pub fn aggregate(store: &SnapshotStore) -> DirectoryRollup {
    let mut rollup = DirectoryRollup::default();

    for (host, report) in store.records() {
        for (path, &avail) in &report.source_dirs {
            rollup
                .source
                .insert(dir_key(host, path), SourceDirStats::seeded(host, path, avail));
        }
        for (path, &avail) in &report.dest_dirs {
            rollup
                .dest
                .insert(dir_key(host, path), DestDirStats::seeded(host, path, avail));
        }

        for job in &report.archived {
            let source = rollup
                .source
                .entry(dir_key(host, &job.source_dir))
                .or_insert_with(|| SourceDirStats::seeded(host, &job.source_dir, u64::MAX));
            let dest = rollup
                .dest
                .entry(dir_key(host, &job.dest_dir))
                .or_insert_with(|| DestDirStats::seeded(host, &job.dest_dir, u64::MAX));

            match job.state {
                PlotState::Finished => {
                    for n in 1..PHASE_COUNT {
                        if let Some(delta) = job.phase_duration(n) {
                            source.avg_phases[n - 1] = source.avg_phases[n - 1] + delta;
                        }
                    }
                    source.succeeded += 1;

                    if let Some(total) = job.total_duration() {
                        dest.avg_total = dest.avg_total + total;
                    }
                    dest.succeeded += 1;
                }
                PlotState::Errored | PlotState::Killed => {
                    source.failed += 1;
                    dest.failed += 1;
                }
                PlotState::Running => {}
            }
        }
    }

    // Sums become averages. Zero-sample directories keep zero durations
    // rather than a misleading average.
    for stats in rollup.source.values_mut() {
        if stats.succeeded > 0 {
            for avg in &mut stats.avg_phases {
                *avg = *avg / stats.succeeded;
            }
        }
    }
    for stats in rollup.dest.values_mut() {
        if stats.succeeded > 0 {
            stats.avg_total = stats.avg_total / stats.succeeded;
        }
    }

    rollup
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use plotwatch_api::{HostReport, PlotJob};
    use pretty_assertions::assert_eq;

    fn ts(secs: i64) -> Option<DateTime<Utc>> {
        Some(Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn archived_job(id: &str, state: PlotState, times: [i64; 5]) -> PlotJob {
        PlotJob {
            id: id.into(),
            state,
            phase: 4,
            progress: 100,
            phase_times: [ts(times[0]), ts(times[1]), ts(times[2]), ts(times[3]), ts(times[4])],
            source_dir: "/mnt/scratch".into(),
            dest_dir: "/mnt/farm".into(),
            log_tail: Vec::new(),
        }
    }

    fn store_with(archived: Vec<PlotJob>, advertise_dirs: bool) -> SnapshotStore {
        let mut store = SnapshotStore::new();
        let report = HostReport {
            status: String::new(),
            active: Vec::new(),
            archived,
            source_dirs: if advertise_dirs {
                [("/mnt/scratch".to_string(), 500)].into()
            } else {
                HashMap::new()
            },
            dest_dirs: if advertise_dirs {
                [("/mnt/farm".to_string(), 900)].into()
            } else {
                HashMap::new()
            },
        };
        store.apply("h1:8484", Ok(report));
        store
    }

    #[test]
    fn per_phase_averages_from_one_finished_job() {
        let store = store_with(
            vec![archived_job("a", PlotState::Finished, [0, 60, 180, 360, 600])],
            true,
        );
        let rollup = aggregate(&store);

        let source = &rollup.source[&dir_key("h1:8484", "/mnt/scratch")];
        assert_eq!(source.available_bytes, 500);
        assert_eq!(source.succeeded, 1);
        assert_eq!(source.failed, 0);
        assert_eq!(
            source.avg_phases,
            [
                Duration::seconds(60),
                Duration::seconds(120),
                Duration::seconds(180),
                Duration::seconds(240),
            ]
        );

        let dest = &rollup.dest[&dir_key("h1:8484", "/mnt/farm")];
        assert_eq!(dest.available_bytes, 900);
        assert_eq!(dest.avg_total, Duration::seconds(600));
        assert_eq!(dest.succeeded, 1);
    }

    #[test]
    fn averages_divide_across_samples() {
        let store = store_with(
            vec![
                archived_job("a", PlotState::Finished, [0, 100, 200, 300, 400]),
                archived_job("b", PlotState::Finished, [0, 300, 600, 900, 1200]),
            ],
            true,
        );
        let rollup = aggregate(&store);

        let source = &rollup.source[&dir_key("h1:8484", "/mnt/scratch")];
        assert_eq!(source.succeeded, 2);
        assert_eq!(source.avg_phases[0], Duration::seconds(200));

        let dest = &rollup.dest[&dir_key("h1:8484", "/mnt/farm")];
        assert_eq!(dest.avg_total, Duration::seconds(800));
    }

    #[test]
    fn failures_only_count_never_contribute_durations() {
        let store = store_with(
            vec![
                archived_job("a", PlotState::Errored, [0, 50, 0, 0, 0]),
                archived_job("b", PlotState::Killed, [0, 0, 0, 0, 0]),
            ],
            true,
        );
        let rollup = aggregate(&store);

        let source = &rollup.source[&dir_key("h1:8484", "/mnt/scratch")];
        assert_eq!(source.succeeded, 0);
        assert_eq!(source.failed, 2);
        // Zero samples: durations stay zero, no division happened.
        assert_eq!(source.avg_phases, [Duration::zero(); 4]);

        let dest = &rollup.dest[&dir_key("h1:8484", "/mnt/farm")];
        assert_eq!(dest.failed, 2);
        assert_eq!(dest.avg_total, Duration::zero());
    }

    #[test]
    fn orphaned_directory_gets_capacity_sentinel() {
        // Directory appears only in archived history, not advertised.
        let store = store_with(
            vec![archived_job("a", PlotState::Finished, [0, 10, 20, 30, 40])],
            false,
        );
        let rollup = aggregate(&store);

        let source = &rollup.source[&dir_key("h1:8484", "/mnt/scratch")];
        assert_eq!(source.available_bytes, u64::MAX);
        assert_eq!(source.succeeded, 1);

        let dest = &rollup.dest[&dir_key("h1:8484", "/mnt/farm")];
        assert_eq!(dest.available_bytes, u64::MAX);
        assert_eq!(dest.succeeded, 1);
    }

    #[test]
    fn recompute_is_idempotent() {
        let store = store_with(
            vec![archived_job("a", PlotState::Finished, [0, 60, 120, 180, 240])],
            true,
        );
        let first = aggregate(&store);
        let second = aggregate(&store);

        assert_eq!(first.source, second.source);
        assert_eq!(first.dest, second.dest);
    }
}
