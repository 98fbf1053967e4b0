//! Row describers: how each entity renders into its table.
//!
//! One definition point per table -- headers, alignment, and the
//! field-to-string mapping live together here.

use chrono::{DateTime, Utc};

use plotwatch_core::{Column, DestDirStats, PlotJob, SourceDirStats, TableRow};

use crate::widgets::fmt;

// ── Active plots ────────────────────────────────────────────────────

pub struct ActivePlotRow {
    host: String,
    job: PlotJob,
    now: DateTime<Utc>,
}

impl ActivePlotRow {
    pub fn new(host: &str, job: &PlotJob, now: DateTime<Utc>) -> Self {
        Self { host: host.to_owned(), job: job.clone(), now }
    }
}

impl TableRow for ActivePlotRow {
    fn columns() -> &'static [Column] {
        const COLUMNS: [Column; 9] = [
            Column::left("Host"),
            Column::left("Plot ID"),
            Column::left("Status"),
            Column::right("Phase"),
            Column::right("Progress"),
            Column::left("Start Time"),
            Column::right("Duration"),
            Column::left("Source Dir"),
            Column::left("Dest Dir"),
        ];
        &COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        let elapsed = self
            .job
            .start_time()
            .map_or_else(String::new, |start| fmt::fmt_duration(self.now - start));
        vec![
            self.host.clone(),
            fmt::shorten_id(&self.job.id),
            self.job.state.label().to_owned(),
            format!("{}/4", self.job.phase),
            format!("{}%", self.job.progress),
            fmt::fmt_time(self.job.start_time()),
            elapsed,
            self.job.source_dir.clone(),
            self.job.dest_dir.clone(),
        ]
    }
}

// ── Archived plots ──────────────────────────────────────────────────

pub struct ArchivedPlotRow {
    host: String,
    job: PlotJob,
}

impl ArchivedPlotRow {
    pub fn new(host: &str, job: &PlotJob) -> Self {
        Self { host: host.to_owned(), job: job.clone() }
    }
}

impl TableRow for ArchivedPlotRow {
    fn columns() -> &'static [Column] {
        const COLUMNS: [Column; 9] = [
            Column::left("Host"),
            Column::left("Plot ID"),
            Column::left("Status"),
            Column::right("Phase"),
            Column::left("Start Time"),
            Column::left("End Time"),
            Column::right("Duration"),
            Column::left("Source Dir"),
            Column::left("Dest Dir"),
        ];
        &COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        let duration = self
            .job
            .total_duration()
            .map_or_else(String::new, fmt::fmt_duration);
        vec![
            self.host.clone(),
            fmt::shorten_id(&self.job.id),
            self.job.state.label().to_owned(),
            format!("{}/4", self.job.phase),
            fmt::fmt_time(self.job.start_time()),
            fmt::fmt_time(self.job.end_time()),
            duration,
            self.job.source_dir.clone(),
            self.job.dest_dir.clone(),
        ]
    }
}

// ── Source directories ──────────────────────────────────────────────

pub struct SourceDirRow(pub SourceDirStats);

impl TableRow for SourceDirRow {
    fn columns() -> &'static [Column] {
        const COLUMNS: [Column; 9] = [
            Column::left("Host"),
            Column::left("Directory"),
            Column::right("Free"),
            Column::right("Avg Phase 1"),
            Column::right("Avg Phase 2"),
            Column::right("Avg Phase 3"),
            Column::right("Avg Phase 4"),
            Column::right("OK"),
            Column::right("Failed"),
        ];
        &COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        let stats = &self.0;
        vec![
            stats.host.clone(),
            stats.path.clone(),
            fmt::fmt_capacity(stats.available_bytes),
            fmt::fmt_duration(stats.avg_phases[0]),
            fmt::fmt_duration(stats.avg_phases[1]),
            fmt::fmt_duration(stats.avg_phases[2]),
            fmt::fmt_duration(stats.avg_phases[3]),
            stats.succeeded.to_string(),
            stats.failed.to_string(),
        ]
    }
}

// ── Destination directories ─────────────────────────────────────────

pub struct DestDirRow(pub DestDirStats);

impl TableRow for DestDirRow {
    fn columns() -> &'static [Column] {
        const COLUMNS: [Column; 6] = [
            Column::left("Host"),
            Column::left("Directory"),
            Column::right("Free"),
            Column::right("Avg Plot Time"),
            Column::right("OK"),
            Column::right("Failed"),
        ];
        &COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        let stats = &self.0;
        vec![
            stats.host.clone(),
            stats.path.clone(),
            fmt::fmt_capacity(stats.available_bytes),
            fmt::fmt_duration(stats.avg_total),
            stats.succeeded.to_string(),
            stats.failed.to_string(),
        ]
    }
}

// ── Hosts ───────────────────────────────────────────────────────────

pub struct HostRow {
    pub host: String,
    pub status: String,
}

impl TableRow for HostRow {
    fn columns() -> &'static [Column] {
        const COLUMNS: [Column; 2] = [Column::left("Host"), Column::left("Status")];
        &COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![self.host.clone(), self.status.clone()]
    }
}
