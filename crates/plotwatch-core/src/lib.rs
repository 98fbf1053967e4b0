// plotwatch-core: fleet state between plotwatch-api and the TUI.
//
// Owns the snapshot store, the derived directory statistics, the keyed
// table model the UI reconciles rows into, and the background poll loop.

pub mod aggregate;
pub mod poller;
pub mod store;
pub mod table;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::{DestDirStats, DirectoryRollup, SourceDirStats, aggregate, dir_key};
pub use poller::{PollUpdate, spawn_poller};
pub use store::SnapshotStore;
pub use table::{Column, ReconcileOutcome, TableModel, TableRow};

// Re-export the wire/domain types at the crate root for ergonomics.
pub use plotwatch_api::{ApiError, HostReport, PHASE_COUNT, PlotJob, PlotState, StatusClient};
