// plotwatch-api: wire format and HTTP status client for plot worker hosts.

pub mod client;
pub mod error;
pub mod report;

pub use client::{StatusClient, REQUEST_TIMEOUT};
pub use error::ApiError;
pub use report::{HostReport, PlotJob, PlotState, PHASE_COUNT};
