// HTTP status client.
//
// One bounded GET per poll per host. The timeout is end-to-end: it
// covers connect, transfer, and is therefore the only deadline the
// poll loop needs to reason about.

use std::time::Duration;

use tracing::debug;

use crate::error::ApiError;
use crate::report::HostReport;

/// End-to-end deadline for a single status fetch.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches status reports from worker hosts.
///
/// Cheaply cloneable; the underlying `reqwest::Client` pools
/// connections across hosts.
#[derive(Debug, Clone)]
pub struct StatusClient {
    http: reqwest::Client,
}

impl StatusClient {
    /// Build a client with the default [`REQUEST_TIMEOUT`].
    pub fn new() -> Result<Self, ApiError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("plotwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Fetch one host's status report.
    ///
    /// No retry here: the next poll cycle is the retry policy.
    pub async fn fetch(&self, host: &str) -> Result<HostReport, ApiError> {
        let url = format!("http://{host}/");
        debug!(%host, "fetching status report");

        let response = self.http.get(&url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        let report = serde_cbor::from_slice(&body)?;
        Ok(report)
    }
}
