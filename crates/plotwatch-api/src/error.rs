use thiserror::Error;

/// Failure modes of a single status fetch.
///
/// Both variants are non-fatal by design: the store records the message
/// as the host's status text and the next poll cycle is the retry.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS, or timeout failure before a payload was decoded.
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The host answered, but the payload was not a valid status report.
    #[error("malformed status payload: {0}")]
    Decode(#[from] serde_cbor::Error),
}

impl ApiError {
    /// Returns `true` if the failure was an end-to-end request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }
}
