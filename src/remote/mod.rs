pub mod todoist;
pub mod toggl;

use reqwest::StatusCode;

/// Error type shared by the remote service clients
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("api token is not configured")]
    MissingToken,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
    },
    #[error("unexpected response: {0}")]
    Unexpected(String),
}
