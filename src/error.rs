use thiserror::Error;

/// Failures the sync engine can hit while keeping the feed current. All of
/// them are recovered locally: a transport error degrades the connection
/// status, a fetch error surfaces a transient indicator, and parse or
/// validation errors drop the offending message.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("socket transport failed: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("malformed message: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("invalid post: {0}")]
    Validation(String),
}
