//! Course catalog API error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server rejected a create with HTTP 400, which it reserves for
    /// duplicate records. Carries the server's message when one was attached.
    #[error("{}", .0.as_deref().unwrap_or("record already exists"))]
    Conflict(Option<String>),

    #[error("server returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse response body: {0}")]
    Decode(#[from] serde_json::Error),
}
