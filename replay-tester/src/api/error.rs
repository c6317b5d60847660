use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image not found: {0}")]
    ImageMissing(String),

    #[error("login returned no token (status {status}): {body}")]
    NoToken { status: u16, body: String },

    #[error("{0} returned no records")]
    NoRecords(String),

    #[error("could not extract an id from {0}")]
    NoId(Value),

    #[error("{action} failed (status {status}): {body}")]
    Rejected {
        action: &'static str,
        status: u16,
        body: String,
    },
}
