use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not extract a valid YouTube video ID from {input:?}")]
    InvalidVideoId { input: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid value for {key}: {reason}")]
    Config { key: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
