use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("couldn't parse URL: {0}")]
    InvalidUrl(String),

    #[error("content-type not text/html: {0}")]
    NotDocument(String),

    #[error("failed to get html. got: code: {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
