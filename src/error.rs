#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{operation} failed with status {status}: {detail}")]
    Backend {
        operation: &'static str,
        status: u16,
        detail: String,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid handle: {0:?}")]
    InvalidHandle(String),
    #[error("Invalid wallet address: {0:?}")]
    InvalidAddress(String),
    #[error("Invalid user id: {0:?}")]
    InvalidUserId(String),
}
