use std::io;

/// Errors raised by a [`CountStore`](super::CountStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed count data: {0}")]
    Codec(String),
    #[error("Transaction error: {0}")]
    Transaction(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn codec<S: Into<String>>(msg: S) -> Self {
        StoreError::Codec(msg.into())
    }

    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        StoreError::Transaction(msg.into())
    }

    pub fn backend<S: Into<String>>(msg: S) -> Self {
        StoreError::Backend(msg.into())
    }
}
