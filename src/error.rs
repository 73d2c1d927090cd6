use folio_core::DocumentError;
use thiserror::Error;

/// Errors surfaced by the top-level builder and the demo binary.
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Document construction failed: {0}")]
    Document(#[from] DocumentError),

    #[error("Configuration is invalid: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        FolioError::Config(e.to_string())
    }
}
