use thiserror::Error;

use crate::host::ElementId;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected user input (unsupported upload, invalid form value).
    /// The message is meant to be shown to the user as-is.
    #[error("{0}")]
    InvalidInput(String),

    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
