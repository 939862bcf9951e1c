//! Error types for quotedesk

use thiserror::Error;

use crate::response_error::ResponseErrorBoundary;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Response(#[from] ResponseErrorBoundary),
}

pub type Result<T> = std::result::Result<T, Error>;
