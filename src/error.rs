//! Error types for the pdf2web server

use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;

/// Failure category reported to HTTP clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Requested content is absent from storage
    NotFound,
    /// Content exists but cannot be read
    Forbidden,
    /// Anything else, including I/O failures mid-stream
    Internal,
}

impl ErrorKind {
    /// Status code and plaintext body sent to the client for this kind
    pub fn response_parts(self) -> (StatusCode, &'static str) {
        match self {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "404: Not Found"),
            ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "403: Forbidden"),
            ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "500: Server error"),
        }
    }
}

impl IntoResponse for ErrorKind {
    fn into_response(self) -> Response {
        self.response_parts().into_response()
    }
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage item not found: {0}")]
    ItemNotExists(String),

    #[error("Storage read denied: {0}")]
    ReadDenied(String),

    #[error("Storage connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Read context already closed for document: {0}")]
    ContextClosed(String),

    #[error("S3 SDK error: {0}")]
    Sdk(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Classify the error for the client-facing status table
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::ItemNotExists(_) => ErrorKind::NotFound,
            StorageError::ReadDenied(_) => ErrorKind::Forbidden,
            StorageError::Io(e) => match e.kind() {
                io::ErrorKind::NotFound => ErrorKind::NotFound,
                io::ErrorKind::PermissionDenied => ErrorKind::Forbidden,
                _ => ErrorKind::Internal,
            },
            StorageError::ConnectionFailed(_)
            | StorageError::ContextClosed(_)
            | StorageError::Sdk(_) => ErrorKind::Internal,
        }
    }

    /// Map an I/O error raised while accessing `key`
    pub fn from_io(key: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => StorageError::ItemNotExists(key.to_string()),
            io::ErrorKind::PermissionDenied => StorageError::ReadDenied(key.to_string()),
            _ => StorageError::Io(err),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
