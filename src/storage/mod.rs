// Submodule for local file system storage
mod local;

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub use local::LocalStorage;

// Storage error types
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String), // Returned when a file cannot be found

    #[error("Io Error: {0}")]
    IoError(#[from] std::io::Error), // Wraps standard I/O errors
}

// Async Storage trait
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `content` to `path`, replacing any existing file.
    async fn write(&self, path: &Path, content: Bytes) -> Result<(), StorageError>;

    /// Whether a file exists at `path`.
    async fn exists(&self, path: &Path) -> bool;

    /// Remove the file at `path`.
    async fn remove(&self, path: &Path) -> Result<(), StorageError>;
}
