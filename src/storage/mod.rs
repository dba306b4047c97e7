//! Storage module
//!
//! Backends serving stored files and converted document assets.
//! Supports a local directory tree and S3-compatible buckets
//! (MinIO, Cloudflare R2, Backblaze B2, AWS S3).

mod local;
#[cfg(test)]
pub(crate) mod memory;
mod s3_client;
mod types;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::config::StorageConfig;
use crate::error::Result;

pub use local::LocalStorage;
pub use s3_client::S3Storage;
pub use types::*;

/// Destination of bytes copied out of storage
pub type ByteSink = dyn AsyncWrite + Send + Unpin;

/// Read access to stored files and document assets
#[async_trait]
pub trait StorageIo: Send + Sync {
    /// Fetch metadata of a stored file
    async fn file_info(&self, file: &File) -> Result<FileInfo>;

    /// Copy the file's bytes into `sink`, returning the number of bytes copied
    async fn read_file(&self, file: &File, sink: &mut ByteSink) -> Result<u64>;

    /// Open a read context over a document's assets
    async fn read_context_for(&self, doc: &Doc) -> Result<Box<dyn ReadContext>>;
}

/// Scoped access to the assets of one document.
///
/// Callers must `close` the context once they are done with it, whatever
/// the outcome of their reads.
#[async_trait]
pub trait ReadContext: Send {
    /// Copy the asset stored under `key` into `sink`
    async fn read_doc_data(&mut self, key: &str, sink: &mut ByteSink) -> Result<u64>;

    /// Release the context
    async fn close(&mut self) -> Result<()>;
}

/// Create the storage backend described by the configuration
pub async fn from_config(config: &StorageConfig) -> Result<Arc<dyn StorageIo>> {
    match config {
        StorageConfig::Local { root } => {
            tracing::info!("Using local storage at {}", root.display());
            Ok(Arc::new(LocalStorage::new(root.clone())))
        }
        StorageConfig::S3(s3) => {
            tracing::info!("S3 endpoint: {}", s3.endpoint);
            tracing::info!("S3 bucket: {}", s3.bucket);
            Ok(Arc::new(S3Storage::new(s3).await?))
        }
    }
}
