//! S3-compatible storage client
//!
//! Wraps the AWS SDK for S3-compatible storage access.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{http::HttpResponse, Credentials, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::ByteStream,
    Client,
};
use tokio::io::AsyncWriteExt;

use crate::config::S3Config;
use crate::error::{Result, StorageError};

use super::types::{Doc, File, FileInfo};
use super::{ByteSink, ReadContext, StorageIo};

/// S3-compatible storage client
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3 client from configuration
    pub async fn new(config: &S3Config) -> Result<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "pdf2web",
        );

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| config.provider.default_region().to_string());
        tracing::info!(provider = ?config.provider, region = %region, "Configuring S3 client");

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO and other S3-compatible services
            .build();

        let client = Client::from_conf(s3_config);

        // Test connection by checking if bucket exists
        let bucket = config.bucket.clone();
        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    DisplayErrorContext(&e)
                );
            }
        }

        Ok(Self { client, bucket })
    }

    /// Get object metadata (HEAD request)
    pub async fn head_object(&self, key: &str) -> Result<FileInfo> {
        let response = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify_sdk_error(key, e))?;

        Ok(FileInfo {
            key: key.to_string(),
            size: object_size(key, response.content_length())?,
        })
    }

    /// Get object as a byte stream
    pub async fn get_object_stream(&self, key: &str) -> Result<ByteStream> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify_sdk_error(key, e))?;

        Ok(response.body)
    }

    /// Check whether any object lives under `prefix`
    pub async fn prefix_exists(&self, prefix: &str) -> Result<bool> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(1)
            .send()
            .await
            .map_err(|e| classify_sdk_error(prefix, e))?;

        Ok(!response.contents().is_empty())
    }

    /// Copy an object's bytes into `sink` chunk by chunk
    async fn copy_object(&self, key: &str, sink: &mut ByteSink) -> Result<u64> {
        let mut stream = self.get_object_stream(key).await?;
        let mut copied = 0u64;

        while let Some(chunk) = stream
            .try_next()
            .await
            .map_err(|e| StorageError::Sdk(format!("Failed to read object body {}: {}", key, e)))?
        {
            sink.write_all(&chunk).await?;
            copied += chunk.len() as u64;
        }

        sink.flush().await?;
        Ok(copied)
    }
}

#[async_trait]
impl StorageIo for S3Storage {
    async fn file_info(&self, file: &File) -> Result<FileInfo> {
        self.head_object(&file.storage_key()?).await
    }

    async fn read_file(&self, file: &File, sink: &mut ByteSink) -> Result<u64> {
        self.copy_object(&file.storage_key()?, sink).await
    }

    async fn read_context_for(&self, doc: &Doc) -> Result<Box<dyn ReadContext>> {
        let prefix = format!("{}/", doc.storage_prefix()?);
        if !self.prefix_exists(&prefix).await? {
            return Err(StorageError::ItemNotExists(prefix));
        }

        Ok(Box::new(S3ReadContext {
            storage: self.clone(),
            doc: doc.clone(),
            closed: false,
        }))
    }
}

/// Read context over the objects of one document
struct S3ReadContext {
    storage: S3Storage,
    doc: Doc,
    closed: bool,
}

#[async_trait]
impl ReadContext for S3ReadContext {
    async fn read_doc_data(&mut self, key: &str, sink: &mut ByteSink) -> Result<u64> {
        if self.closed {
            return Err(StorageError::ContextClosed(self.doc.id().to_string()));
        }
        let key = self.doc.asset_key(key)?;
        self.storage.copy_object(&key, sink).await
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Map an SDK failure on `key` to a storage error
fn classify_sdk_error<E>(key: &str, err: SdkError<E, HttpResponse>) -> StorageError
where
    E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
{
    if let SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) = &err {
        return StorageError::ConnectionFailed(format!("{}: {}", key, DisplayErrorContext(&err)));
    }

    let status = err.raw_response().map(|r| r.status().as_u16());
    match (status, err.code()) {
        // A missing bucket is a deployment fault, not a missing item
        (_, Some("NoSuchBucket")) => {
            StorageError::Sdk(format!("{}: {}", key, DisplayErrorContext(&err)))
        }
        (Some(404), _) | (_, Some("NoSuchKey" | "NotFound")) => {
            StorageError::ItemNotExists(key.to_string())
        }
        (Some(403), _) | (_, Some("AccessDenied")) => StorageError::ReadDenied(key.to_string()),
        _ => StorageError::Sdk(format!("{}: {}", key, DisplayErrorContext(&err))),
    }
}

/// Object size from a HEAD response; S3 always reports it for existing objects
fn object_size(key: &str, content_length: Option<i64>) -> Result<u64> {
    content_length
        .and_then(|len| u64::try_from(len).ok())
        .ok_or_else(|| StorageError::Sdk(format!("Missing content length for object {}", key)))
}
