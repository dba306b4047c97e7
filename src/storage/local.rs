//! Local filesystem storage
//!
//! Serves the storage layout from a directory tree:
//! `{root}/files/{id}` and `{root}/docs/{id}/{key}`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Result, StorageError};

use super::types::{Doc, File, FileInfo};
use super::{ByteSink, ReadContext, StorageIo};

/// Directory-backed storage
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        key.split('/').fold(self.root.clone(), |path, part| path.join(part))
    }
}

#[async_trait]
impl StorageIo for LocalStorage {
    async fn file_info(&self, file: &File) -> Result<FileInfo> {
        let key = file.storage_key()?;
        let metadata = tokio::fs::metadata(self.path_for(&key))
            .await
            .map_err(|e| StorageError::from_io(&key, e))?;

        if !metadata.is_file() {
            return Err(StorageError::ItemNotExists(key));
        }

        Ok(FileInfo {
            key,
            size: metadata.len(),
        })
    }

    async fn read_file(&self, file: &File, sink: &mut ByteSink) -> Result<u64> {
        let key = file.storage_key()?;
        copy_file(&self.path_for(&key), &key, sink).await
    }

    async fn read_context_for(&self, doc: &Doc) -> Result<Box<dyn ReadContext>> {
        let prefix = doc.storage_prefix()?;
        let dir = self.path_for(&prefix);
        let metadata = tokio::fs::metadata(&dir)
            .await
            .map_err(|e| StorageError::from_io(&prefix, e))?;

        if !metadata.is_dir() {
            return Err(StorageError::ItemNotExists(prefix));
        }

        Ok(Box::new(LocalReadContext {
            storage: self.clone(),
            doc: doc.clone(),
            closed: false,
        }))
    }
}

/// Read context over one document directory
struct LocalReadContext {
    storage: LocalStorage,
    doc: Doc,
    closed: bool,
}

#[async_trait]
impl ReadContext for LocalReadContext {
    async fn read_doc_data(&mut self, key: &str, sink: &mut ByteSink) -> Result<u64> {
        if self.closed {
            return Err(StorageError::ContextClosed(self.doc.id().to_string()));
        }
        let key = self.doc.asset_key(key)?;
        copy_file(&self.storage.path_for(&key), &key, sink).await
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

async fn copy_file(path: &Path, key: &str, sink: &mut ByteSink) -> Result<u64> {
    let mut source = tokio::fs::File::open(path)
        .await
        .map_err(|e| StorageError::from_io(key, e))?;

    let copied = tokio::io::copy(&mut source, sink).await?;
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage_with(entries: &[(&str, &[u8])]) -> (TempDir, LocalStorage) {
        let temp_dir = TempDir::new().unwrap();
        for (key, data) in entries {
            let path = temp_dir.path().join(key);
            tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
            tokio::fs::write(&path, data).await.unwrap();
        }
        let storage = LocalStorage::new(temp_dir.path());
        (temp_dir, storage)
    }

    #[tokio::test]
    async fn test_file_info_and_read() {
        let data = vec![7u8; 1024];
        let (_dir, storage) = storage_with(&[("files/doc-42", &data[..])]).await;
        let file = File::new("doc-42");

        let info = storage.file_info(&file).await.unwrap();
        assert_eq!(info.size, 1024);
        assert_eq!(info.key, "files/doc-42");

        let mut out: Vec<u8> = Vec::new();
        let copied = storage.read_file(&file, &mut out).await.unwrap();
        assert_eq!(copied, 1024);
        assert_eq!(out, data);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (_dir, storage) = storage_with(&[]).await;

        let result = storage.file_info(&File::new("missing-1")).await;
        assert!(matches!(result, Err(StorageError::ItemNotExists(ref key)) if key == "files/missing-1"));
    }

    #[tokio::test]
    async fn test_directory_is_not_a_file() {
        let (dir, storage) = storage_with(&[]).await;
        tokio::fs::create_dir_all(dir.path().join("files/folder"))
            .await
            .unwrap();

        let result = storage.file_info(&File::new("folder")).await;
        assert!(matches!(result, Err(StorageError::ItemNotExists(_))));
    }

    #[tokio::test]
    async fn test_read_context() {
        let (_dir, storage) =
            storage_with(&[("docs/doc-7/bg3.png", &b"\x89PNG page three"[..])]).await;

        let mut reader = storage.read_context_for(&Doc::new("doc-7")).await.unwrap();
        let mut out: Vec<u8> = Vec::new();
        reader.read_doc_data("bg3.png", &mut out).await.unwrap();
        assert_eq!(out, b"\x89PNG page three");

        let missing = reader.read_doc_data("bg4.png", &mut out).await;
        assert!(matches!(missing, Err(StorageError::ItemNotExists(_))));

        reader.close().await.unwrap();
        let closed = reader.read_doc_data("bg3.png", &mut out).await;
        assert!(matches!(closed, Err(StorageError::ContextClosed(_))));
    }

    #[tokio::test]
    async fn test_read_context_for_missing_doc() {
        let (_dir, storage) = storage_with(&[]).await;

        let result = storage.read_context_for(&Doc::new("nope")).await;
        assert!(matches!(result, Err(StorageError::ItemNotExists(_))));
    }

    #[tokio::test]
    async fn test_refuses_traversal() {
        let (_dir, storage) = storage_with(&[("docs/doc-7/bg1.png", &b"png"[..])]).await;

        let result = storage.file_info(&File::new("..")).await;
        assert!(matches!(result, Err(StorageError::ReadDenied(_))));

        let mut reader = storage.read_context_for(&Doc::new("doc-7")).await.unwrap();
        let mut out: Vec<u8> = Vec::new();
        let result = reader.read_doc_data("../../files/secret", &mut out).await;
        assert!(matches!(result, Err(StorageError::ReadDenied(_))));
        assert!(out.is_empty());
    }
}
