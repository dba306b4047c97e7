//! In-memory storage backend for tests

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, StorageError};

use super::types::{Doc, File, FileInfo};
use super::{ByteSink, ReadContext, StorageIo};

#[derive(Default)]
struct MemoryState {
    objects: HashMap<String, Vec<u8>>,
    denied: HashSet<String>,
    unavailable: HashSet<String>,
    /// Keys whose reads fail after the given number of bytes
    broken: HashMap<String, usize>,
    contexts_opened: usize,
    contexts_closed: usize,
}

/// Storage keeping objects in a map, keyed by their storage keys
#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_file(self, id: &str, data: impl Into<Vec<u8>>) -> Self {
        let key = File::new(id).storage_key().unwrap();
        self.state().objects.insert(key, data.into());
        self
    }

    pub fn with_doc_asset(self, doc: &str, key: &str, data: impl Into<Vec<u8>>) -> Self {
        let key = Doc::new(doc).asset_key(key).unwrap();
        self.state().objects.insert(key, data.into());
        self
    }

    /// Refuse reads of `key`
    pub fn deny(self, key: &str) -> Self {
        self.state().denied.insert(key.to_string());
        self
    }

    /// Fail every access to `key` as if the backend were down
    pub fn unavailable(self, key: &str) -> Self {
        self.state().unavailable.insert(key.to_string());
        self
    }

    /// Fail reads of `key` after `after` bytes have been written
    pub fn break_after(self, key: &str, after: usize) -> Self {
        self.state().broken.insert(key.to_string(), after);
        self
    }

    pub fn contexts_opened(&self) -> usize {
        self.state().contexts_opened
    }

    pub fn contexts_closed(&self) -> usize {
        self.state().contexts_closed
    }

    fn lookup(&self, key: &str) -> Result<(Vec<u8>, Option<usize>)> {
        let state = self.state();
        if state.unavailable.contains(key) {
            return Err(StorageError::ConnectionFailed(key.to_string()));
        }
        if state.denied.contains(key) {
            return Err(StorageError::ReadDenied(key.to_string()));
        }
        let data = state
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::ItemNotExists(key.to_string()))?;
        Ok((data, state.broken.get(key).copied()))
    }

    async fn copy(&self, key: &str, sink: &mut ByteSink) -> Result<u64> {
        let (data, broken_after) = self.lookup(key)?;

        if let Some(after) = broken_after {
            sink.write_all(&data[..after.min(data.len())]).await?;
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "stream interrupted",
            )));
        }

        sink.write_all(&data).await?;
        Ok(data.len() as u64)
    }
}

#[async_trait]
impl StorageIo for MemoryStorage {
    async fn file_info(&self, file: &File) -> Result<FileInfo> {
        let key = file.storage_key()?;
        let (data, _) = self.lookup(&key)?;
        Ok(FileInfo {
            key,
            size: data.len() as u64,
        })
    }

    async fn read_file(&self, file: &File, sink: &mut ByteSink) -> Result<u64> {
        self.copy(&file.storage_key()?, sink).await
    }

    async fn read_context_for(&self, doc: &Doc) -> Result<Box<dyn ReadContext>> {
        let prefix = format!("{}/", doc.storage_prefix()?);
        {
            let mut state = self.state();
            if state.unavailable.contains(&prefix) {
                return Err(StorageError::ConnectionFailed(prefix));
            }
            if !state.objects.keys().any(|key| key.starts_with(&prefix)) {
                return Err(StorageError::ItemNotExists(prefix));
            }
            state.contexts_opened += 1;
        }

        Ok(Box::new(MemoryReadContext {
            storage: self.clone(),
            doc: doc.clone(),
            closed: false,
        }))
    }
}

struct MemoryReadContext {
    storage: MemoryStorage,
    doc: Doc,
    closed: bool,
}

#[async_trait]
impl ReadContext for MemoryReadContext {
    async fn read_doc_data(&mut self, key: &str, sink: &mut ByteSink) -> Result<u64> {
        if self.closed {
            return Err(StorageError::ContextClosed(self.doc.id().to_string()));
        }
        let key = self.doc.asset_key(key)?;
        self.storage.copy(&key, sink).await
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            self.storage.state().contexts_closed += 1;
        }
        Ok(())
    }
}
