//! Storage types

use crate::error::{Result, StorageError};

/// Key prefix for original uploaded files
pub const FILES_PREFIX: &str = "files";

/// Key prefix for converted document assets
pub const DOCS_PREFIX: &str = "docs";

/// Handle of a stored source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    id: String,
}

impl File {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Storage key of the file, `files/{id}`
    pub fn storage_key(&self) -> Result<String> {
        check_key(&self.id, false)?;
        Ok(format!("{}/{}", FILES_PREFIX, self.id))
    }
}

/// Handle of a converted document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doc {
    id: String,
}

impl Doc {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Key prefix under which the document's assets live, `docs/{id}`
    pub fn storage_prefix(&self) -> Result<String> {
        check_key(&self.id, false)?;
        Ok(format!("{}/{}", DOCS_PREFIX, self.id))
    }

    /// Storage key of one of the document's assets, `docs/{id}/{key}`
    pub fn asset_key(&self, key: &str) -> Result<String> {
        let prefix = self.storage_prefix()?;
        check_key(key, true)?;
        Ok(format!("{}/{}", prefix, key))
    }
}

/// Metadata about a stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub key: String,
    pub size: u64,
}

/// Refuse keys that could escape the storage layout.
///
/// Nested keys may contain `/` separators, but no empty, `.` or `..`
/// components.
fn check_key(key: &str, allow_nested: bool) -> Result<()> {
    let escapes = key.is_empty()
        || key.starts_with('/')
        || key.contains(['\\', '\0'])
        || (!allow_nested && key.contains('/'))
        || key
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");

    if escapes {
        return Err(StorageError::ReadDenied(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_key() {
        assert_eq!(File::new("doc-42").storage_key().unwrap(), "files/doc-42");
    }

    #[test]
    fn test_doc_asset_key() {
        let doc = Doc::new("doc-7");
        assert_eq!(doc.storage_prefix().unwrap(), "docs/doc-7");
        assert_eq!(doc.asset_key("bg3.png").unwrap(), "docs/doc-7/bg3.png");
        assert_eq!(
            doc.asset_key("images/bg3.png").unwrap(),
            "docs/doc-7/images/bg3.png"
        );
    }

    #[test]
    fn test_rejects_escaping_keys() {
        for id in ["", "..", "a/b", "/etc", "a\\b", "nul\0"] {
            assert!(
                matches!(File::new(id).storage_key(), Err(StorageError::ReadDenied(_))),
                "id {:?} should be refused",
                id
            );
        }

        let doc = Doc::new("doc-7");
        for key in ["../secret", "/abs", "a//b", "a/./b", "trailing/"] {
            assert!(
                matches!(doc.asset_key(key), Err(StorageError::ReadDenied(_))),
                "key {:?} should be refused",
                key
            );
        }
    }
}
