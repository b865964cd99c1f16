//! Document storage backends
//!
//! A `DocumentStorage` holds string documents under string keys, the way a
//! browser's local storage does. The passkey store and the software
//! authenticator are written against this trait so tests can substitute the
//! in-memory backend.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::passkey::errors::StorageError;

static STORAGE_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("storage key pattern is valid"));

/// Key/document persistence capability
pub trait DocumentStorage: Send + Sync {
    /// Read the document stored under `key`, `None` when absent
    ///
    /// # Errors
    /// Returns an error if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the document stored under `key`
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn save(&self, key: &str, document: &str) -> Result<(), StorageError>;

    /// Remove the document stored under `key`; removing an absent key is not an error
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: DocumentStorage + ?Sized> DocumentStorage for std::sync::Arc<T> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, document: &str) -> Result<(), StorageError> {
        (**self).save(key, document)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        Ok(documents.get(key).cloned())
    }

    fn save(&self, key: &str, document: &str) -> Result<(), StorageError> {
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        documents.insert(key.to_string(), document.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        documents.remove(key);
        Ok(())
    }
}

/// Directory-backed storage, one `<key>.json` file per key
///
/// Documents are replaced atomically: the new content is written to a
/// temporary sibling file and renamed over the old one.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the documents
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn document_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !STORAGE_KEY_PATTERN.is_match(key) || key.starts_with('.') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl DocumentStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.document_path(key)?;
        match fs::read_to_string(&path) {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, document: &str) -> Result<(), StorageError> {
        let path = self.document_path(key)?;
        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp_path, document)?;
        fs::rename(&tmp_path, &path)?;
        log::debug!("Saved document {} ({} bytes)", path.display(), document.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.document_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
