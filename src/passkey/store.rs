//! Durable list of passkey identity records
//!
//! The whole list lives in one JSON document under one storage key. Every
//! operation re-reads the document; nothing is cached between calls.

use std::sync::{Mutex, PoisonError};

use crate::passkey::errors::PasskeyError;
use crate::passkey::storage::DocumentStorage;
use crate::passkey::types::PasskeyItem;

/// Storage key used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "safe_passkey_list";

/// Passkey record store over a [`DocumentStorage`] backend
pub struct PasskeyStore<S> {
    storage: S,
    key: String,
    // Serializes read-modify-write cycles issued through this store
    write_lock: Mutex<()>,
}

impl<S: DocumentStorage> PasskeyStore<S> {
    /// Create a store using the default storage key
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    /// Create a store using a specific storage key
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Storage key holding the passkey list
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read every stored record, in insertion order
    ///
    /// # Errors
    /// Returns `PasskeyError::CorruptStore` if the document is not a JSON
    /// list of records, or `PasskeyError::Storage` if it cannot be read.
    pub fn load(&self) -> Result<Vec<PasskeyItem>, PasskeyError> {
        let Some(document) = self.storage.load(&self.key)? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&document).map_err(|e| {
            log::error!("Passkey list under '{}' cannot be decoded: {e}", self.key);
            PasskeyError::CorruptStore(e.to_string())
        })
    }

    /// Append a record to the stored list
    ///
    /// No uniqueness check is made on `raw_id`.
    ///
    /// # Errors
    /// Returns an error if the current list cannot be loaded or the new list
    /// cannot be written.
    pub fn append(&self, record: PasskeyItem) -> Result<(), PasskeyError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = self.load()?;
        records.push(record);

        let document = serde_json::to_string(&records).map_err(|e| {
            PasskeyError::CorruptStore(format!("failed to encode passkey list: {e}"))
        })?;
        self.storage.save(&self.key, &document)?;

        log::debug!("Passkey list under '{}' now holds {} records", self.key, records.len());
        Ok(())
    }

    /// Find the first record whose `raw_id` equals `raw_id`
    ///
    /// # Errors
    /// Returns `PasskeyError::NotFound` if no record matches, or any error
    /// raised by [`load`](Self::load).
    pub fn find_by_id(&self, raw_id: &str) -> Result<PasskeyItem, PasskeyError> {
        self.load()?
            .into_iter()
            .find(|record| record.raw_id == raw_id)
            .ok_or_else(|| PasskeyError::NotFound(raw_id.to_string()))
    }

    /// Delete the whole stored list
    ///
    /// # Errors
    /// Returns `PasskeyError::Storage` if the document cannot be removed.
    pub fn clear(&self) -> Result<(), PasskeyError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.storage.remove(&self.key)?;
        log::info!("Cleared passkey list under '{}'", self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passkey::storage::MemoryStorage;

    fn store() -> PasskeyStore<MemoryStorage> {
        PasskeyStore::new(MemoryStorage::new())
    }

    #[test]
    fn test_empty_store_loads_empty_list() {
        assert!(store().load().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_load() {
        let store = store();
        store.append(PasskeyItem::new("ab12", "cd34")).unwrap();

        assert_eq!(store.load().unwrap(), vec![PasskeyItem::new("ab12", "cd34")]);
        assert_eq!(
            store.storage().load(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"[{"rawId":"ab12","publicKey":"cd34"}]"#)
        );
    }

    #[test]
    fn test_appends_preserve_order() {
        let store = store();
        let records: Vec<_> = (0u8..10)
            .map(|i| PasskeyItem::new(format!("{i:02x}"), format!("{:02x}", i + 100)))
            .collect();

        for record in &records {
            store.append(record.clone()).unwrap();
        }

        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn test_load_is_idempotent() {
        let store = store();
        store.append(PasskeyItem::new("01", "02")).unwrap();
        store.append(PasskeyItem::new("03", "04")).unwrap();

        assert_eq!(store.load().unwrap(), store.load().unwrap());
    }

    #[test]
    fn test_find_by_id() {
        let store = store();
        store.append(PasskeyItem::new("ab12", "cd34")).unwrap();

        assert_eq!(
            store.find_by_id("ab12").unwrap(),
            PasskeyItem::new("ab12", "cd34")
        );
        assert!(matches!(
            store.find_by_id("ff99"),
            Err(PasskeyError::NotFound(id)) if id == "ff99"
        ));
    }

    #[test]
    fn test_find_by_id_is_exact_match() {
        let store = store();
        store.append(PasskeyItem::new("ab12", "cd34")).unwrap();

        assert!(store.find_by_id("AB12").is_err());
        assert!(store.find_by_id("ab1").is_err());
    }

    #[test]
    fn test_duplicate_ids_return_first() {
        let store = store();
        store.append(PasskeyItem::new("ab12", "first")).unwrap();
        store.append(PasskeyItem::new("ab12", "second")).unwrap();

        assert_eq!(store.find_by_id("ab12").unwrap().public_key, "first");
        assert_eq!(store.load().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_document() {
        let store = store();
        store.storage().save(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        assert!(matches!(store.load(), Err(PasskeyError::CorruptStore(_))));

        // Valid JSON with the wrong structure is also corrupt
        store.storage().save(DEFAULT_STORAGE_KEY, r#"{"rawId":"ab"}"#).unwrap();
        assert!(matches!(store.load(), Err(PasskeyError::CorruptStore(_))));

        // Appending never overwrites a corrupt document
        assert!(store.append(PasskeyItem::new("ab", "cd")).is_err());
        assert_eq!(
            store.storage().load(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"rawId":"ab"}"#)
        );
    }

    #[test]
    fn test_clear() {
        let store = store();
        store.append(PasskeyItem::new("ab12", "cd34")).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_custom_key_is_isolated() {
        let storage = std::sync::Arc::new(MemoryStorage::new());
        let a = PasskeyStore::with_key(storage.clone(), "list_a");
        let b = PasskeyStore::with_key(storage, "list_b");

        a.append(PasskeyItem::new("aa", "01")).unwrap();
        assert_eq!(a.load().unwrap().len(), 1);
        assert!(b.load().unwrap().is_empty());
        assert_eq!(b.key(), "list_b");
    }
}
