/// In-process record store.
///
/// Holds documents in a `Vec` and honors the same contract as the database
/// store, including flatness checks. Used by tests and by `wqmon --memory`.
/// Failure modes can be switched on to exercise error paths without a
/// database.

use super::{RecordStore, ensure_flat};
use crate::model::{Document, StoreError};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Vec<Document>,
    unreachable: bool,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with `documents`, as if they had been inserted in
    /// order. No flatness check is applied, so tests can seed legacy data.
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents,
            ..Self::default()
        }
    }

    /// Makes every subsequent call fail with `StoreError::Connection`.
    pub fn set_unreachable(&mut self, unreachable: bool) {
        self.unreachable = unreachable;
    }

    /// Makes every subsequent insert fail with `StoreError::Write`.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.unreachable {
            Err(StoreError::Connection("memory store marked unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl RecordStore for MemoryStore {
    fn insert(&mut self, doc: &Document) -> Result<(), StoreError> {
        self.check_reachable()?;
        if self.read_only {
            return Err(StoreError::Write("memory store is read-only".to_string()));
        }
        ensure_flat(doc)?;
        self.documents.push(doc.clone());
        Ok(())
    }

    fn fetch_all(&mut self) -> Result<Vec<Document>, StoreError> {
        self.check_reachable()?;
        Ok(self.documents.clone())
    }
}
