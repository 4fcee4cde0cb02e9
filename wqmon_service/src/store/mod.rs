//! Record store adapter.
//!
//! A store holds flat water quality documents and supports two operations:
//! append one document, and read every document back in insertion order.
//! There is no pagination, no update, no delete, and no retry. The handle is
//! always passed explicitly so tests can substitute `MemoryStore` for the
//! database-backed store.

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::PostgresStore;

use serde_json::Value;

use crate::model::{Document, StoreError};

/// Collection used when the configuration does not name one.
pub const DEFAULT_COLLECTION: &str = "water_quality";

/// Operations every record store provides.
pub trait RecordStore {
    /// Appends one document. Fails with `StoreError::Write` if the document
    /// is not flat or the store refuses it, and `StoreError::Connection` if
    /// the store cannot be reached.
    fn insert(&mut self, doc: &Document) -> Result<(), StoreError>;

    /// Returns every stored document, field names verbatim, in the order the
    /// store assigned them.
    fn fetch_all(&mut self) -> Result<Vec<Document>, StoreError>;
}

/// Connects to the database-backed store named by `target`, creating the
/// collection if it does not exist yet.
pub fn connect(target: &str, collection: &str) -> Result<PostgresStore, StoreError> {
    PostgresStore::connect(target, collection)
}

/// Checks that every value in `doc` is a scalar (string, number, bool or
/// null). Nested arrays and objects are not part of the wire format.
pub fn ensure_flat(doc: &Document) -> Result<(), StoreError> {
    for (key, value) in doc {
        if matches!(value, Value::Array(_) | Value::Object(_)) {
            return Err(StoreError::Write(format!(
                "field '{}' holds a nested value; documents must be flat",
                key
            )));
        }
    }
    Ok(())
}

/// Collection names are interpolated into SQL, so only plain identifiers
/// are accepted.
pub fn validate_collection_name(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::Connection(format!(
            "invalid collection name '{}': expected letters, digits and underscores",
            name
        )))
    }
}
