/// PostgreSQL-backed record store.
///
/// Each collection is a table of JSONB documents keyed by a `BIGSERIAL` id.
/// The id is the only identity a record has; it fixes the order `fetch_all`
/// returns and is never exposed to callers.
///
/// Errors are split the way callers need them: anything the server itself
/// rejected is a `StoreError::Write`, everything else (refused connection,
/// dropped socket, bad connection string) is a `StoreError::Connection`.

use std::time::Duration;

use postgres::{Client, Config, NoTls};
use serde_json::Value;

use super::{RecordStore, ensure_flat, validate_collection_name};
use crate::logging::{self, Component};
use crate::model::{Document, StoreError};

/// How long to wait for the server before giving up on `connect`.
const CONNECT_TIMEOUT_SECS: u64 = 10;

pub struct PostgresStore {
    client: Client,
    collection: String,
}

impl PostgresStore {
    /// Opens a connection to `target` (a libpq-style connection string or
    /// `postgres://` URL) and makes sure `collection` exists.
    pub fn connect(target: &str, collection: &str) -> Result<Self, StoreError> {
        validate_collection_name(collection)?;

        let mut config: Config = target
            .parse()
            .map_err(|e| StoreError::Connection(format!("invalid connection target: {}", e)))?;
        config.connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS));

        let mut client = config
            .connect(NoTls)
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        client
            .batch_execute(&format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id  BIGSERIAL PRIMARY KEY,
                    doc JSONB NOT NULL
                )",
                collection
            ))
            .map_err(|e| StoreError::Connection(format!("cannot open collection: {}", e)))?;

        logging::debug(
            Component::Store,
            None,
            &format!("Connected to collection '{}'", collection),
        );

        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

fn classify_write_failure(err: postgres::Error) -> StoreError {
    if err.as_db_error().is_some() {
        StoreError::Write(err.to_string())
    } else {
        StoreError::Connection(err.to_string())
    }
}

impl RecordStore for PostgresStore {
    fn insert(&mut self, doc: &Document) -> Result<(), StoreError> {
        ensure_flat(doc)?;

        let value = Value::Object(doc.clone());
        self.client
            .execute(
                &format!("INSERT INTO {} (doc) VALUES ($1)", self.collection),
                &[&value],
            )
            .map_err(classify_write_failure)?;
        Ok(())
    }

    fn fetch_all(&mut self) -> Result<Vec<Document>, StoreError> {
        let rows = self
            .client
            .query(
                &format!("SELECT doc FROM {} ORDER BY id", self.collection),
                &[],
            )
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let mut docs = Vec::with_capacity(rows.len());
        for row in rows {
            let value: Value = row
                .try_get(0)
                .map_err(|e| StoreError::Connection(format!("unreadable document: {}", e)))?;
            match value {
                Value::Object(doc) => docs.push(doc),
                other => logging::warn(
                    Component::Store,
                    None,
                    &format!("Skipping non-object document in '{}': {}", self.collection, other),
                ),
            }
        }
        Ok(docs)
    }
}
