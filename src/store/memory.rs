//! In-memory stores for tests and dry runs.

use super::{DocumentStore, LedgerStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps documents keyed by `(path, name)` and counts writes.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<BTreeMap<(String, String), String>>,
    writes: Mutex<usize>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with existing documents (bodies left empty).
    #[must_use]
    pub fn with_existing<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        {
            let mut docs = lock(&store.docs);
            for (path, name) in entries {
                docs.insert((path.to_string(), name.to_string()), String::new());
            }
        }
        store
    }

    /// Body of a stored document.
    #[must_use]
    pub fn get(&self, path: &str, name: &str) -> Option<String> {
        lock(&self.docs)
            .get(&(path.to_string(), name.to_string()))
            .cloned()
    }

    /// Number of `create` calls served.
    #[must_use]
    pub fn write_count(&self) -> usize {
        *lock(&self.writes)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn exists(&self, path: &str, name: &str) -> Result<bool> {
        Ok(lock(&self.docs).contains_key(&(path.to_string(), name.to_string())))
    }

    async fn create(&self, path: &str, name: &str, body: &str) -> Result<()> {
        lock(&self.docs).insert((path.to_string(), name.to_string()), body.to_string());
        *lock(&self.writes) += 1;
        Ok(())
    }
}

/// Tables held as vectors of rows.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    tables: Mutex<BTreeMap<String, Vec<Vec<String>>>>,
}

impl MemoryLedgerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a whole table.
    pub fn set_table(&self, table: &str, rows: Vec<Vec<String>>) {
        lock(&self.tables).insert(table.to_string(), rows);
    }

    /// Snapshot of a table.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Vec<String>> {
        lock(&self.tables).get(table).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn get_rows(&self, table: &str) -> Result<Vec<Vec<String>>> {
        Ok(self.rows(table))
    }

    async fn append_row(&self, table: &str, row: Vec<String>) -> Result<()> {
        lock(&self.tables).entry(table.to_string()).or_default().push(row);
        Ok(())
    }
}
