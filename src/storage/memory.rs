//! In-memory table store.
//!
//! Keeps tables in a hash map keyed by table name. Used for tests and to cache a normalized
//! catalog within a process.
use ahash::RandomState;
use std::collections::HashMap;

use super::TableStore;
use crate::opsim_errors::OpSimError;
use crate::table::Table;

pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: FastHashMap<String, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, convenient for fixtures.
    pub fn with_table(mut self, name: impl Into<String>, table: Table) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableStore for MemoryStore {
    fn read_table(&self, name: &str) -> Result<Table, OpSimError> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| OpSimError::TableNotFound(name.to_string()))
    }

    fn write_table(&mut self, key: &str, table: &Table) -> Result<(), OpSimError> {
        tracing::debug!(key, rows = table.num_rows(), "writing table to memory store");
        self.tables.insert(key.to_string(), table.clone());
        Ok(())
    }
}
