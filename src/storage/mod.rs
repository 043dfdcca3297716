//! # Storage collaborators
//!
//! The catalog never talks to a database or a file format directly. It consumes the
//! [`TableStore`] trait, which offers exactly three primitives:
//!
//! - [`TableStore::read_table`]: whole-table read,
//! - [`TableStore::read_query`]: `SELECT * FROM <table> WHERE <column> IN (<values>)`,
//! - [`TableStore::write_table`]: persist a table under a key.
//!
//! Backends
//! -----------------
//! * [`memory::MemoryStore`] – in-process map, used by tests and for caching a catalog.
//! * [`parquet_store::ParquetStore`] – one `<key>.parquet` file per table in a directory.
//! * [`csv_store::CsvStore`] – one `<key>.csv` file per table in a directory.
//!
//! I/O failures are returned unchanged as [`OpSimError`]; no backend retries.
use std::collections::BTreeSet;

use crate::opsim_errors::OpSimError;
use crate::table::Table;

pub mod csv_store;
pub mod memory;
pub mod parquet_store;

pub use csv_store::CsvStore;
pub use memory::MemoryStore;
pub use parquet_store::ParquetStore;

/// Equality-set query over one integer column of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InQuery {
    pub table: String,
    pub column: String,
    pub values: BTreeSet<i64>,
}

impl InQuery {
    pub fn new(table: impl Into<String>, column: impl Into<String>, values: BTreeSet<i64>) -> Self {
        InQuery {
            table: table.into(),
            column: column.into(),
            values,
        }
    }
}

impl std::fmt::Display for InQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values = itertools::join(&self.values, ", ");
        write!(
            f,
            "SELECT * FROM {} WHERE {} in ({})",
            self.table, self.column, values
        )
    }
}

/// Tabular read/write primitives required by the catalog.
pub trait TableStore {
    /// Read every row of table `name`.
    fn read_table(&self, name: &str) -> Result<Table, OpSimError>;

    /// Read the rows of `query.table` whose `query.column` is in `query.values`.
    ///
    /// The default implementation reads the whole table and filters in memory; backends able
    /// to push the predicate down should override it.
    fn read_query(&self, query: &InQuery) -> Result<Table, OpSimError> {
        self.read_table(&query.table)?
            .filter_in(&query.column, &query.values)
    }

    /// Persist `table` under `key`, replacing any previous table with that key.
    fn write_table(&mut self, key: &str, table: &Table) -> Result<(), OpSimError>;
}
