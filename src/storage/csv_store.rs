//! Directory-backed [`TableStore`] over comma-separated files (`<root>/<key>.csv`).
//!
//! Older OpSim distributions ship flat ASCII tables. Column types are inferred from the
//! content: `Int64` if every cell parses as an integer, else `Float64` if every cell parses as
//! a float, else `Utf8`. An empty file yields string columns.
use camino::{Utf8Path, Utf8PathBuf};

use super::TableStore;
use crate::opsim_errors::OpSimError;
use crate::table::{Column, Table};

#[derive(Debug, Clone)]
pub struct CsvStore {
    root: Utf8PathBuf,
    delimiter: u8,
}

impl CsvStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        CsvStore {
            root: root.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> Utf8PathBuf {
        self.root.join(format!("{key}.csv"))
    }
}

fn infer_column(cells: Vec<String>) -> Column {
    let trimmed = || cells.iter().map(|c| c.trim());

    if !cells.is_empty() && trimmed().all(|c| c.parse::<i64>().is_ok()) {
        return Column::Int64(trimmed().filter_map(|c| c.parse().ok()).collect());
    }
    if !cells.is_empty() && trimmed().all(|c| c.parse::<f64>().is_ok()) {
        return Column::Float64(trimmed().filter_map(|c| c.parse().ok()).collect());
    }
    Column::Utf8(cells)
}

impl TableStore for CsvStore {
    fn read_table(&self, name: &str) -> Result<Table, OpSimError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(OpSimError::TableNotFound(name.to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .from_path(&path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            for (col, value) in cells.iter_mut().zip(record.iter()) {
                col.push(value.to_string());
            }
        }

        let mut table = Table::new();
        for (header, values) in headers.into_iter().zip(cells) {
            table.push_column(header, infer_column(values))?;
        }

        tracing::info!(table = name, path = %path, rows = table.num_rows(), "read csv table");
        Ok(table)
    }

    fn write_table(&mut self, key: &str, table: &Table) -> Result<(), OpSimError> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(&path)?;
        writer.write_record(table.column_names())?;

        let columns: Vec<&Column> = table.iter().map(|(_, c)| c).collect();
        for row in 0..table.num_rows() {
            let record = columns.iter().map(|column| match column {
                Column::Int64(v) => v[row].to_string(),
                Column::Float64(v) => v[row].to_string(),
                Column::Utf8(v) => v[row].clone(),
            });
            writer.write_record(record)?;
        }
        writer.flush()?;

        tracing::info!(key, path = %path, rows = table.num_rows(), "wrote csv table");
        Ok(())
    }
}
