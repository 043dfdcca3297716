//! # Parquet table store
//!
//! Directory-backed [`TableStore`] holding one Apache Parquet file per table
//! (`<root>/<key>.parquet`). This is the on-disk cache format for normalized catalogs and a
//! convenient exchange format for OpSim outputs converted from their original database.
//!
//! ## Type mapping
//! -----------------
//! | Arrow type                          | [`Column`]            |
//! |-------------------------------------|-----------------------|
//! | `Int16`, `Int32`, `Int64`, `UInt32` | [`Column::Int64`]     |
//! | `Float32`, `Float64`                | [`Column::Float64`]   |
//! | `Utf8`, `LargeUtf8`                 | [`Column::Utf8`]      |
//!
//! Any other Arrow type is rejected with [`OpSimError::UnsupportedColumnType`]. OpSim tables
//! have no missing values, so a null anywhere surfaces as [`OpSimError::NullValue`] rather
//! than being silently dropped.
//!
//! On write, columns are stored as `Int64`, `Float64` and `Utf8` respectively, in a single
//! record batch.
use std::fs::File;
use std::sync::Arc;

use arrow_array::{
    Array, ArrayRef, Float32Array, Float64Array, Int16Array, Int32Array, Int64Array,
    LargeStringArray, RecordBatch, RecordBatchReader, StringArray, UInt32Array,
};
use arrow_schema::{DataType, Field, Schema};
use camino::{Utf8Path, Utf8PathBuf};
use parquet::arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter};

use super::TableStore;
use crate::opsim_errors::OpSimError;
use crate::table::{Column, Table};

const DEFAULT_BATCH_SIZE: usize = 8192;

#[derive(Debug, Clone)]
pub struct ParquetStore {
    root: Utf8PathBuf,
    batch_size: usize,
}

impl ParquetStore {
    /// Open a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        ParquetStore {
            root: root.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the Arrow reader batch size (default: 8192 rows).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> Utf8PathBuf {
        self.root.join(format!("{key}.parquet"))
    }

    fn read(&self, name: &str) -> Result<Table, OpSimError> {
        let path = self.path_for(name);
        if !path.exists() {
            return Err(OpSimError::TableNotFound(name.to_string()));
        }

        let file = File::open(&path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(self.batch_size)
            .build()?;
        let schema = reader.schema();

        let mut accumulators: Vec<Column> = schema
            .fields()
            .iter()
            .map(|field| empty_column(field))
            .collect::<Result<_, _>>()?;

        for maybe_batch in reader {
            let batch = maybe_batch?;
            for (idx, acc) in accumulators.iter_mut().enumerate() {
                append_array(acc, schema.field(idx).name(), batch.column(idx))?;
            }
        }

        let mut table = Table::new();
        for (field, column) in schema.fields().iter().zip(accumulators) {
            table.push_column(field.name().clone(), column)?;
        }

        tracing::info!(
            table = name,
            path = %path,
            rows = table.num_rows(),
            "read parquet table"
        );
        Ok(table)
    }
}

fn empty_column(field: &Field) -> Result<Column, OpSimError> {
    match field.data_type() {
        DataType::Int16 | DataType::Int32 | DataType::Int64 | DataType::UInt32 => {
            Ok(Column::Int64(Vec::new()))
        }
        DataType::Float32 | DataType::Float64 => Ok(Column::Float64(Vec::new())),
        DataType::Utf8 | DataType::LargeUtf8 => Ok(Column::Utf8(Vec::new())),
        other => Err(OpSimError::UnsupportedColumnType {
            column: field.name().clone(),
            data_type: other.to_string(),
        }),
    }
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, name: &str) -> Result<&'a T, OpSimError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| OpSimError::UnsupportedColumnType {
            column: name.to_string(),
            data_type: array.data_type().to_string(),
        })
}

/// Append one Arrow array to the matching accumulator. Arrays are downcast once per batch.
fn append_array(acc: &mut Column, name: &str, array: &ArrayRef) -> Result<(), OpSimError> {
    if array.null_count() > 0 {
        return Err(OpSimError::NullValue(name.to_string()));
    }

    match (acc, array.data_type()) {
        (Column::Int64(v), DataType::Int64) => {
            v.extend_from_slice(downcast::<Int64Array>(array, name)?.values())
        }
        (Column::Int64(v), DataType::Int32) => v.extend(
            downcast::<Int32Array>(array, name)?
                .values()
                .iter()
                .map(|&x| i64::from(x)),
        ),
        (Column::Int64(v), DataType::Int16) => v.extend(
            downcast::<Int16Array>(array, name)?
                .values()
                .iter()
                .map(|&x| i64::from(x)),
        ),
        (Column::Int64(v), DataType::UInt32) => v.extend(
            downcast::<UInt32Array>(array, name)?
                .values()
                .iter()
                .map(|&x| i64::from(x)),
        ),
        (Column::Float64(v), DataType::Float64) => {
            v.extend_from_slice(downcast::<Float64Array>(array, name)?.values())
        }
        (Column::Float64(v), DataType::Float32) => v.extend(
            downcast::<Float32Array>(array, name)?
                .values()
                .iter()
                .map(|&x| f64::from(x)),
        ),
        (Column::Utf8(v), DataType::Utf8) => v.extend(
            downcast::<StringArray>(array, name)?
                .iter()
                .map(|s| s.unwrap_or_default().to_string()),
        ),
        (Column::Utf8(v), DataType::LargeUtf8) => v.extend(
            downcast::<LargeStringArray>(array, name)?
                .iter()
                .map(|s| s.unwrap_or_default().to_string()),
        ),
        (_, other) => {
            return Err(OpSimError::UnsupportedColumnType {
                column: name.to_string(),
                data_type: other.to_string(),
            })
        }
    }
    Ok(())
}

fn to_record_batch(table: &Table) -> Result<RecordBatch, OpSimError> {
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.num_columns());

    for (name, column) in table.iter() {
        let (data_type, array): (DataType, ArrayRef) = match column {
            Column::Int64(v) => (DataType::Int64, Arc::new(Int64Array::from(v.clone()))),
            Column::Float64(v) => (DataType::Float64, Arc::new(Float64Array::from(v.clone()))),
            Column::Utf8(v) => (DataType::Utf8, Arc::new(StringArray::from(v.clone()))),
        };
        fields.push(Field::new(name, data_type, false));
        arrays.push(array);
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

impl TableStore for ParquetStore {
    fn read_table(&self, name: &str) -> Result<Table, OpSimError> {
        self.read(name)
    }

    fn write_table(&mut self, key: &str, table: &Table) -> Result<(), OpSimError> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);

        let batch = to_record_batch(table)?;
        let file = File::create(&path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;

        tracing::info!(key, path = %path, rows = table.num_rows(), "wrote parquet table");
        Ok(())
    }
}
