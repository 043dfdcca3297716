//! # Named-column tables
//!
//! Minimal columnar container exchanged with the storage layer. A [`Table`] is an ordered list
//! of uniquely named, equal-length [`Column`]s. Only three physical types are needed by OpSim
//! outputs: 64-bit integers (identifiers), 64-bit floats (angles, times, photometric metrics)
//! and strings (proposal names).
//!
//! There are no joins and no expressions. The only
//! row-level operations are index selection ([`Table::take`]) and the single equality-set
//! filter used by OpSim queries ([`Table::filter_in`]).
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use opsimsummary::table::{Column, Table};
//!
//! let table = Table::new()
//!     .with_column("propID", Column::Int64(vec![1, 2, 1]))
//!     .unwrap()
//!     .with_column("expMJD", Column::Float64(vec![59580.1, 59580.2, 59580.3]))
//!     .unwrap();
//!
//! let wanted: BTreeSet<i64> = [1].into_iter().collect();
//! let wfd = table.filter_in("propID", &wanted).unwrap();
//! assert_eq!(wfd.num_rows(), 2);
//! ```
use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::opsim_errors::OpSimError;

/// A typed column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Int64(v) => v.len(),
            Column::Float64(v) => v.len(),
            Column::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the physical type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Column::Int64(_) => "Int64",
            Column::Float64(_) => "Float64",
            Column::Utf8(_) => "Utf8",
        }
    }

    /// Gather the rows at `indices`, in that order.
    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Int64(v) => Column::Int64(indices.iter().map(|&i| v[i]).collect()),
            Column::Float64(v) => Column::Float64(indices.iter().map(|&i| v[i]).collect()),
            Column::Utf8(v) => Column::Utf8(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// Ordered collection of named columns sharing the same number of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Table::push_column`].
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self, OpSimError> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Append a column at the end of the table.
    ///
    /// Arguments
    /// -----------------
    /// * `name`: the column name, must not already be present.
    /// * `column`: the values; must have [`Table::num_rows`] rows unless the table is empty.
    ///
    /// Return
    /// ----------
    /// * `Ok(())`, or [`OpSimError::DuplicateColumn`] / [`OpSimError::LengthMismatch`].
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), OpSimError> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(OpSimError::DuplicateColumn(name));
        }
        if !self.columns.is_empty() && column.len() != self.num_rows() {
            return Err(OpSimError::LengthMismatch {
                column: name,
                expected: self.num_rows(),
                found: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    pub fn column(&self, name: &str) -> Result<&Column, OpSimError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| &self.columns[idx])
            .ok_or_else(|| OpSimError::MissingColumn(name.to_string()))
    }

    /// Integer view of a column. An empty string column reads as an empty integer column.
    pub fn ints(&self, name: &str) -> Result<&[i64], OpSimError> {
        match self.column(name)? {
            Column::Int64(v) => Ok(v),
            Column::Utf8(v) if v.is_empty() => Ok(&[]),
            _ => Err(OpSimError::ColumnType {
                column: name.to_string(),
                expected: "Int64",
            }),
        }
    }

    pub fn strings(&self, name: &str) -> Result<&[String], OpSimError> {
        match self.column(name)? {
            Column::Utf8(v) => Ok(v),
            _ => Err(OpSimError::ColumnType {
                column: name.to_string(),
                expected: "Utf8",
            }),
        }
    }

    /// Float view of a numeric column.
    ///
    /// Integer columns are widened to `f64`: flat-file readers infer an integer type for
    /// columns such as `expMJD` when every value happens to be whole, and a header-only
    /// file gives string columns with no rows.
    pub fn floats(&self, name: &str) -> Result<Cow<'_, [f64]>, OpSimError> {
        match self.column(name)? {
            Column::Float64(v) => Ok(Cow::Borrowed(v)),
            Column::Int64(v) => Ok(Cow::Owned(v.iter().map(|&x| x as f64).collect())),
            Column::Utf8(v) if v.is_empty() => Ok(Cow::Borrowed(&[])),
            Column::Utf8(_) => Err(OpSimError::ColumnType {
                column: name.to_string(),
                expected: "Float64",
            }),
        }
    }

    /// Build a new table made of the `(source, target)` pairs: each `source` column is copied
    /// under the name `target`, in the order given.
    ///
    /// The same source may appear more than once, which is how a version whose pointing
    /// coordinates *are* the field-center coordinates still gets both canonical columns.
    pub fn project_renamed(&self, pairs: &[(&str, &str)]) -> Result<Table, OpSimError> {
        let mut out = Table::new();
        for (source, target) in pairs {
            out.push_column(*target, self.column(source)?.clone())?;
        }
        Ok(out)
    }

    /// Gather the rows at `indices` in every column.
    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
        }
    }

    /// Keep the rows whose integer `column` value belongs to `values`
    /// (`SELECT * WHERE column IN (values)`).
    pub fn filter_in(&self, column: &str, values: &BTreeSet<i64>) -> Result<Table, OpSimError> {
        let keys = self.ints(column)?;
        let indices: Vec<usize> = keys
            .iter()
            .enumerate()
            .filter(|(_, k)| values.contains(k))
            .map(|(i, _)| i)
            .collect();
        Ok(self.take(&indices))
    }
}
