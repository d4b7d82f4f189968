//! # Composition Module
//!
//! ## Purpose
//! A composition table pairs a list of column names (oxides such as CaO,
//! SiO2, or angular coordinates after the sphere transform) with a dense
//! matrix of fractions, one row per sample. This module provides the table
//! type, column selection against a shared schema, row/column normalization
//! and the angular (sphere) transform of composition space.
//!
//! ## Error policy
//! A row or column that sums to zero is a degenerate composition and is
//! raised as an error instead of letting NaN/Inf propagate through the
//! pipeline.

use nalgebra::DMatrix;
use thiserror::Error;

/// Normalization axis of a composition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

#[derive(Debug, Error, PartialEq)]
pub enum CompositionError {
    #[error("degenerate composition: {axis:?} {index} sums to zero")]
    Degenerate { axis: Axis, index: usize },
    #[error("column '{0}' is missing from the composition table")]
    MissingColumn(String),
    #[error("table with {columns} columns cannot hold rows of length {row_len} (row {row})")]
    RowLength {
        columns: usize,
        row_len: usize,
        row: usize,
    },
    #[error("{names} column names for a matrix with {ncols} columns")]
    NameCount { names: usize, ncols: usize },
}

/// Named columns over a dense matrix of composition fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionTable {
    pub columns: Vec<String>,
    pub data: DMatrix<f64>,
}

impl CompositionTable {
    pub fn new(columns: Vec<String>, data: DMatrix<f64>) -> Result<Self, CompositionError> {
        if columns.len() != data.ncols() {
            return Err(CompositionError::NameCount {
                names: columns.len(),
                ncols: data.ncols(),
            });
        }
        Ok(CompositionTable { columns, data })
    }

    pub fn from_rows(
        columns: Vec<String>,
        rows: &[Vec<f64>],
    ) -> Result<Self, CompositionError> {
        let ncols = columns.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(CompositionError::RowLength {
                    columns: ncols,
                    row_len: row.len(),
                    row: i,
                });
            }
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let data = DMatrix::from_row_slice(rows.len(), ncols, &flat);
        Ok(CompositionTable { columns, data })
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Restricts the table to the given columns, in the given order. Used to
    /// align the reference table with the query table's oxide schema.
    pub fn select(&self, columns: &[String]) -> Result<CompositionTable, CompositionError> {
        let mut data = DMatrix::zeros(self.data.nrows(), columns.len());
        for (j, name) in columns.iter().enumerate() {
            let src = self
                .column_index(name)
                .ok_or_else(|| CompositionError::MissingColumn(name.clone()))?;
            data.set_column(j, &self.data.column(src));
        }
        Ok(CompositionTable {
            columns: columns.to_vec(),
            data,
        })
    }

    /// Divides every entry by the sum along the chosen axis, so rows (or
    /// columns) sum to 1. A zero or non-finite sum is a degenerate
    /// composition error.
    pub fn normalize(&self, axis: Axis) -> Result<CompositionTable, CompositionError> {
        let mut data = self.data.clone();
        match axis {
            Axis::Row => {
                for i in 0..data.nrows() {
                    let sum: f64 = data.row(i).sum();
                    if sum == 0.0 || !sum.is_finite() {
                        return Err(CompositionError::Degenerate { axis, index: i });
                    }
                    for j in 0..data.ncols() {
                        data[(i, j)] /= sum;
                    }
                }
            }
            Axis::Column => {
                for j in 0..data.ncols() {
                    let sum: f64 = data.column(j).sum();
                    if sum == 0.0 || !sum.is_finite() {
                        return Err(CompositionError::Degenerate { axis, index: j });
                    }
                    for i in 0..data.nrows() {
                        data[(i, j)] /= sum;
                    }
                }
            }
        }
        Ok(CompositionTable {
            columns: self.columns.clone(),
            data,
        })
    }

    /// Angular transform of composition space: for every column k except the
    /// last, y_k = atan2(sqrt(x_{k+1} + ... + x_n), sqrt(x_k)). Output has
    /// one column fewer, named theta_1, theta_2, ...
    pub fn sphere_transform(&self) -> CompositionTable {
        let nrows = self.data.nrows();
        let ncols = self.data.ncols();
        let out_cols = ncols.saturating_sub(1);
        let mut data = DMatrix::zeros(nrows, out_cols);
        for i in 0..nrows {
            for k in 0..out_cols {
                let tail: f64 = (k + 1..ncols).map(|j| self.data[(i, j)]).sum();
                data[(i, k)] = tail.sqrt().atan2(self.data[(i, k)].sqrt());
            }
        }
        let columns = (1..=out_cols).map(|k| format!("theta_{}", k)).collect();
        CompositionTable { columns, data }
    }
}
