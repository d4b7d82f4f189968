//! # Composition File Loader
//!
//! Reads a comma-separated table of glass samples into a composition table.
//! The header row names the columns; only columns whose name contains "O"
//! (the oxide columns) are kept, mirroring how raw glass datasets mix oxide
//! fractions with measured properties in one file.

use crate::Descriptors::composition::{CompositionError, CompositionTable};
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("file '{0}' does not exist")]
    FileNotFound(String),
    #[error("failed to read '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("file '{0}' has no header row")]
    MissingHeader(String),
    #[error("file '{0}' has no oxide columns (names containing 'O')")]
    NoOxideColumns(String),
    #[error("line {line}: expected {expected} fields, found {found}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}, column '{column}': cannot parse '{value}' as a number")]
    BadNumber {
        line: usize,
        column: String,
        value: String,
    },
    #[error(transparent)]
    Composition(#[from] CompositionError),
}

/// Loads the oxide composition columns of a comma-separated sample file.
pub fn load_composition_table(file_name: &str) -> Result<CompositionTable, LoaderError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(LoaderError::FileNotFound(file_name.to_string()));
    }
    let file = File::open(path).map_err(|source| LoaderError::Io {
        file: file_name.to_string(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line.map_err(|source| LoaderError::Io {
            file: file_name.to_string(),
            source,
        })?,
        None => return Err(LoaderError::MissingHeader(file_name.to_string())),
    };
    let all_columns: Vec<String> = header.split(',').map(|c| c.trim().to_string()).collect();

    // oxide columns are the ones carrying an O in their name (CaO, SiO2, ...)
    let oxide_idx: Vec<usize> = all_columns
        .iter()
        .enumerate()
        .filter(|(_, name)| name.contains('O'))
        .map(|(i, _)| i)
        .collect();
    if oxide_idx.is_empty() {
        return Err(LoaderError::NoOxideColumns(file_name.to_string()));
    }
    let columns: Vec<String> = oxide_idx.iter().map(|&i| all_columns[i].clone()).collect();

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let line = line.map_err(|source| LoaderError::Io {
            file: file_name.to_string(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(|f| f.trim()).collect();
        if fields.len() != all_columns.len() {
            return Err(LoaderError::RowLength {
                line: line_no + 2,
                expected: all_columns.len(),
                found: fields.len(),
            });
        }
        let mut row = Vec::with_capacity(oxide_idx.len());
        for (&i, column) in oxide_idx.iter().zip(columns.iter()) {
            let value: f64 = fields[i].parse().map_err(|_| LoaderError::BadNumber {
                line: line_no + 2,
                column: column.clone(),
                value: fields[i].to_string(),
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    if rows.is_empty() {
        warn!("composition file '{}' contains no data rows", file_name);
    } else {
        info!(
            "loaded {} samples with {} oxide columns from '{}'",
            rows.len(),
            columns.len(),
            file_name
        );
    }

    Ok(CompositionTable::from_rows(columns, &rows)?)
}
