//! # Distance Module
//!
//! Computes the table of Euclidean distances between every query composition
//! row and every reference compound row, restricted to the query table's
//! column schema. A pure function of its two inputs, O(n_data * n_solid *
//! n_base).

use super::composition::{CompositionError, CompositionTable};
use nalgebra::DMatrix;

/// Distance table: rows are query samples, columns are reference compounds
/// (labeled by formula), entries are L2 distances in composition space.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    pub compounds: Vec<String>,
    pub data: DMatrix<f64>,
}

/// Computes the n_data x n_solid distance table. `info` must contain every
/// column of `data` (shared oxide schema); a missing column is a schema
/// error.
pub fn create_dist_table(
    data: &CompositionTable,
    info: &CompositionTable,
    compounds: &[String],
) -> Result<DistanceTable, CompositionError> {
    let info = info.select(&data.columns)?;
    let n_data = data.nrows();
    let n_solid = info.nrows();

    let mut dist = DMatrix::zeros(n_data, n_solid);
    for i in 0..n_data {
        for j in 0..n_solid {
            let delta = data.data.row(i) - info.data.row(j);
            dist[(i, j)] = delta.norm();
        }
    }
    Ok(DistanceTable {
        compounds: compounds.to_vec(),
        data: dist,
    })
}
