//! # Property Statistics Module
//!
//! ## Purpose
//! Constructs descriptors associated with reference compound properties.
//! Four statistics per property and data row: weighted mean, weighted
//! standard deviation, weighted absolute deviation and the property value of
//! the compound holding the largest weight.
//!
//! ## Preconditions
//! The weight table must carry one column per reference compound, i.e. its
//! column count must equal the property table's row count; a mismatch is a
//! fatal configuration error raised before any computation.

use super::weights::WeightTable;
use nalgebra::DMatrix;
use prettytable::{Cell, Row, Table};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error(
        "weight table has {weight_cols} compounds but the property table has {property_rows} rows"
    )]
    ShapeMismatch {
        weight_cols: usize,
        property_rows: usize,
    },
    #[error("cannot concatenate descriptor tables with {left} and {right} rows")]
    RowCount { left: usize, right: usize },
}

/// Property table: rows are reference compounds (same order as the weight
/// table's columns), columns are named scalar properties.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTable {
    pub properties: Vec<String>,
    pub data: DMatrix<f64>,
}

/// Named descriptor columns over the query rows; blocks produced by the
/// engines below are concatenated into one table per query set.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorTable {
    pub columns: Vec<String>,
    pub data: DMatrix<f64>,
}

impl DescriptorTable {
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    /// Concatenates descriptor blocks column-wise; all blocks must cover the
    /// same query rows.
    pub fn hconcat(blocks: &[DescriptorTable]) -> Result<DescriptorTable, StatsError> {
        let nrows = blocks.first().map(|b| b.nrows()).unwrap_or(0);
        let mut columns = Vec::new();
        for block in blocks {
            if block.nrows() != nrows {
                return Err(StatsError::RowCount {
                    left: nrows,
                    right: block.nrows(),
                });
            }
            columns.extend(block.columns.iter().cloned());
        }
        let ncols = columns.len();
        let mut data = DMatrix::zeros(nrows, ncols);
        let mut offset = 0;
        for block in blocks {
            for j in 0..block.data.ncols() {
                data.set_column(offset + j, &block.data.column(j));
            }
            offset += block.data.ncols();
        }
        Ok(DescriptorTable { columns, data })
    }

    /// Prints the table with prettytable, one row per query sample.
    pub fn pretty_print(&self) {
        let mut table = Table::new();
        let mut header = vec![Cell::new("row")];
        header.extend(self.columns.iter().map(|c| Cell::new(c)));
        table.add_row(Row::new(header));
        for i in 0..self.data.nrows() {
            let mut cells = vec![Cell::new(&i.to_string())];
            for j in 0..self.data.ncols() {
                cells.push(Cell::new(&format!("{:.6}", self.data[(i, j)])));
            }
            table.add_row(Row::new(cells));
        }
        table.printstd();
    }
}

/// Weighted descriptor engine over one property table and one weight table.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    property: PropertyTable,
    weight: WeightTable,
}

impl PropertyDescriptor {
    pub fn new(property: PropertyTable, weight: WeightTable) -> Result<Self, StatsError> {
        if property.data.nrows() != weight.data.ncols() {
            return Err(StatsError::ShapeMismatch {
                weight_cols: weight.data.ncols(),
                property_rows: property.data.nrows(),
            });
        }
        Ok(PropertyDescriptor { property, weight })
    }

    fn block(&self, prefix: &str, data: DMatrix<f64>) -> DescriptorTable {
        let columns = self
            .property
            .properties
            .iter()
            .map(|p| format!("{}{}", prefix, p))
            .collect();
        DescriptorTable { columns, data }
    }

    fn mean_mat(&self) -> DMatrix<f64> {
        &self.weight.data * &self.property.data
    }

    /// Weighted average of every property per data row.
    pub fn mean(&self) -> DescriptorTable {
        self.block("mean_", self.mean_mat())
    }

    /// Weighted standard deviation: sqrt(sum_j w_j (p_j - mean)^2).
    pub fn sd(&self) -> DescriptorTable {
        let mean = self.mean_mat();
        let (n_data, n_property) = mean.shape();
        let mut sd = DMatrix::zeros(n_data, n_property);
        for i in 0..n_data {
            for k in 0..n_property {
                let mut acc = 0.0;
                for j in 0..self.property.data.nrows() {
                    let dev = self.property.data[(j, k)] - mean[(i, k)];
                    acc += self.weight.data[(i, j)] * dev * dev;
                }
                sd[(i, k)] = acc.sqrt();
            }
        }
        self.block("sd_", sd)
    }

    /// Weighted mean absolute deviation: sum_j w_j |p_j - mean|.
    pub fn ad(&self) -> DescriptorTable {
        let mean = self.mean_mat();
        let (n_data, n_property) = mean.shape();
        let mut ad = DMatrix::zeros(n_data, n_property);
        for i in 0..n_data {
            for k in 0..n_property {
                let mut acc = 0.0;
                for j in 0..self.property.data.nrows() {
                    acc += self.weight.data[(i, j)]
                        * (self.property.data[(j, k)] - mean[(i, k)]).abs();
                }
                ad[(i, k)] = acc;
            }
        }
        self.block("ad_", ad)
    }

    /// Properties of the compound with the largest weight in each row; ties
    /// keep the first compound in reference order.
    pub fn max(&self) -> DescriptorTable {
        let n_data = self.weight.data.nrows();
        let n_property = self.property.data.ncols();
        let mut max_mat = DMatrix::zeros(n_data, n_property);
        for i in 0..n_data {
            let mut best = 0;
            for j in 1..self.weight.data.ncols() {
                if self.weight.data[(i, j)] > self.weight.data[(i, best)] {
                    best = j;
                }
            }
            for k in 0..n_property {
                max_mat[(i, k)] = self.property.data[(best, k)];
            }
        }
        self.block("max_", max_mat)
    }

    /// All four statistic blocks concatenated: mean, sd, ad, max.
    pub fn descriptor_table(&self) -> Result<DescriptorTable, StatsError> {
        DescriptorTable::hconcat(&[self.mean(), self.sd(), self.ad(), self.max()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn property_table() -> PropertyTable {
        PropertyTable {
            properties: names(&["formation_energy", "density"]),
            data: DMatrix::from_row_slice(3, 2, &[-3.0, 2.5, -1.0, 3.5, -2.0, 3.0]),
        }
    }

    fn weight_table(rows: usize, weights: &[f64]) -> WeightTable {
        WeightTable {
            compounds: names(&["CaO", "MgO", "SiO2"]),
            data: DMatrix::from_row_slice(rows, 3, weights),
        }
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let weight = WeightTable {
            compounds: names(&["CaO", "MgO"]),
            data: DMatrix::from_row_slice(1, 2, &[0.5, 0.5]),
        };
        let err = PropertyDescriptor::new(property_table(), weight).unwrap_err();
        assert_eq!(
            err,
            StatsError::ShapeMismatch {
                weight_cols: 2,
                property_rows: 3
            }
        );
    }

    #[test]
    fn test_weighted_mean() {
        let descriptor =
            PropertyDescriptor::new(property_table(), weight_table(1, &[0.5, 0.25, 0.25]))
                .unwrap();
        let mean = descriptor.mean();
        assert_eq!(mean.columns, names(&["mean_formation_energy", "mean_density"]));
        assert_relative_eq!(mean.data[(0, 0)], -2.25, epsilon = 1e-12);
        assert_relative_eq!(mean.data[(0, 1)], 2.875, epsilon = 1e-12);
    }

    #[test]
    fn test_one_hot_weights_collapse_to_compound_values() {
        let descriptor =
            PropertyDescriptor::new(property_table(), weight_table(1, &[0.0, 1.0, 0.0]))
                .unwrap();
        let mean = descriptor.mean();
        let sd = descriptor.sd();
        let ad = descriptor.ad();
        let max = descriptor.max();
        assert_relative_eq!(mean.data[(0, 0)], -1.0);
        assert_relative_eq!(mean.data[(0, 1)], 3.5);
        assert_relative_eq!(sd.data[(0, 0)], 0.0);
        assert_relative_eq!(sd.data[(0, 1)], 0.0);
        assert_relative_eq!(ad.data[(0, 0)], 0.0);
        assert_relative_eq!(ad.data[(0, 1)], 0.0);
        assert_relative_eq!(max.data[(0, 0)], -1.0);
        assert_relative_eq!(max.data[(0, 1)], 3.5);
    }

    #[test]
    fn test_sd_and_ad_hand_computed() {
        // two compounds, one property, equal weights
        let property = PropertyTable {
            properties: names(&["band_gap"]),
            data: DMatrix::from_row_slice(2, 1, &[1.0, 3.0]),
        };
        let weight = WeightTable {
            compounds: names(&["CaO", "MgO"]),
            data: DMatrix::from_row_slice(1, 2, &[0.5, 0.5]),
        };
        let descriptor = PropertyDescriptor::new(property, weight).unwrap();
        // mean 2, deviations +-1: sd = sqrt(0.5 + 0.5) = 1, ad = 1
        assert_relative_eq!(descriptor.sd().data[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(descriptor.ad().data[(0, 0)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_max_tie_breaks_on_first_compound() {
        let descriptor =
            PropertyDescriptor::new(property_table(), weight_table(1, &[0.4, 0.2, 0.4]))
                .unwrap();
        let max = descriptor.max();
        // compounds 0 and 2 tie; first occurrence wins
        assert_relative_eq!(max.data[(0, 0)], -3.0);
    }

    #[test]
    fn test_descriptor_table_concatenates_all_blocks() {
        let descriptor =
            PropertyDescriptor::new(property_table(), weight_table(2, &[0.5, 0.25, 0.25, 0.0, 1.0, 0.0]))
                .unwrap();
        let table = descriptor.descriptor_table().unwrap();
        assert_eq!(table.data.nrows(), 2);
        assert_eq!(table.data.ncols(), 8);
        assert_eq!(table.columns[0], "mean_formation_energy");
        assert_eq!(table.columns[7], "max_density");
    }
}
