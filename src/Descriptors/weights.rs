//! # Kernel Weighting Module
//!
//! ## Purpose
//! Turns one row of composition distances plus the reference formation
//! energies into a vector of weighting factors over the reference compounds:
//! close compounds with relevant (large-|energy|) formation energies get
//! weights near 1, far compounds decay with a Gaussian-shaped kernel.
//!
//! ## Algorithm (per data row)
//! 1. keep only reference entries with a finite distance
//! 2. min-max scale the kept distances and the kept |energies| to [0, 1]
//! 3. fraction = scaled_distance / (scaled_energy + intercept)
//! 4. weight = exp(-(fraction / width)^2)
//! 5. optionally keep only the top-K largest weights (zeroing the rest)
//!    before normalization
//! 6. optionally rescale the kept weights to sum to 1
//!
//! A constant kept vector (min == max) has no min-max image and is raised as
//! a degenerate-input error rather than dividing by zero.

use super::distance::DistanceTable;
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("zero range while scaling {quantity} for data row {row}: min == max")]
    ZeroRange { quantity: &'static str, row: usize },
    #[error("no finite distances for data row {row}")]
    NoFiniteDistances { row: usize },
    #[error("kernel weights for data row {row} sum to zero; width too small")]
    ZeroWeightSum { row: usize },
    #[error(
        "distance table has {dist_cols} compounds but the energy vector has {energy_len} entries"
    )]
    EnergyLength { dist_cols: usize, energy_len: usize },
}

/// Tunable parameters of the weighting kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelConfig {
    /// Bandwidth of the Gaussian kernel.
    pub width: f64,
    /// Additive offset keeping the distance/energy ratio finite near zero
    /// scaled energy.
    pub intercept: f64,
    /// Keep only the `top` largest weights per row, zeroing the rest before
    /// normalization. `None` keeps the full reference set.
    pub top: Option<usize>,
    /// Rescale each weight row to sum to 1.
    pub normalized: bool,
}

impl KernelConfig {
    pub fn new(width: f64, intercept: f64) -> Self {
        KernelConfig {
            width,
            intercept,
            top: None,
            normalized: true,
        }
    }
}

/// Weight table: rows are query samples, columns are reference compounds
/// (same column order as the distance table it came from).
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    pub compounds: Vec<String>,
    pub data: DMatrix<f64>,
}

fn min_max_scaled(values: &[f64], quantity: &'static str, row: usize) -> Result<Vec<f64>, WeightError> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 || !range.is_finite() {
        return Err(WeightError::ZeroRange { quantity, row });
    }
    Ok(values.iter().map(|v| (v - min) / range).collect())
}

/// Weighting factors for one data row. `energy` holds one formation energy
/// per reference compound and `dist` one distance per compound; compounds
/// whose distance is not finite get weight 0. `row` only labels errors.
pub fn create_weights(
    energy: &DVector<f64>,
    dist: &[f64],
    config: &KernelConfig,
    row: usize,
) -> Result<DVector<f64>, WeightError> {
    if energy.len() != dist.len() {
        return Err(WeightError::EnergyLength {
            dist_cols: dist.len(),
            energy_len: energy.len(),
        });
    }

    let kept: Vec<usize> = (0..dist.len()).filter(|&j| dist[j].is_finite()).collect();
    if kept.is_empty() {
        return Err(WeightError::NoFiniteDistances { row });
    }

    let d: Vec<f64> = kept.iter().map(|&j| dist[j]).collect();
    let h: Vec<f64> = kept.iter().map(|&j| energy[j].abs()).collect();
    let norm_d = min_max_scaled(&d, "distances", row)?;
    let norm_h = min_max_scaled(&h, "energies", row)?;

    let mut raw: Vec<f64> = norm_d
        .iter()
        .zip(norm_h.iter())
        .map(|(nd, nh)| {
            let fraction = nd / (nh + config.intercept);
            (-(fraction / config.width).powi(2)).exp()
        })
        .collect();

    // top-K pruning: zero everything below the K-th largest weight; a stable
    // sort keeps the first occurrence on ties
    if let Some(top) = config.top {
        if top < raw.len() {
            let mut order: Vec<usize> = (0..raw.len()).collect();
            order.sort_by(|&a, &b| raw[b].partial_cmp(&raw[a]).unwrap_or(std::cmp::Ordering::Equal));
            for &idx in &order[top..] {
                raw[idx] = 0.0;
            }
        }
    }

    if config.normalized {
        let sum: f64 = raw.iter().sum();
        if sum == 0.0 {
            return Err(WeightError::ZeroWeightSum { row });
        }
        for w in raw.iter_mut() {
            *w /= sum;
        }
    }

    let mut weights = DVector::zeros(dist.len());
    for (slot, &j) in kept.iter().enumerate() {
        weights[j] = raw[slot];
    }
    Ok(weights)
}

/// Applies `create_weights` to every row of the distance table.
pub fn create_weight_table(
    dist: &DistanceTable,
    energy: &DVector<f64>,
    config: &KernelConfig,
) -> Result<WeightTable, WeightError> {
    let n_data = dist.data.nrows();
    let n_solid = dist.data.ncols();
    let mut weight_mat = DMatrix::zeros(n_data, n_solid);
    for i in 0..n_data {
        let dist_row: Vec<f64> = dist.data.row(i).iter().copied().collect();
        let weights = create_weights(energy, &dist_row, config, i)?;
        weight_mat.set_row(i, &weights.transpose());
    }
    Ok(WeightTable {
        compounds: dist.compounds.clone(),
        data: weight_mat,
    })
}
