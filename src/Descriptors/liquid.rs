//! # Liquid Descriptor Module
//!
//! Entropy-like descriptors computed directly from the (row-normalized)
//! composition fractions, with no reference weighting involved:
//! - phase disorder: sum of x ln x per row, with 0 ln 0 = 0; the raw
//!   (negative-or-zero) sum is kept, negation is an explicit option
//! - sd: population standard deviation over the nonzero entries of each row
//! - p-norms of the full row vector, one column per requested order

use super::composition::CompositionTable;
use super::property_stats::DescriptorTable;
use nalgebra::DMatrix;

/// Descriptors of compositional heterogeneity of the liquid phase.
#[derive(Debug, Clone)]
pub struct LiquidDescriptor {
    pub data: CompositionTable,
}

impl LiquidDescriptor {
    pub fn new(data: CompositionTable) -> Self {
        LiquidDescriptor { data }
    }

    /// Phase disorder per row: sum_k x_k ln(x_k), zero entries contributing
    /// nothing. With `negate = false` the raw sum (always <= 0) is returned;
    /// `negate = true` gives conventional mixing entropy.
    pub fn phase_disorder(&self, negate: bool) -> DescriptorTable {
        let nrows = self.data.nrows();
        let mut out = DMatrix::zeros(nrows, 1);
        let sign = if negate { -1.0 } else { 1.0 };
        for i in 0..nrows {
            let mut acc = 0.0;
            for j in 0..self.data.ncols() {
                let x = self.data.data[(i, j)];
                if x != 0.0 {
                    acc += x * x.ln();
                }
            }
            out[(i, 0)] = sign * acc;
        }
        DescriptorTable {
            columns: vec!["phase_disorder".to_string()],
            data: out,
        }
    }

    /// Population standard deviation over the nonzero entries of each row;
    /// zero-valued oxides are excluded. A row with no nonzero entry (not
    /// reachable from normalized tables) yields 0.
    pub fn sd(&self) -> DescriptorTable {
        let nrows = self.data.nrows();
        let mut out = DMatrix::zeros(nrows, 1);
        for i in 0..nrows {
            let nonzero: Vec<f64> = self
                .data
                .data
                .row(i)
                .iter()
                .copied()
                .filter(|&x| x != 0.0)
                .collect();
            if nonzero.is_empty() {
                continue;
            }
            let n = nonzero.len() as f64;
            let mean = nonzero.iter().sum::<f64>() / n;
            let var = nonzero.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
            out[(i, 0)] = var.sqrt();
        }
        DescriptorTable {
            columns: vec!["sd_liquid".to_string()],
            data: out,
        }
    }

    /// p-norm of the full row vector (zeros included) for every requested
    /// order; columns are named L1, L2, ... after the order value.
    pub fn norms(&self, orders: &[f64]) -> DescriptorTable {
        let nrows = self.data.nrows();
        let mut out = DMatrix::zeros(nrows, orders.len());
        for (k, &order) in orders.iter().enumerate() {
            for i in 0..nrows {
                let row = self.data.data.row(i);
                out[(i, k)] = if order.is_infinite() {
                    row.iter().fold(0.0f64, |m, x| m.max(x.abs()))
                } else {
                    row.iter()
                        .map(|x| x.abs().powf(order))
                        .sum::<f64>()
                        .powf(1.0 / order)
                };
            }
        }
        let columns = orders.iter().map(|o| format!("L{}", o)).collect();
        DescriptorTable { columns, data: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn table(rows: &[Vec<f64>]) -> CompositionTable {
        CompositionTable::from_rows(names(&["CaO", "MgO", "SiO2"]), rows).unwrap()
    }

    #[test]
    fn test_phase_disorder_sign_convention() {
        let liquid = LiquidDescriptor::new(table(&[vec![0.5, 0.5, 0.0]]));
        let disorder = liquid.phase_disorder(false);
        // 2 * 0.5 ln 0.5, kept negative by design
        assert_relative_eq!(disorder.data[(0, 0)], (0.5f64).ln(), epsilon = 1e-12);
        let negated = liquid.phase_disorder(true);
        assert_relative_eq!(negated.data[(0, 0)], -(0.5f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_single_component_has_zero_disorder() {
        let liquid = LiquidDescriptor::new(table(&[vec![0.0, 1.0, 0.0]]));
        assert_eq!(liquid.phase_disorder(false).data[(0, 0)], 0.0);
    }

    #[test]
    fn test_sd_skips_zero_entries() {
        let liquid = LiquidDescriptor::new(table(&[vec![0.25, 0.75, 0.0]]));
        // population std of [0.25, 0.75]
        assert_relative_eq!(liquid.sd().data[(0, 0)], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_norms() {
        let liquid = LiquidDescriptor::new(table(&[vec![0.25, 0.25, 0.5]]));
        let norms = liquid.norms(&[1.0, 2.0]);
        assert_eq!(norms.columns, names(&["L1", "L2"]));
        assert_relative_eq!(norms.data[(0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            norms.data[(0, 1)],
            (0.25f64 * 0.25 + 0.25 * 0.25 + 0.5 * 0.5).sqrt(),
            epsilon = 1e-12
        );
    }
}
