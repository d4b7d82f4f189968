//! # Reference Table Module
//!
//! ## Purpose
//! Builds the reference side of the descriptor pipeline from raw material
//! records (as fetched from the materials database or loaded from disk):
//! - de-duplicates formulas, keeping the lowest-formation-energy polymorph
//! - filters out formulas that are not charge-balanced oxide mixtures
//! - derives the oxide composition of every kept record via the formula
//!   parser and the oxide schema
//! - exposes formation energies and property columns under canonical names
//!   (formation_energy, band_gap, atom_volume, density, G, K)

use crate::Descriptors::composition::{CompositionError, CompositionTable};
use crate::Descriptors::formula_parser::{FormulaError, parse_formula};
use crate::Descriptors::property_stats::PropertyTable;
use crate::Materials::oxide::{OxideError, OxideSchema};
use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("unknown property '{0}'")]
    UnknownProperty(String),
    #[error("reference table is empty after de-duplication and charge-balance filtering")]
    Empty,
    #[error(transparent)]
    Oxide(#[from] OxideError),
    #[error(transparent)]
    Formula(#[from] FormulaError),
    #[error(transparent)]
    Composition(#[from] CompositionError),
}

/// One raw row of the materials database, before cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialRecord {
    pub material_id: String,
    pub formula: String,
    pub formation_energy: f64,
    pub band_gap: f64,
    pub density: f64,
    pub volume: f64,
    pub nsites: usize,
    pub g_modulus: f64,
    pub k_modulus: f64,
}

/// One cleaned reference compound with its scalar properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub material_id: String,
    pub formula: String,
    pub formation_energy: f64,
    pub band_gap: f64,
    pub atom_volume: f64,
    pub density: f64,
    pub g_modulus: f64,
    pub k_modulus: f64,
}

impl ReferenceRecord {
    /// Property value under its canonical name.
    pub fn property(&self, name: &str) -> Option<f64> {
        match name {
            "formation_energy" => Some(self.formation_energy),
            "band_gap" => Some(self.band_gap),
            "atom_volume" => Some(self.atom_volume),
            "density" => Some(self.density),
            "G" => Some(self.g_modulus),
            "K" => Some(self.k_modulus),
            _ => None,
        }
    }
}

/// Maps the long property names of the raw database export onto the short
/// canonical names used throughout the pipeline; canonical names pass
/// through unchanged.
pub fn canonical_property_name(name: &str) -> Option<&'static str> {
    match name {
        "Formation Energy (eV)" | "formation_energy" => Some("formation_energy"),
        "Band Gap (eV)" | "band_gap" => Some("band_gap"),
        "Atomic volume" | "atom_volume" => Some("atom_volume"),
        "Density (gm/cc)" | "density" => Some("density"),
        "G (GPa)" | "G" => Some("G"),
        "K (GPa)" | "K" => Some("K"),
        _ => None,
    }
}

/// Reference compounds with their oxide compositions, rows aligned between
/// `records` and `composition`. The composition holds raw oxide amounts; the
/// pipeline normalizes them over the query table's column subset.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    pub records: Vec<ReferenceRecord>,
    pub composition: CompositionTable,
}

impl ReferenceTable {
    /// Cleans raw records into a reference table over the given oxide
    /// schema. Duplicate formulas keep the record with minimum formation
    /// energy; formulas that are not charge-balanced oxide mixtures are
    /// dropped with a warning. A formula with an element outside the schema
    /// is a parse error.
    pub fn build(
        records: &[MaterialRecord],
        schema: &OxideSchema,
    ) -> Result<Self, ReferenceError> {
        // lowest-energy polymorph wins; first-seen order is preserved
        let mut kept: Vec<MaterialRecord> = Vec::new();
        for record in records {
            match kept.iter_mut().find(|r| r.formula == record.formula) {
                Some(existing) => {
                    if record.formation_energy < existing.formation_energy {
                        *existing = record.clone();
                    }
                }
                None => kept.push(record.clone()),
            }
        }

        let tracked_owned = schema.tracked_elements();
        let tracked: Vec<&str> = tracked_owned.iter().map(|s| s.as_str()).collect();

        let mut clean: Vec<ReferenceRecord> = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut unbalanced = 0usize;
        for record in kept {
            let counts = parse_formula(&record.formula, &tracked)?;
            if !schema.is_charge_balanced(&counts) {
                unbalanced += 1;
                continue;
            }
            rows.push(schema.oxide_amounts(&counts));
            clean.push(ReferenceRecord {
                material_id: record.material_id,
                formula: record.formula,
                formation_energy: record.formation_energy,
                band_gap: record.band_gap,
                atom_volume: record.volume / record.nsites as f64,
                density: record.density,
                g_modulus: record.g_modulus,
                k_modulus: record.k_modulus,
            });
        }
        if unbalanced > 0 {
            warn!(
                "dropped {} formulas that are not charge-balanced oxide mixtures",
                unbalanced
            );
        }
        if clean.is_empty() {
            return Err(ReferenceError::Empty);
        }
        info!(
            "reference table: {} unique compounds over {} oxides",
            clean.len(),
            schema.oxides.len()
        );

        let composition = CompositionTable::from_rows(schema.names(), &rows)?;
        Ok(ReferenceTable {
            records: clean,
            composition,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn formulas(&self) -> Vec<String> {
        self.records.iter().map(|r| r.formula.clone()).collect()
    }

    /// Formation energy column, one entry per compound.
    pub fn energies(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.records.len(),
            self.records.iter().map(|r| r.formation_energy),
        )
    }

    /// Extracts the requested property columns (canonical or long names)
    /// into a property table, rows aligned with the reference compounds.
    pub fn property_table(&self, names: &[&str]) -> Result<PropertyTable, ReferenceError> {
        let mut canonical: Vec<&'static str> = Vec::with_capacity(names.len());
        for name in names {
            canonical.push(
                canonical_property_name(name)
                    .ok_or_else(|| ReferenceError::UnknownProperty(name.to_string()))?,
            );
        }
        let mut data = DMatrix::zeros(self.records.len(), canonical.len());
        for (i, record) in self.records.iter().enumerate() {
            for (k, name) in canonical.iter().enumerate() {
                // canonicalization above guarantees the lookup succeeds
                data[(i, k)] = record.property(name).unwrap_or(f64::NAN);
            }
        }
        Ok(PropertyTable {
            properties: canonical.iter().map(|s| s.to_string()).collect(),
            data,
        })
    }
}
