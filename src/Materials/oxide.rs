//! # Oxide Module
//!
//! ## Purpose
//! The descriptor pipeline expresses every solid compound as amounts of
//! basic oxides (CaO, MgO, Al2O3, SiO2, Na2O, K2O, ...). This module parses
//! the oxide names themselves to recover the cation/oxygen stoichiometry, so
//! the conversion divisors (2 cations in Al2O3, 1.5 oxygens per Al, ...) are
//! derived instead of hard-coded, and provides:
//! - element counts -> per-oxide amounts (count / cation multiplicity)
//! - the oxygen charge-balance check selecting pure oxide mixtures

use crate::Descriptors::formula_parser::{ElementCounts, FormulaError, count_atoms};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum OxideError {
    #[error("'{0}' is not a binary oxide formula (one cation element plus O)")]
    NotAnOxide(String),
    #[error("duplicate cation element '{element}' between oxides '{first}' and '{second}'")]
    DuplicateCation {
        element: String,
        first: String,
        second: String,
    },
    #[error(transparent)]
    Formula(#[from] FormulaError),
}

/// One basic oxide: its formula name, cation element and stoichiometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oxide {
    pub name: String,
    pub element: String,
    pub cations: usize,
    pub oxygens: usize,
}

impl Oxide {
    /// Parses an oxide name such as "Al2O3" into element "Al", 2 cations,
    /// 3 oxygens. Anything but one cation element plus oxygen is rejected.
    pub fn from_name(name: &str) -> Result<Self, OxideError> {
        let counts = count_atoms(name)?;
        let oxygens = match counts.get("O") {
            Some(&n) if n > 0 => n,
            _ => return Err(OxideError::NotAnOxide(name.to_string())),
        };
        let cations: Vec<(&String, &usize)> =
            counts.iter().filter(|(e, _)| e.as_str() != "O").collect();
        match cations.as_slice() {
            &[(ref element, &n)] if n > 0 => Ok(Oxide {
                name: name.to_string(),
                element: (*element).clone(),
                cations: n,
                oxygens,
            }),
            _ => Err(OxideError::NotAnOxide(name.to_string())),
        }
    }

    /// Oxygens contributed per single cation atom, e.g. 1.5 for Al2O3.
    pub fn oxygens_per_cation(&self) -> f64 {
        self.oxygens as f64 / self.cations as f64
    }
}

/// Ordered set of basic oxides sharing one composition column schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OxideSchema {
    pub oxides: Vec<Oxide>,
}

impl OxideSchema {
    pub fn from_names(names: &[&str]) -> Result<Self, OxideError> {
        let mut oxides: Vec<Oxide> = Vec::with_capacity(names.len());
        for name in names {
            let oxide = Oxide::from_name(name)?;
            if let Some(clash) = oxides.iter().find(|o| o.element == oxide.element) {
                return Err(OxideError::DuplicateCation {
                    element: oxide.element.clone(),
                    first: clash.name.clone(),
                    second: oxide.name.clone(),
                });
            }
            oxides.push(oxide);
        }
        Ok(OxideSchema { oxides })
    }

    pub fn names(&self) -> Vec<String> {
        self.oxides.iter().map(|o| o.name.clone()).collect()
    }

    /// Cation elements plus oxygen, the tracked set for formula parsing.
    pub fn tracked_elements(&self) -> Vec<String> {
        let mut elements: Vec<String> =
            self.oxides.iter().map(|o| o.element.clone()).collect();
        elements.push("O".to_string());
        elements
    }

    /// Converts element counts into per-oxide amounts: the cation count of a
    /// formula divided by the oxide's cation multiplicity (2 Al atoms make
    /// one Al2O3 unit).
    pub fn oxide_amounts(&self, counts: &ElementCounts) -> Vec<f64> {
        self.oxides
            .iter()
            .map(|o| {
                let atoms = counts.get(&o.element).copied().unwrap_or(0);
                atoms as f64 / o.cations as f64
            })
            .collect()
    }

    /// A formula is charge balanced when the oxygens demanded by its cations
    /// exactly match its oxygen count, i.e. it is a pure mixture of the
    /// schema's oxides.
    pub fn is_charge_balanced(&self, counts: &ElementCounts) -> bool {
        let demanded: f64 = self
            .oxides
            .iter()
            .map(|o| {
                let atoms = counts.get(&o.element).copied().unwrap_or(0);
                atoms as f64 * o.oxygens_per_cation()
            })
            .sum();
        let oxygens = counts.get("O").copied().unwrap_or(0) as f64;
        demanded == oxygens
    }
}
