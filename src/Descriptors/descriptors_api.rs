//! # Descriptors API Module
//!
//! ## Purpose
//! The main pipeline tying the stages together: it takes the raw query
//! composition table and the reference compound table, normalizes both over
//! the query's oxide columns, optionally applies the sphere transform, caches
//! the distance table, and produces weight, property-descriptor, entropy and
//! concatenated feature tables.
//!
//! All tables are immutable snapshots; every operation is a deterministic
//! function of the pipeline state and its arguments, so recomputation is
//! idempotent.

use super::composition::{Axis, CompositionError, CompositionTable};
use super::distance::{DistanceTable, create_dist_table};
use super::liquid::LiquidDescriptor;
use super::property_stats::{DescriptorTable, PropertyDescriptor, StatsError};
use super::weights::{KernelConfig, WeightError, WeightTable, create_weight_table};
use crate::Materials::reference::{ReferenceError, ReferenceTable};
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error(transparent)]
    Composition(#[from] CompositionError),
    #[error(transparent)]
    Weight(#[from] WeightError),
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Descriptor pipeline over one query composition table and one reference
/// compound table sharing the query's oxide column schema.
#[derive(Debug, Clone)]
pub struct GlassDescriptors {
    /// Row-normalized oxide fractions of the query samples (pre-transform);
    /// the entropy descriptors read this table.
    pub raw_data: CompositionTable,
    /// Coordinates the distances are computed in: equal to `raw_data`, or
    /// its sphere transform when `transform` was requested.
    pub data: CompositionTable,
    pub reference: ReferenceTable,
    pub dist: DistanceTable,
}

impl GlassDescriptors {
    /// Builds the pipeline: row-normalizes the query table, aligns and
    /// row-normalizes the reference compositions over the query's columns,
    /// optionally sphere-transforms both, and computes the distance table.
    pub fn new(
        data_table: CompositionTable,
        reference: ReferenceTable,
        transform: bool,
    ) -> Result<Self, DescriptorError> {
        let raw_data = data_table.normalize(Axis::Row)?;
        let ref_comp = reference
            .composition
            .select(&raw_data.columns)?
            .normalize(Axis::Row)?;

        let (data, ref_comp) = if transform {
            (raw_data.sphere_transform(), ref_comp.sphere_transform())
        } else {
            (raw_data.clone(), ref_comp)
        };

        let dist = create_dist_table(&data, &ref_comp, &reference.formulas())?;
        info!(
            "descriptor pipeline: {} samples x {} reference compounds",
            dist.data.nrows(),
            dist.data.ncols()
        );
        Ok(GlassDescriptors {
            raw_data,
            data,
            reference,
            dist,
        })
    }

    /// Kernel weight table for the given parameters.
    pub fn weight_table(&self, config: &KernelConfig) -> Result<WeightTable, DescriptorError> {
        let weights = create_weight_table(&self.dist, &self.reference.energies(), config)?;
        Ok(weights)
    }

    /// Weighted mean/sd/ad/max descriptor blocks for the requested reference
    /// properties.
    pub fn property_table(
        &self,
        property_names: &[&str],
        config: &KernelConfig,
    ) -> Result<DescriptorTable, DescriptorError> {
        let weight = self.weight_table(config)?;
        let property = self.reference.property_table(property_names)?;
        let descriptor = PropertyDescriptor::new(property, weight)?;
        Ok(descriptor.descriptor_table()?)
    }

    /// Phase-disorder column from the normalized (pre-transform) query
    /// compositions.
    pub fn entropy_table(&self, negate: bool) -> DescriptorTable {
        LiquidDescriptor::new(self.raw_data.clone()).phase_disorder(negate)
    }

    /// Entropy plus property descriptor blocks concatenated into one feature
    /// table per query row.
    pub fn feature_table(
        &self,
        property_names: &[&str],
        config: &KernelConfig,
        negate_entropy: bool,
    ) -> Result<DescriptorTable, DescriptorError> {
        let entropy = self.entropy_table(negate_entropy);
        let properties = self.property_table(property_names, config)?;
        Ok(DescriptorTable::hconcat(&[entropy, properties])?)
    }
}
