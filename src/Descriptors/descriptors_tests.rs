///////////////////////TESTS////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::Descriptors::composition::CompositionTable;
    use crate::Descriptors::descriptors_api::GlassDescriptors;
    use crate::Descriptors::weights::KernelConfig;
    use crate::Materials::oxide::OxideSchema;
    use crate::Materials::reference::{MaterialRecord, ReferenceTable};
    use approx::assert_relative_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn record(formula: &str, formation_energy: f64, band_gap: f64, density: f64) -> MaterialRecord {
        MaterialRecord {
            material_id: format!("mp-{}", formula),
            formula: formula.to_string(),
            formation_energy,
            band_gap,
            density,
            volume: 100.0,
            nsites: 10,
            g_modulus: 40.0,
            k_modulus: 80.0,
        }
    }

    // CaO, MgO and the double oxide CaMgO2, all charge balanced
    fn binary_reference() -> ReferenceTable {
        let schema = OxideSchema::from_names(&["CaO", "MgO", "SiO2"]).unwrap();
        let records = vec![
            record("CaO", -3.2, 5.2, 3.3),
            record("MgO", -2.8, 6.1, 3.6),
            record("CaMgO2", -3.0, 4.7, 3.4),
        ];
        ReferenceTable::build(&records, &schema).unwrap()
    }

    fn silicate_reference() -> ReferenceTable {
        let schema = OxideSchema::from_names(&["CaO", "MgO", "SiO2"]).unwrap();
        let records = vec![
            record("CaSiO3", -3.1, 5.0, 2.9),
            record("MgSiO3", -2.9, 5.5, 3.2),
            record("CaMgSi2O6", -3.3, 4.8, 3.3),
            record("SiO2", -3.0, 5.7, 2.6),
        ];
        ReferenceTable::build(&records, &schema).unwrap()
    }

    #[test]
    fn test_end_to_end_distance_scenario() {
        // query [CaO 0.5, MgO 0.5] vs. pure CaO: sqrt(0.5^2 + 0.5^2)
        let data =
            CompositionTable::from_rows(names(&["CaO", "MgO"]), &[vec![0.5, 0.5]]).unwrap();
        let gd = GlassDescriptors::new(data, binary_reference(), false).unwrap();
        assert_eq!(gd.dist.compounds[0], "CaO");
        assert_relative_eq!(gd.dist.data[(0, 0)], (0.5f64).hypot(0.5), epsilon = 1e-12);
        // the 50/50 double oxide coincides with the query point
        assert_eq!(gd.dist.data[(0, 2)], 0.0);
    }

    #[test]
    fn test_weight_rows_are_normalized_and_peak_at_self() {
        // diopside composition: CaO 1, MgO 1, SiO2 2 -> [0.25, 0.25, 0.5]
        let data = CompositionTable::from_rows(
            names(&["CaO", "MgO", "SiO2"]),
            &[vec![0.25, 0.25, 0.5], vec![0.1, 0.2, 0.7]],
        )
        .unwrap();
        let gd = GlassDescriptors::new(data, silicate_reference(), false).unwrap();
        // self-distance of the diopside row to the diopside compound
        assert_eq!(gd.dist.data[(0, 2)], 0.0);

        let weights = gd.weight_table(&KernelConfig::new(0.2, 0.05)).unwrap();
        for i in 0..2 {
            assert_relative_eq!(weights.data.row(i).sum(), 1.0, epsilon = 1e-12);
            assert!(weights.data.row(i).iter().all(|&w| w >= 0.0));
        }
        let diopside = weights
            .compounds
            .iter()
            .position(|c| c == "CaMgSi2O6")
            .unwrap();
        for j in 0..weights.data.ncols() {
            assert!(weights.data[(0, diopside)] >= weights.data[(0, j)]);
        }
    }

    #[test]
    fn test_property_table_max_block_tracks_largest_weight() {
        let data = CompositionTable::from_rows(
            names(&["CaO", "MgO", "SiO2"]),
            &[vec![0.25, 0.25, 0.5]],
        )
        .unwrap();
        let gd = GlassDescriptors::new(data, silicate_reference(), false).unwrap();
        let config = KernelConfig::new(0.2, 0.05);
        let table = gd
            .property_table(&["band_gap", "density"], &config)
            .unwrap();
        assert_eq!(table.data.ncols(), 8);
        let max_bg = table.columns.iter().position(|c| c == "max_band_gap").unwrap();
        let max_density = table.columns.iter().position(|c| c == "max_density").unwrap();
        // the diopside row's largest weight sits on diopside itself
        assert_relative_eq!(table.data[(0, max_bg)], 4.8);
        assert_relative_eq!(table.data[(0, max_density)], 3.3);
        // weighted mean lies inside the property range of the reference set
        let mean_bg = table.columns.iter().position(|c| c == "mean_band_gap").unwrap();
        assert!(table.data[(0, mean_bg)] > 4.8 - 1e-9 && table.data[(0, mean_bg)] < 5.7);
    }

    #[test]
    fn test_entropy_column_and_sign_option() {
        let data = CompositionTable::from_rows(
            names(&["CaO", "MgO", "SiO2"]),
            &[vec![0.5, 0.5, 0.0], vec![0.0, 1.0, 0.0]],
        )
        .unwrap();
        let gd = GlassDescriptors::new(data, silicate_reference(), false).unwrap();
        let entropy = gd.entropy_table(false);
        assert_eq!(entropy.columns, names(&["phase_disorder"]));
        assert_relative_eq!(entropy.data[(0, 0)], (0.5f64).ln(), epsilon = 1e-12);
        // a single-component melt has zero disorder
        assert_eq!(entropy.data[(1, 0)], 0.0);
        // explicit negation flips the convention
        let negated = gd.entropy_table(true);
        assert_relative_eq!(negated.data[(0, 0)], -(0.5f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_feature_table_concatenates_entropy_and_properties() {
        let data = CompositionTable::from_rows(
            names(&["CaO", "MgO", "SiO2"]),
            &[vec![0.3, 0.3, 0.4]],
        )
        .unwrap();
        let gd = GlassDescriptors::new(data, silicate_reference(), false).unwrap();
        let features = gd
            .feature_table(
                &["formation_energy", "band_gap", "density"],
                &KernelConfig::new(0.3, 0.05),
                false,
            )
            .unwrap();
        // 1 entropy column + 4 statistics x 3 properties
        assert_eq!(features.data.ncols(), 13);
        assert_eq!(features.columns[0], "phase_disorder");
        assert_eq!(features.columns[1], "mean_formation_energy");
    }

    #[test]
    fn test_top_k_pruning_through_the_pipeline() {
        let data = CompositionTable::from_rows(
            names(&["CaO", "MgO", "SiO2"]),
            &[vec![0.25, 0.25, 0.5]],
        )
        .unwrap();
        let gd = GlassDescriptors::new(data, silicate_reference(), false).unwrap();
        let mut config = KernelConfig::new(0.2, 0.05);
        config.top = Some(2);
        let weights = gd.weight_table(&config).unwrap();
        let nonzero = weights.data.row(0).iter().filter(|&&w| w > 0.0).count();
        assert_eq!(nonzero, 2);
        assert_relative_eq!(weights.data.row(0).sum(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sphere_transform_keeps_self_distance_zero() {
        let data = CompositionTable::from_rows(
            names(&["CaO", "MgO", "SiO2"]),
            &[vec![0.25, 0.25, 0.5]],
        )
        .unwrap();
        let gd = GlassDescriptors::new(data, silicate_reference(), true).unwrap();
        assert_eq!(gd.data.columns, names(&["theta_1", "theta_2"]));
        let diopside = gd
            .dist
            .compounds
            .iter()
            .position(|c| c == "CaMgSi2O6")
            .unwrap();
        assert_relative_eq!(gd.dist.data[(0, diopside)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unnormalizable_query_row_fails_fast() {
        let data = CompositionTable::from_rows(
            names(&["CaO", "MgO", "SiO2"]),
            &[vec![0.0, 0.0, 0.0]],
        )
        .unwrap();
        assert!(GlassDescriptors::new(data, silicate_reference(), false).is_err());
    }
}
