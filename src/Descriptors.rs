/// Module to parse a chemical formula into its atomic composition
///
/// # Examples
/// ```
/// use SciGlass::Descriptors::formula_parser::parse_formula;
/// let tracked = ["Ca", "Mg", "Si", "O"];
/// let counts = parse_formula("CaMgSi2O6", &tracked).unwrap();
/// assert_eq!(counts["Si"], 2);
/// assert_eq!(counts["O"], 6);
/// ```
pub mod formula_parser;
/// Composition tables: named oxide columns over a dense matrix, row/column
/// normalization and the angular (sphere) transform of composition space
pub mod composition;
/// Euclidean distances between query compositions and reference compounds
pub mod distance;
/// Kernel weighting of reference compounds by composition distance and
/// formation energy
pub mod weights;
/// Weighted statistical descriptors (mean, standard deviation, absolute
/// deviation, max at largest weight) of reference compound properties
pub mod property_stats;
/// Entropy-like descriptors computed directly from composition fractions
pub mod liquid;
/// Main pipeline assembling composition, distance, weight and descriptor
/// tables into one feature table
///
/// # Examples
/// ```rust, ignore
/// use SciGlass::Descriptors::descriptors_api::GlassDescriptors;
/// use SciGlass::Descriptors::weights::KernelConfig;
/// let gd = GlassDescriptors::new(data_table, reference_table, false)?;
/// let features = gd.feature_table(&["density", "G"], &KernelConfig::new(0.1, 0.01), false)?;
/// features.pretty_print();
/// ```
pub mod descriptors_api;
/// tests
pub mod descriptors_tests;
