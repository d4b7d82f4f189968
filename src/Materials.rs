/// Oxide stoichiometry: parses oxide names (CaO, Al2O3, ...) into cation and
/// oxygen counts, converts element counts of a solid compound into oxide
/// amounts and checks oxygen charge balance
pub mod oxide;
/// Reference compound records and the reference table: de-duplication by
/// lowest formation energy, charge-balance filtering, oxide composition
/// assembly and property extraction
pub mod reference;
/// Client for a Materials-Project-style REST API supplying candidate solid
/// compounds with formation energies, band gaps, densities and elastic moduli
pub mod materials_api;
