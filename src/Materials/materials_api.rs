//! # Materials API Module
//!
//! ## Purpose
//! Fetches candidate solid compounds from a Materials-Project-style REST API:
//! per chemical system (e.g. "Ca-Si-O") it retrieves formulas, formation
//! energies, band gaps, densities, volumes and elastic moduli, preferring
//! computed K_VRH/G_VRH values and falling back to predicted moduli.
//!
//! ## Main structures and logic
//! - `HttpClient`: trait with dependency injection for the HTTP transport
//!   (enables mocking in tests), implemented for `reqwest::blocking::Client`
//! - `MaterialsConfig`: explicit configuration (API key, base URL) passed to
//!   the client; there is no process-global credential
//! - `chemsys_combinations()`: enumerates element subsets joined with the
//!   required elements, mirroring the way glass-forming systems are queried
//! - `fetch_glass_records()`: orchestrates the VASP and predicted-moduli
//!   requests, applies the `e_above_hull` stability cutoff and assembles
//!   `MaterialRecord` rows
//!
//! ## Error policy
//! Every failure (network, URL, malformed payload) surfaces as a typed
//! `MaterialsError`; no placeholder data is ever returned. There is no retry
//! logic.

use super::reference::MaterialRecord;
use log::{info, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// HTTP client trait for dependency injection.
pub trait HttpClient {
    fn get_text(&self, url: &str, api_key: &str) -> Result<String, reqwest::Error>;
}

// Implementation for the real reqwest client
impl HttpClient for Client {
    fn get_text(&self, url: &str, api_key: &str) -> Result<String, reqwest::Error> {
        self.get(url).header("X-API-KEY", api_key).send()?.text()
    }
}

/// error types for the materials client
#[derive(Debug, Error)]
pub enum MaterialsError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Malformed response payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Explicit client configuration; the API key travels here instead of in a
/// process-global environment variable.
#[derive(Debug, Clone)]
pub struct MaterialsConfig {
    pub api_key: String,
    pub base_url: String,
}

impl MaterialsConfig {
    pub fn new(api_key: &str) -> Self {
        MaterialsConfig {
            api_key: api_key.to_string(),
            base_url: "https://materialsproject.org/rest/v2".to_string(),
        }
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        MaterialsConfig {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VaspResponse {
    response: Vec<VaspEntry>,
}

/// One computed entry of the VASP endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct VaspEntry {
    pub material_id: String,
    pub pretty_formula: String,
    pub formation_energy_per_atom: f64,
    pub e_above_hull: f64,
    pub band_gap: f64,
    pub density: f64,
    pub volume: f64,
    pub nsites: usize,
    pub elasticity: Option<Elasticity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Elasticity {
    #[serde(rename = "K_VRH")]
    pub k_vrh: f64,
    #[serde(rename = "G_VRH")]
    pub g_vrh: f64,
}

#[derive(Debug, Deserialize)]
struct PredResponse {
    response: Vec<PredEntry>,
}

/// One entry of the predicted-elastic-moduli endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PredEntry {
    pub material_id: String,
    pub elastic_moduli: PredictedModuli,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictedModuli {
    #[serde(rename = "K")]
    pub k: f64,
    #[serde(rename = "G")]
    pub g: f64,
}

/// All chemical-system query strings for the given elements: every non-empty
/// subset of `elements` (in input order, smallest subsets first) joined with
/// the required elements, e.g. ["Ca", "Si"] + ["O"] -> "Ca-O", "Si-O",
/// "Ca-Si-O".
pub fn chemsys_combinations(elements: &[&str], required: &[&str]) -> Vec<String> {
    fn subsets<'a>(items: &[&'a str], size: usize) -> Vec<Vec<&'a str>> {
        if size == 0 {
            return vec![Vec::new()];
        }
        if items.len() < size {
            return Vec::new();
        }
        let mut out = Vec::new();
        for (i, &head) in items.iter().enumerate() {
            for mut tail in subsets(&items[i + 1..], size - 1) {
                tail.insert(0, head);
                out.push(tail);
            }
        }
        out
    }

    let suffix = required.join("-");
    let mut combos = Vec::new();
    for size in 1..=elements.len() {
        for subset in subsets(elements, size) {
            combos.push(format!("{}-{}", subset.join("-"), suffix));
        }
    }
    combos
}

/// Blocking client over a Materials-Project-style REST API.
pub struct MaterialsClient<C: HttpClient> {
    config: MaterialsConfig,
    client: C,
}

impl MaterialsClient<Client> {
    pub fn new(config: MaterialsConfig) -> Self {
        MaterialsClient {
            config,
            client: Client::new(),
        }
    }
}

impl<C: HttpClient> MaterialsClient<C> {
    pub fn with_client(config: MaterialsConfig, client: C) -> Self {
        MaterialsClient { config, client }
    }

    fn endpoint(&self, chemsys: &str, data_type: &str, prop: Option<&str>) -> Result<Url, MaterialsError> {
        let mut raw = format!("{}/materials/{}/{}", self.config.base_url, chemsys, data_type);
        if let Some(prop) = prop {
            raw.push('/');
            raw.push_str(prop);
        }
        Ok(Url::parse(&raw)?)
    }

    /// Computed entries for one chemical system.
    pub fn fetch_vasp(&self, chemsys: &str) -> Result<Vec<VaspEntry>, MaterialsError> {
        let url = self.endpoint(chemsys, "vasp", None)?;
        let body = self.client.get_text(url.as_str(), &self.config.api_key)?;
        let parsed: VaspResponse = serde_json::from_str(&body)?;
        Ok(parsed.response)
    }

    /// Predicted elastic moduli for one chemical system.
    pub fn fetch_predicted_moduli(&self, chemsys: &str) -> Result<Vec<PredEntry>, MaterialsError> {
        let url = self.endpoint(chemsys, "pred", Some("elastic_moduli"))?;
        let body = self.client.get_text(url.as_str(), &self.config.api_key)?;
        let parsed: PredResponse = serde_json::from_str(&body)?;
        Ok(parsed.response)
    }

    /// Fetches every chemical system combining `elements` with `required`,
    /// applies the optional `e_above_hull` stability cutoff and resolves
    /// elastic moduli (computed K_VRH/G_VRH preferred, predicted moduli as
    /// fallback). Entries with no moduli from either source are dropped with
    /// a warning.
    pub fn fetch_glass_records(
        &self,
        elements: &[&str],
        required: &[&str],
        e_above_hull: Option<f64>,
    ) -> Result<Vec<MaterialRecord>, MaterialsError> {
        let mut entries: Vec<VaspEntry> = Vec::new();
        let mut predicted: HashMap<String, PredictedModuli> = HashMap::new();
        for chemsys in chemsys_combinations(elements, required) {
            entries.extend(self.fetch_vasp(&chemsys)?);
            for pred in self.fetch_predicted_moduli(&chemsys)? {
                predicted.insert(pred.material_id, pred.elastic_moduli);
            }
        }
        info!("fetched {} raw entries from the materials database", entries.len());

        let mut records = Vec::new();
        for entry in entries {
            if let Some(cutoff) = e_above_hull {
                if entry.e_above_hull > cutoff {
                    continue;
                }
            }
            let (k_modulus, g_modulus) = match (&entry.elasticity, predicted.get(&entry.material_id)) {
                (Some(elastic), _) => (elastic.k_vrh, elastic.g_vrh),
                (None, Some(moduli)) => (moduli.k, moduli.g),
                (None, None) => {
                    warn!(
                        "no elastic moduli for {} ({}); entry dropped",
                        entry.material_id, entry.pretty_formula
                    );
                    continue;
                }
            };
            records.push(MaterialRecord {
                material_id: entry.material_id,
                formula: entry.pretty_formula,
                formation_energy: entry.formation_energy_per_atom,
                band_gap: entry.band_gap,
                density: entry.density,
                volume: entry.volume,
                nsites: entry.nsites,
                g_modulus,
                k_modulus,
            });
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockClient;

    impl HttpClient for MockClient {
        fn get_text(&self, url: &str, _api_key: &str) -> Result<String, reqwest::Error> {
            if url.contains("/pred/") {
                Ok(r#"{"response": [
                    {"material_id": "mp-2", "elastic_moduli": {"K": 70.0, "G": 35.0}}
                ]}"#
                .to_string())
            } else {
                Ok(r#"{"response": [
                    {"material_id": "mp-1", "pretty_formula": "CaSiO3",
                     "formation_energy_per_atom": -3.1, "e_above_hull": 0.0,
                     "band_gap": 5.0, "density": 2.9, "volume": 120.0, "nsites": 10,
                     "elasticity": {"K_VRH": 80.0, "G_VRH": 40.0}},
                    {"material_id": "mp-2", "pretty_formula": "MgSiO3",
                     "formation_energy_per_atom": -2.9, "e_above_hull": 0.004,
                     "band_gap": 4.5, "density": 3.2, "volume": 100.0, "nsites": 10,
                     "elasticity": null},
                    {"material_id": "mp-3", "pretty_formula": "Ca2SiO4",
                     "formation_energy_per_atom": -3.3, "e_above_hull": 0.2,
                     "band_gap": 4.9, "density": 3.0, "volume": 90.0, "nsites": 7,
                     "elasticity": null}
                ]}"#
                .to_string())
            }
        }
    }

    fn client() -> MaterialsClient<MockClient> {
        MaterialsClient::with_client(MaterialsConfig::new("test-key"), MockClient)
    }

    #[test]
    fn test_chemsys_combinations() {
        let combos = chemsys_combinations(&["Ca", "Si"], &["O"]);
        assert_eq!(combos, vec!["Ca-O", "Si-O", "Ca-Si-O"]);
    }

    #[test]
    fn test_fetch_vasp_parses_entries() {
        let entries = client().fetch_vasp("Ca-Si-O").unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].pretty_formula, "CaSiO3");
        assert!(entries[1].elasticity.is_none());
    }

    #[test]
    fn test_fetch_glass_records_resolves_moduli_and_hull_cutoff() {
        let records = client()
            .fetch_glass_records(&["Ca"], &["O"], Some(0.01))
            .unwrap();
        // mp-3 is cut by e_above_hull; mp-1 keeps computed moduli, mp-2
        // falls back to predicted ones
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].k_modulus, 80.0);
        assert_eq!(records[1].formula, "MgSiO3");
        assert_eq!(records[1].g_modulus, 35.0);
    }

    #[test]
    fn test_malformed_payload_is_a_typed_error() {
        struct BadClient;
        impl HttpClient for BadClient {
            fn get_text(&self, _url: &str, _key: &str) -> Result<String, reqwest::Error> {
                Ok("not json".to_string())
            }
        }
        let client = MaterialsClient::with_client(MaterialsConfig::new("k"), BadClient);
        assert!(matches!(
            client.fetch_vasp("Ca-O"),
            Err(MaterialsError::Payload(_))
        ));
    }
}
