use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub mod geo;
pub mod service;

use geo::Coordinates;

pub type HospitalId = u64;

/// Static hospital metadata from the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hospital {
    pub id: HospitalId,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub simple_address: Option<String>,
    pub representative_contact: String,
    pub emergency_contact: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Catalog marks equipment with "Y"/"N".
    #[serde(default, deserialize_with = "yes_flag")]
    pub ambulance: bool,
    #[serde(default, deserialize_with = "yes_flag")]
    pub ct: bool,
    #[serde(default, deserialize_with = "yes_flag")]
    pub mri: bool,
}

impl Hospital {
    pub fn location(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

fn yes_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = String::deserialize(deserializer)?;
    Ok(flag == "Y")
}

/// Lookup over the known hospitals.
pub trait HospitalCatalog: Send + Sync + fmt::Debug {
    fn find_by_id(&self, id: HospitalId) -> Option<Hospital>;
    fn all(&self) -> Vec<Hospital>;
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    hospitals: Vec<Hospital>,
}

impl InMemoryCatalog {
    pub fn new(hospitals: Vec<Hospital>) -> Self {
        Self { hospitals }
    }
}

impl HospitalCatalog for InMemoryCatalog {
    fn find_by_id(&self, id: HospitalId) -> Option<Hospital> {
        self.hospitals.iter().find(|hospital| hospital.id == id).cloned()
    }

    fn all(&self) -> Vec<Hospital> {
        self.hospitals.clone()
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read hospital catalog: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse hospital catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate hospital id: {0}")]
    DuplicateId(HospitalId),
}

pub fn load_catalog_from_path(path: impl AsRef<Path>) -> Result<InMemoryCatalog, CatalogError> {
    let contents = std::fs::read_to_string(path)?;
    let hospitals: Vec<Hospital> = serde_json::from_str(&contents)?;

    let mut ids: Vec<HospitalId> = hospitals.iter().map(|hospital| hospital.id).collect();
    ids.sort_unstable();
    if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(CatalogError::DuplicateId(pair[0]));
    }

    Ok(InMemoryCatalog::new(hospitals))
}
