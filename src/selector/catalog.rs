use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::store::models::GameMode;

#[derive(Debug, Clone, Deserialize)]
pub struct MapModes {
    pub allowed: Vec<GameMode>,
    #[serde(default)]
    pub recommended: Vec<GameMode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    pub modes: MapModes,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub cooldown_days: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapCatalog {
    pub maps: Vec<MapConfig>,
}

/// An empty catalog is a fatal configuration error: selection would be
/// impossible every single day.
pub fn load_catalog(path: &Path) -> Result<MapCatalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read map catalog at {}", path.display()))?;
    let catalog: MapCatalog = serde_json::from_str(&raw)
        .with_context(|| format!("Malformed map catalog at {}", path.display()))?;

    if catalog.maps.is_empty() {
        bail!("Map catalog at {} has no maps", path.display());
    }
    Ok(catalog)
}
