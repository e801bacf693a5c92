use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::geocoder::{NominatimClient, DEFAULT_NOMINATIM_URL};
use crate::normalize::{default_corrections, AddressNormalizer, CorrectionRule};
use crate::pip::ZoneSource;
use crate::region::{default_region_groups, RegionClassifier};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub geocoder: GeocoderConfig,
    pub zones: ZonesConfig,
    pub search: SearchConfig,
    /// Ordered correction table; the built-in one when absent
    pub corrections: Option<Vec<CorrectionRule>>,
    /// Region label -> subregion names; the built-in mapping when absent
    pub regions: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Appended to every query, e.g. "Corrientes 348, CABA"
    pub city_qualifier: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: "zonas/0.1 (zone lookup)".to_string(),
            timeout_secs: 10,
            city_qualifier: "CABA".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ZonesConfig {
    pub operational: ZoneSource,
    pub subregions: ZoneSource,
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            operational: ZoneSource::default(),
            subregions: ZoneSource {
                name_property: "subregion".to_string(),
                ..ZoneSource::default()
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Report the distance to the zone border when closer than this
    pub border_threshold_m: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            border_threshold_m: 100.0,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn normalizer(&self) -> AddressNormalizer {
        AddressNormalizer::new(
            self.corrections
                .clone()
                .unwrap_or_else(default_corrections),
        )
    }

    pub fn region_classifier(&self) -> Result<RegionClassifier> {
        let groups = self.regions.clone().unwrap_or_else(default_region_groups);
        RegionClassifier::new(&groups).context("Invalid region mapping")
    }

    pub fn geocoder_client(&self) -> Result<NominatimClient> {
        NominatimClient::new(
            &self.geocoder.base_url,
            &self.geocoder.user_agent,
            Duration::from_secs(self.geocoder.timeout_secs),
        )
        .context("Failed to create geocoder client")
    }
}
