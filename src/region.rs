//! Subregion to region classification.

use hashbrown::HashMap;
use std::collections::BTreeMap;

use crate::models::{ZoneMatch, DATA_NOT_LOADED, OUTSIDE_AREA, UNDEFINED_REGION};

#[derive(Debug, thiserror::Error)]
pub enum RegionError {
    #[error("subregion '{subregion}' is mapped to both '{first}' and '{second}'")]
    ConflictingMapping {
        subregion: String,
        first: String,
        second: String,
    },
}

/// Static lookup from subregion name to region label.
///
/// Subregion names are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct RegionClassifier {
    by_subregion: HashMap<String, String>,
}

impl RegionClassifier {
    /// Build from `region -> [subregion, ...]` groups
    pub fn new(groups: &BTreeMap<String, Vec<String>>) -> Result<Self, RegionError> {
        let mut by_subregion: HashMap<String, String> = HashMap::new();

        for (region, subregions) in groups {
            for subregion in subregions {
                let key = subregion.trim().to_uppercase();
                match by_subregion.get(&key) {
                    Some(existing) if existing != region => {
                        return Err(RegionError::ConflictingMapping {
                            subregion: subregion.clone(),
                            first: existing.clone(),
                            second: region.clone(),
                        });
                    }
                    _ => {
                        by_subregion.insert(key, region.clone());
                    }
                }
            }
        }

        Ok(Self { by_subregion })
    }

    /// Region for a subregion name.
    ///
    /// The outside-area label passes through unchanged; unknown names map to
    /// the undefined-region label.
    pub fn classify<'a>(&'a self, subregion: &'a str) -> &'a str {
        if subregion == OUTSIDE_AREA {
            return OUTSIDE_AREA;
        }
        self.by_subregion
            .get(&subregion.trim().to_uppercase())
            .map(String::as_str)
            .unwrap_or(UNDEFINED_REGION)
    }

    /// Region for a located subregion
    pub fn classify_match(&self, subregion: &ZoneMatch) -> String {
        match subregion {
            ZoneMatch::Inside(name) | ZoneMatch::Nearest(name) => self.classify(name).to_string(),
            ZoneMatch::OutsideArea => OUTSIDE_AREA.to_string(),
            ZoneMatch::DataNotLoaded => DATA_NOT_LOADED.to_string(),
            ZoneMatch::NoEligibleZone => UNDEFINED_REGION.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_subregion.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_subregion.is_empty()
    }
}

/// Region groups used when the configuration does not provide any
pub fn default_region_groups() -> BTreeMap<String, Vec<String>> {
    let mut groups = BTreeMap::new();
    groups.insert(
        "Capital Sur".to_string(),
        ["ALMAGRO", "BOEDO", "SAN TELMO", "RECOLETA", "PALERMO"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    groups.insert(
        "Capital Norte".to_string(),
        ["DEVOTO", "PATERNAL", "COLEGIALES", "SAAVEDRA"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    groups
}

impl Default for RegionClassifier {
    fn default() -> Self {
        // Built-in groups never conflict
        Self::new(&default_region_groups()).unwrap_or_else(|_| Self {
            by_subregion: HashMap::new(),
        })
    }
}
