//! Address search: normalize, geocode, then classify the point by zone.

use tracing::{debug, error, info};

use crate::geocoder::{GeocodeCandidate, GeocodeError, Geocoder};
use crate::models::{Point, ZoneLayer, ZoneMatch};
use crate::normalize::AddressNormalizer;
use crate::pip::{border_distance_m, locate};
use crate::region::RegionClassifier;

/// User input for a search
#[derive(Debug, Clone)]
pub enum AddressQuery {
    /// Free-text address, e.g. "Av. Corrientes 348"
    Free(String),
    /// Street name plus house number
    StreetNumber { street: String, number: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("address is empty")]
    EmptyAddress,

    #[error("house number '{0}' is not a number")]
    InvalidHouseNumber(String),

    #[error(transparent)]
    Geocoder(#[from] GeocodeError),
}

impl SearchError {
    /// Whether the error was caused by the request rather than the service
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SearchError::EmptyAddress | SearchError::InvalidHouseNumber(_)
        )
    }
}

/// Zone layers available to the search. A missing layer was not loaded.
#[derive(Debug, Clone, Default)]
pub struct ZoneCatalog {
    pub operational: Option<ZoneLayer>,
    pub subregions: Option<ZoneLayer>,
}

/// Zone classification of a single point
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneReport {
    pub operational_zone: ZoneMatch,
    pub subregion: ZoneMatch,
    pub region: String,
    /// Metres to the operational zone border, when close to it
    pub border_distance_m: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Normalized address that was geocoded
    pub address: String,
    /// Address as returned by the geocoder
    pub display_address: String,
    pub point: Point,
    pub zones: ZoneReport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(SearchResult),
    /// The geocoder had no match for the normalized address
    NotFound { address: String },
}

/// Runs searches against a geocoder and a read-only zone catalog.
pub struct SearchService<G> {
    geocoder: G,
    normalizer: AddressNormalizer,
    classifier: RegionClassifier,
    zones: ZoneCatalog,
    city_qualifier: String,
    border_threshold_m: f64,
}

impl<G: Geocoder> SearchService<G> {
    pub fn new(
        geocoder: G,
        normalizer: AddressNormalizer,
        classifier: RegionClassifier,
        zones: ZoneCatalog,
        city_qualifier: impl Into<String>,
    ) -> Self {
        Self {
            geocoder,
            normalizer,
            classifier,
            zones,
            city_qualifier: city_qualifier.into(),
            border_threshold_m: 100.0,
        }
    }

    pub fn with_border_threshold(mut self, metres: f64) -> Self {
        self.border_threshold_m = metres;
        self
    }

    pub fn zones(&self) -> &ZoneCatalog {
        &self.zones
    }

    /// Normalized form of the query, validated for emptiness and house number
    pub fn normalize_query(&self, query: &AddressQuery) -> Result<String, SearchError> {
        let normalized = match query {
            AddressQuery::Free(raw) => self.normalizer.normalize(raw),
            AddressQuery::StreetNumber { street, number } => {
                let number = number.trim();
                if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
                    return Err(SearchError::InvalidHouseNumber(number.to_string()));
                }
                let street = self.normalizer.normalize(street);
                if street.is_empty() {
                    return Err(SearchError::EmptyAddress);
                }
                format!("{} {}", street, number)
            }
        };

        if normalized.is_empty() {
            return Err(SearchError::EmptyAddress);
        }
        Ok(normalized)
    }

    /// Geocode and classify an address
    pub async fn search(&self, query: &AddressQuery) -> Result<SearchOutcome, SearchError> {
        let address = self.normalize_query(query)?;
        let geocoder_query = format!("{}, {}", address, self.city_qualifier);

        info!("Searching '{}'", geocoder_query);

        let candidates = self
            .geocoder
            .geocode(&geocoder_query)
            .await
            .map_err(|e| {
                error!("Geocoding '{}' failed: {}", geocoder_query, e);
                SearchError::from(e)
            })?;

        let Some(GeocodeCandidate {
            display_name,
            point,
        }) = candidates.into_iter().next()
        else {
            info!("No coordinates found for '{}'", geocoder_query);
            return Ok(SearchOutcome::NotFound { address });
        };

        let zones = self.classify_point(&point);
        info!(
            "'{}' -> ({}, {}) zone={} subregion={} region={}",
            address,
            point.x(),
            point.y(),
            zones.operational_zone,
            zones.subregion,
            zones.region
        );

        Ok(SearchOutcome::Found(SearchResult {
            address,
            display_address: display_name,
            point,
            zones,
        }))
    }

    /// Operational zone (with nearest fallback), subregion (without) and region for a point
    pub fn classify_point(&self, point: &Point) -> ZoneReport {
        let operational = self.zones.operational.as_ref();
        let operational_zone = locate(point, operational.map(ZoneLayer::zones), true);
        let subregion = locate(
            point,
            self.zones.subregions.as_ref().map(ZoneLayer::zones),
            false,
        );
        let region = self.classifier.classify_match(&subregion);

        let border_distance = match (&operational_zone, operational) {
            (ZoneMatch::Inside(name), Some(layer)) => layer
                .get(name)
                .and_then(|zone| zone.containing_part(point))
                .and_then(|part| border_distance_m(point, part))
                .filter(|d| *d < self.border_threshold_m),
            _ => None,
        };

        if let Some(d) = border_distance {
            debug!("Point is {:.0} m from the border of {}", d, operational_zone);
        }

        ZoneReport {
            operational_zone,
            subregion,
            region,
            border_distance_m: border_distance,
        }
    }
}
