//! Nominatim search API client.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{GeocodeCandidate, GeocodeError, Geocoder};
use crate::models::Point;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/";

/// Forward geocoder backed by a Nominatim instance
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    search_url: Url,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: Coordinate,
    lon: Coordinate,
    #[serde(default)]
    display_name: String,
}

/// Nominatim sends coordinates as strings; accept plain numbers too
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Result<f64, GeocodeError> {
        let v = match self {
            Coordinate::Number(n) => *n,
            Coordinate::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| GeocodeError::InvalidCoordinate(s.clone()))?,
        };
        if v.is_finite() {
            Ok(v)
        } else {
            Err(GeocodeError::InvalidCoordinate(v.to_string()))
        }
    }
}

impl NominatimClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let mut search_url = Url::parse(base_url)?;
        // Append to any path prefix instead of replacing its last segment
        search_url
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push("search");
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, search_url })
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }
}

impl Geocoder for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        debug!("Nominatim search: {}", query);

        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("limit", "1")
            .append_pair("addressdetails", "1");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!("Nominatim returned status {} for '{}'", status, query);
            return Err(GeocodeError::Status { status });
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        if places.is_empty() {
            debug!("Nominatim found nothing for '{}'", query);
        }

        places
            .into_iter()
            .map(|place| {
                Ok(GeocodeCandidate {
                    point: Point::new(place.lon.value()?, place.lat.value()?),
                    display_name: place.display_name,
                })
            })
            .collect()
    }
}
