//! External geocoding boundary.

mod nominatim;

pub use nominatim::{NominatimClient, DEFAULT_NOMINATIM_URL};

use std::future::Future;

use crate::models::Point;

/// A single geocoder match
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    /// Address as formatted by the geocoding service
    pub display_name: String,
    pub point: Point,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoder request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geocoder returned HTTP {status}")]
    Status { status: u16 },

    #[error("geocoder returned an invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("invalid geocoder URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Maps a free-text query to candidate coordinates.
///
/// An empty result is a normal "not found", not an error.
pub trait Geocoder {
    fn geocode(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<GeocodeCandidate>, GeocodeError>> + Send;
}
