//! Zone geometry and lookup result types.

use geo::{Coord, LineString};
use std::fmt;

/// Geographic point: x = longitude, y = latitude
pub type Point = geo::Point<f64>;

/// Name of the placeholder zone covering unclassified ground inside the outer boundary
pub const UNCLASSIFIED_ZONE: &str = "Zona no identificada";
/// Point fell outside every polygon of a layer
pub const OUTSIDE_AREA: &str = "outside area";
/// Subregion has no entry in the region mapping
pub const UNDEFINED_REGION: &str = "undefined region";
/// Zone layer was never loaded (or failed to load)
pub const DATA_NOT_LOADED: &str = "data not loaded";
/// Nearest-zone fallback had no eligible candidate
pub const UNKNOWN_ZONE: &str = "unknown zone";
/// Appended to zone names picked by nearest-centroid fallback
pub const NEAREST_ZONE_SUFFIX: &str = "(nearest zone)";

#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    #[error("polygon needs at least 3 vertices, got {0}")]
    DegeneratePolygon(usize),

    #[error("polygon has a non-finite coordinate")]
    NonFiniteCoordinate,

    #[error("failed to read zone file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse zone file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A simple polygon ring, implicitly closed (last vertex connects to the first).
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Coord<f64>>,
}

impl Polygon {
    /// Build a polygon from its ring. A repeated closing vertex is dropped.
    pub fn new(vertices: Vec<Coord<f64>>) -> Result<Self, ZoneError> {
        let mut vertices = vertices;
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        if vertices.len() < 3 {
            return Err(ZoneError::DegeneratePolygon(vertices.len()));
        }

        if vertices.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(ZoneError::NonFiniteCoordinate);
        }

        Ok(Self { vertices })
    }

    /// Build from `[lon, lat]` pairs, the GeoJSON position layout
    pub fn from_positions(positions: &[[f64; 2]]) -> Result<Self, ZoneError> {
        Self::new(
            positions
                .iter()
                .map(|[x, y]| Coord { x: *x, y: *y })
                .collect(),
        )
    }

    pub fn vertices(&self) -> &[Coord<f64>] {
        &self.vertices
    }

    /// Explicitly closed ring, for `geo` algorithms
    pub fn exterior(&self) -> LineString<f64> {
        let mut ring = self.vertices.clone();
        ring.push(self.vertices[0]);
        LineString::new(ring)
    }
}

/// A named area made of one or more polygon parts.
#[derive(Debug, Clone)]
pub struct Zone {
    pub name: String,
    pub parts: Vec<Polygon>,
    pub centroid: Option<Point>,
}

impl Zone {
    pub fn new(name: impl Into<String>, polygon: Polygon) -> Self {
        Self {
            name: name.into(),
            parts: vec![polygon],
            centroid: None,
        }
    }

    pub fn with_centroid(mut self, centroid: Point) -> Self {
        self.centroid = Some(centroid);
        self
    }

    /// Whether this is the "unclassified" placeholder zone
    pub fn is_unclassified(&self) -> bool {
        self.name == UNCLASSIFIED_ZONE
    }
}

/// A loaded collection of zones (operational zones or subregions).
///
/// Order matters: when polygons overlap, the first containing zone wins.
#[derive(Debug, Clone, Default)]
pub struct ZoneLayer {
    zones: Vec<Zone>,
}

impl ZoneLayer {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn get(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

/// Outcome of locating a point within a zone layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneMatch {
    /// The point lies inside this zone
    Inside(String),
    /// No zone contains the point; this one has the closest centroid
    Nearest(String),
    /// No zone contains the point and fallback was not requested
    OutsideArea,
    /// Fallback was requested but no zone has a usable centroid
    NoEligibleZone,
    /// The zone layer is not available
    DataNotLoaded,
}

impl ZoneMatch {
    /// Name of the matched zone, exact or approximate
    pub fn zone_name(&self) -> Option<&str> {
        match self {
            ZoneMatch::Inside(name) | ZoneMatch::Nearest(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, ZoneMatch::Nearest(_))
    }

    /// User-facing label
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ZoneMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneMatch::Inside(name) => write!(f, "{}", name),
            ZoneMatch::Nearest(name) => write!(f, "{} {}", name, NEAREST_ZONE_SUFFIX),
            ZoneMatch::OutsideArea => write!(f, "{}", OUTSIDE_AREA),
            ZoneMatch::NoEligibleZone => write!(f, "{}", UNKNOWN_ZONE),
            ZoneMatch::DataNotLoaded => write!(f, "{}", DATA_NOT_LOADED),
        }
    }
}
