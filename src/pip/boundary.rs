//! Zone layer loading from GeoJSON FeatureCollections.

use geo::{Centroid, MultiPolygon};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::models::{Point, Polygon, Zone, ZoneError, ZoneLayer};

/// Where a zone layer comes from and how to read its features
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoneSource {
    pub path: Option<PathBuf>,
    /// Feature property holding the zone name
    pub name_property: String,
    /// Feature property holding a `[lon, lat]` centroid
    pub centroid_property: String,
    /// Compute centroids from geometry when the property is missing
    pub derive_missing_centroids: bool,
}

impl Default for ZoneSource {
    fn default() -> Self {
        Self {
            path: None,
            name_property: "operacion".to_string(),
            centroid_property: "centroide".to_string(),
            derive_missing_centroids: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    /// Decoded one by one so a malformed feature only loses itself
    features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// GeoJSON position; a third (altitude) ordinate is ignored
type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Polygon {
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    #[serde(other)]
    Unsupported,
}

/// Read a zone layer from a GeoJSON file
pub fn load_zone_layer<P: AsRef<Path>>(path: P, source: &ZoneSource) -> Result<ZoneLayer, ZoneError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ZoneError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let layer = parse_zone_layer(&content, source).map_err(|e| ZoneError::Json {
        path: path.display().to_string(),
        source: e,
    })?;

    info!("Loaded {} zones from {}", layer.len(), path.display());
    Ok(layer)
}

/// Parse a GeoJSON FeatureCollection into a zone layer, keeping feature order
pub fn parse_zone_layer(geojson: &str, source: &ZoneSource) -> Result<ZoneLayer, serde_json::Error> {
    let collection: FeatureCollection = serde_json::from_str(geojson)?;

    let mut zones = Vec::with_capacity(collection.features.len());
    let mut seen = HashSet::new();

    for (idx, value) in collection.features.into_iter().enumerate() {
        let feature: Feature = match serde_json::from_value(value) {
            Ok(f) => f,
            Err(e) => {
                warn!("Feature {} is malformed, skipping: {}", idx, e);
                continue;
            }
        };
        let properties = feature.properties.unwrap_or_default();

        let name = match properties
            .get(&source.name_property)
            .and_then(|v| v.as_str())
            .map(str::trim)
        {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => {
                warn!("Feature {} has no '{}' property, skipping", idx, source.name_property);
                continue;
            }
        };

        let rings: Vec<Vec<Position>> = match feature.geometry {
            // Only exterior rings; holes are not modelled
            Some(Geometry::Polygon { coordinates }) => coordinates.into_iter().take(1).collect(),
            Some(Geometry::MultiPolygon { coordinates }) => coordinates
                .into_iter()
                .filter_map(|poly| poly.into_iter().next())
                .collect(),
            Some(Geometry::Unsupported) | None => {
                debug!("Feature '{}' has no polygon geometry, skipping", name);
                continue;
            }
        };

        let parts: Vec<Polygon> = rings
            .iter()
            .filter_map(|ring| match Polygon::from_positions(&to_pairs(ring)) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Dropping ring of zone '{}': {}", name, e);
                    None
                }
            })
            .collect();

        if parts.is_empty() {
            warn!("Zone '{}' has no usable polygon, skipping", name);
            continue;
        }

        if !seen.insert(name.clone()) {
            warn!("Duplicate zone name '{}', keeping the first one", name);
            continue;
        }

        let centroid = properties
            .get(&source.centroid_property)
            .and_then(parse_position)
            .or_else(|| {
                if source.derive_missing_centroids {
                    derive_centroid(&parts)
                } else {
                    None
                }
            });

        zones.push(Zone {
            name,
            parts,
            centroid,
        });
    }

    Ok(ZoneLayer::new(zones))
}

fn to_pairs(ring: &[Position]) -> Vec<[f64; 2]> {
    ring.iter()
        .filter(|p| p.len() >= 2)
        .map(|p| [p[0], p[1]])
        .collect()
}

fn parse_position(value: &serde_json::Value) -> Option<Point> {
    let pair = value.as_array()?;
    if pair.len() != 2 {
        return None;
    }
    let lon = pair[0].as_f64()?;
    let lat = pair[1].as_f64()?;
    if !lon.is_finite() || !lat.is_finite() {
        return None;
    }
    Some(Point::new(lon, lat))
}

fn derive_centroid(parts: &[Polygon]) -> Option<Point> {
    let multi = MultiPolygon::new(
        parts
            .iter()
            .map(|p| geo::Polygon::new(p.exterior(), vec![]))
            .collect(),
    );
    multi.centroid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(x: f64, y: f64) -> serde_json::Value {
        json!([[[x, y], [x + 1.0, y], [x + 1.0, y + 1.0], [x, y + 1.0], [x, y]]])
    }

    fn collection(features: Vec<serde_json::Value>) -> String {
        json!({ "type": "FeatureCollection", "features": features }).to_string()
    }

    #[test]
    fn test_parse_polygon_and_multipolygon() {
        let geojson = collection(vec![
            json!({
                "type": "Feature",
                "properties": { "operacion": "Palermo", "centroide": [0.5, 0.5] },
                "geometry": { "type": "Polygon", "coordinates": square(0.0, 0.0) }
            }),
            json!({
                "type": "Feature",
                "properties": { "operacion": "Delta" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [square(10.0, 10.0), square(20.0, 20.0)]
                }
            }),
        ]);

        let layer = parse_zone_layer(&geojson, &ZoneSource::default()).unwrap();
        assert_eq!(layer.len(), 2);

        let palermo = layer.get("Palermo").unwrap();
        assert_eq!(palermo.parts.len(), 1);
        assert_eq!(palermo.centroid, Some(Point::new(0.5, 0.5)));

        let delta = layer.get("Delta").unwrap();
        assert_eq!(delta.parts.len(), 2);
        assert!(delta.centroid.is_none());
    }

    #[test]
    fn test_skips_unnamed_unsupported_and_duplicates() {
        let geojson = collection(vec![
            json!({
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Polygon", "coordinates": square(0.0, 0.0) }
            }),
            json!({
                "type": "Feature",
                "properties": { "operacion": "Linea" },
                "geometry": { "type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]] }
            }),
            json!({
                "type": "Feature",
                "properties": { "operacion": "Boedo" },
                "geometry": { "type": "Polygon", "coordinates": square(0.0, 0.0) }
            }),
            json!({
                "type": "Feature",
                "properties": { "operacion": "Boedo" },
                "geometry": { "type": "Polygon", "coordinates": square(5.0, 5.0) }
            }),
            json!({
                "type": "Feature",
                "properties": { "operacion": "Sin geometria" },
                "geometry": null
            }),
        ]);

        let layer = parse_zone_layer(&geojson, &ZoneSource::default()).unwrap();
        assert_eq!(layer.len(), 1);
        let boedo = layer.get("Boedo").unwrap();
        assert!(boedo.contains(&Point::new(0.5, 0.5)));
    }

    #[test]
    fn test_malformed_feature_does_not_discard_layer() {
        let geojson = collection(vec![
            json!({
                "type": "Feature",
                "properties": { "operacion": "Boedo" },
                "geometry": { "type": "Polygon", "coordinates": square(0.0, 0.0) }
            }),
            json!({
                "type": "Feature",
                "properties": { "operacion": "Nula" },
                "geometry": { "type": "Polygon", "coordinates": null }
            }),
            json!({
                "type": "Feature",
                "properties": { "operacion": "Texto" },
                "geometry": { "type": "Polygon", "coordinates": [[["a", "b"]]] }
            }),
            json!({
                "type": "Feature",
                "properties": { "operacion": "Anidada" },
                "geometry": { "type": "MultiPolygon", "coordinates": [[0.0, 0.0]] }
            }),
        ]);

        let layer = parse_zone_layer(&geojson, &ZoneSource::default()).unwrap();
        assert_eq!(layer.len(), 1);
        assert!(layer.get("Boedo").is_some());
    }

    #[test]
    fn test_degenerate_ring_dropped() {
        let geojson = collection(vec![json!({
            "type": "Feature",
            "properties": { "operacion": "Plana" },
            "geometry": { "type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]] }
        })]);
        let layer = parse_zone_layer(&geojson, &ZoneSource::default()).unwrap();
        assert!(layer.is_empty());
    }

    #[test]
    fn test_custom_properties_and_derived_centroid() {
        let geojson = collection(vec![json!({
            "type": "Feature",
            "properties": { "subregion": "Devoto" },
            "geometry": { "type": "Polygon", "coordinates": square(2.0, 2.0) }
        })]);
        let source = ZoneSource {
            name_property: "subregion".to_string(),
            derive_missing_centroids: true,
            ..ZoneSource::default()
        };
        let layer = parse_zone_layer(&geojson, &source).unwrap();
        let centroid = layer.get("Devoto").unwrap().centroid.unwrap();
        assert!((centroid.x() - 2.5).abs() < 1e-9);
        assert!((centroid.y() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_zone_layer("/nonexistent/zonas.geojson", &ZoneSource::default()).unwrap_err();
        assert!(matches!(err, ZoneError::Io { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zonas.geojson");
        std::fs::write(
            &path,
            collection(vec![json!({
                "type": "Feature",
                "properties": { "operacion": "Recoleta" },
                "geometry": { "type": "Polygon", "coordinates": square(0.0, 0.0) }
            })]),
        )
        .unwrap();

        let layer = load_zone_layer(&path, &ZoneSource::default()).unwrap();
        assert!(layer.get("Recoleta").is_some());

        std::fs::write(&path, "not json").unwrap();
        let err = load_zone_layer(&path, &ZoneSource::default()).unwrap_err();
        assert!(matches!(err, ZoneError::Json { .. }));
    }
}
