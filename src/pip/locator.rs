//! Zone lookup for a point, with optional nearest-centroid fallback.

use geo::{Distance, Euclidean};
use tracing::debug;

use crate::models::{Point, Zone, ZoneLayer, ZoneMatch};

/// Locate `point` among `zones`.
///
/// The first zone (in layer order) whose polygon contains the point wins. When
/// nothing contains it and `allow_nearest` is set, the zone whose centroid is
/// closest (plain Euclidean distance in degrees) is returned as an approximate
/// match. With fallback enabled, landing in the unclassified placeholder zone
/// counts as not found. `None` means the layer was never loaded.
pub fn locate(point: &Point, zones: Option<&[Zone]>, allow_nearest: bool) -> ZoneMatch {
    let Some(zones) = zones else {
        return ZoneMatch::DataNotLoaded;
    };

    if let Some(zone) = zones.iter().find(|z| z.contains(point)) {
        if !(allow_nearest && zone.is_unclassified()) {
            return ZoneMatch::Inside(zone.name.clone());
        }
        debug!(
            "Point ({}, {}) is in the unclassified zone, falling back to nearest",
            point.x(),
            point.y()
        );
    }

    if !allow_nearest {
        return ZoneMatch::OutsideArea;
    }

    match nearest_zone(point, zones) {
        Some(zone) => ZoneMatch::Nearest(zone.name.clone()),
        None => ZoneMatch::NoEligibleZone,
    }
}

/// Zone with the closest centroid, ignoring the unclassified placeholder
pub fn nearest_zone<'a>(point: &Point, zones: &'a [Zone]) -> Option<&'a Zone> {
    zones
        .iter()
        .filter(|z| !z.is_unclassified())
        .filter_map(|z| z.centroid.map(|c| (z, Euclidean.distance(*point, c))))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(z, _)| z)
}

impl ZoneLayer {
    pub fn locate(&self, point: &Point, allow_nearest: bool) -> ZoneMatch {
        locate(point, Some(self.zones()), allow_nearest)
    }
}
