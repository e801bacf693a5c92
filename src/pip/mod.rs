//! Point-in-polygon zone classification.
//!
//! Loads zone layers from GeoJSON and answers which zone contains a point,
//! optionally falling back to the zone with the nearest centroid.

mod boundary;
mod geometry;
mod locator;

pub use boundary::{load_zone_layer, parse_zone_layer, ZoneSource};
pub use geometry::{border_distance_m, contains};
pub use locator::{locate, nearest_zone};
