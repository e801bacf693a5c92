//! Core data models for zone classification.

pub mod zone;

pub use zone::{
    Point, Polygon, Zone, ZoneError, ZoneLayer, ZoneMatch, DATA_NOT_LOADED, NEAREST_ZONE_SUFFIX,
    OUTSIDE_AREA, UNCLASSIFIED_ZONE, UNDEFINED_REGION, UNKNOWN_ZONE,
};
