//! Zonas - address geocoding and zone classification
//!
//! Normalizes street addresses, geocodes them, and reports which operational
//! zone, subregion and region the resulting point falls into.

pub mod config;
pub mod geocoder;
pub mod models;
pub mod normalize;
pub mod pip;
pub mod region;
pub mod search;

pub use models::{Point, Polygon, Zone, ZoneLayer, ZoneMatch};
pub use search::{AddressQuery, SearchOutcome, SearchService};
