//! Planar containment and border-distance tests on zone polygons.

use geo::{Closest, ClosestPoint, Distance, Haversine};

use crate::models::{Point, Polygon, Zone};

/// Even-odd ray casting test.
///
/// Casts a horizontal ray from `point` and counts edge crossings. Points lying
/// exactly on an edge or vertex may land on either side.
pub fn contains(point: &Point, polygon: &Polygon) -> bool {
    let vertices = polygon.vertices();
    if vertices.len() < 3 {
        return false;
    }

    let (px, py) = (point.x(), point.y());
    let mut inside = false;
    let mut j = vertices.len() - 1;

    for i in 0..vertices.len() {
        let (xi, yi) = (vertices[i].x, vertices[i].y);
        let (xj, yj) = (vertices[j].x, vertices[j].y);

        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

impl Polygon {
    pub fn contains(&self, point: &Point) -> bool {
        contains(point, self)
    }
}

impl Zone {
    /// First polygon part containing the point
    pub fn containing_part(&self, point: &Point) -> Option<&Polygon> {
        self.parts.iter().find(|part| part.contains(point))
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.containing_part(point).is_some()
    }
}

/// Haversine distance in metres from `point` to the nearest edge of `polygon`
pub fn border_distance_m(point: &Point, polygon: &Polygon) -> Option<f64> {
    match polygon.exterior().closest_point(point) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => Some(Haversine.distance(*point, p)),
        Closest::Indeterminate => None,
    }
}
