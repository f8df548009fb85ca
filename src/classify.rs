//! Street vs. buildable-land classification of hexagons.

use bevy::prelude::*;
use geo::{Coord, Intersects, LineString, Polygon};

use crate::bbox::BoundingBox;
use crate::hex_index::GeoPoint;
use crate::roads::RoadSegment;

/// What a hexagon is, as far as building goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum Classification {
    /// At least one road touches or crosses the cell.
    Street,
    /// No road touches the cell; it can be built on.
    Land,
    /// Not classified yet.
    #[default]
    Unknown,
}

impl Classification {
    /// Maps the boolean street test onto a classification.
    pub fn from_street(is_street: bool) -> Self {
        if is_street { Self::Street } else { Self::Land }
    }
}

fn to_coords(points: &[GeoPoint]) -> Vec<Coord<f64>> {
    points.iter().map(|p| Coord { x: p.lng, y: p.lat }).collect()
}

/// Road lines prepared once per grid and tested against every hexagon.
pub struct StreetClassifier {
    lines: Vec<(BoundingBox, LineString<f64>)>,
}

impl StreetClassifier {
    /// Keeps every road that can form a line; shorter ones are skipped.
    pub fn new(roads: &[RoadSegment]) -> Self {
        let lines = roads
            .iter()
            .filter(|road| road.is_line())
            .filter_map(|road| {
                let bbox = BoundingBox::of(&road.points).ok()?;
                Some((bbox, LineString::new(to_coords(&road.points))))
            })
            .collect();
        Self { lines }
    }

    /// Number of usable road lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// True when any road shares a point with, or crosses, the cell polygon.
    pub fn is_street(&self, boundary: &[GeoPoint]) -> bool {
        let Ok(cell_box) = BoundingBox::of(boundary) else {
            return false;
        };
        let polygon = Polygon::new(LineString::new(to_coords(boundary)), vec![]);
        self.lines
            .iter()
            .filter(|(road_box, _)| road_box.intersects(&cell_box))
            .any(|(_, line)| polygon.intersects(line))
    }

    /// Classification of a cell outline.
    pub fn classify(&self, boundary: &[GeoPoint]) -> Classification {
        Classification::from_street(self.is_street(boundary))
    }
}

/// One-shot street test of a single hexagon against `roads`.
pub fn is_street(boundary: &[GeoPoint], roads: &[RoadSegment]) -> bool {
    StreetClassifier::new(roads).is_street(boundary)
}
