//! Axis-aligned geographic bounding boxes.

use crate::error::GridError;
use crate::hex_index::GeoPoint;

/// Rectangle in degrees. `south <= north` and `west <= east`; the antimeridian
/// is not handled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum latitude.
    pub south: f64,
    /// Minimum longitude.
    pub west: f64,
    /// Maximum latitude.
    pub north: f64,
    /// Maximum longitude.
    pub east: f64,
}

impl BoundingBox {
    /// Box around a point sequence (a cell boundary or a road).
    ///
    /// Fails with [`GridError::EmptyInput`] when `points` is empty.
    pub fn of(points: &[GeoPoint]) -> Result<Self, GridError> {
        let (first, rest) = points.split_first().ok_or(GridError::EmptyInput)?;
        let seed = Self {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        Ok(rest.iter().fold(seed, |b, p| Self {
            south: b.south.min(p.lat),
            west: b.west.min(p.lng),
            north: b.north.max(p.lat),
            east: b.east.max(p.lng),
        }))
    }

    /// Smallest box covering every box in `boxes`.
    pub fn merge(boxes: &[BoundingBox]) -> Result<Self, GridError> {
        let (first, rest) = boxes.split_first().ok_or(GridError::EmptyInput)?;
        Ok(rest.iter().fold(*first, |acc, b| acc.union(b)))
    }

    /// Component-wise union of two boxes.
    pub fn union(&self, other: &BoundingBox) -> Self {
        Self {
            south: self.south.min(other.south),
            west: self.west.min(other.west),
            north: self.north.max(other.north),
            east: self.east.max(other.east),
        }
    }

    /// True when the boxes overlap or touch.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.south <= other.north
            && other.south <= self.north
            && self.west <= other.east
            && other.west <= self.east
    }
}
