//! Road geometry provider adapter.
//!
//! A [`RoadQuery`] (bounding box + road classes) is handed to an injected
//! [`RoadProvider`]. [`fetch_roads`] is the fail-open entry point used by the
//! grid: any provider failure is logged and reported as "no roads".

mod overpass;

pub use overpass::{OverpassProvider, parse_response};

use bevy::prelude::*;

use crate::bbox::BoundingBox;
use crate::error::GridError;
use crate::hex_index::GeoPoint;

/// OSM `highway` classes that count as streets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum RoadClass {
    /// `highway=primary`
    Primary,
    /// `highway=secondary`
    Secondary,
    /// `highway=tertiary`
    Tertiary,
    /// `highway=residential`
    Residential,
}

impl RoadClass {
    /// Classes used for street classification. Footpaths and tracks are left out.
    pub const STREETS: [RoadClass; 4] = [
        RoadClass::Primary,
        RoadClass::Secondary,
        RoadClass::Tertiary,
        RoadClass::Residential,
    ];

    /// OSM tag value.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
            Self::Residential => "residential",
        }
    }

    /// Parses an OSM `highway` value; other highway kinds yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::STREETS.into_iter().find(|c| c.as_tag() == tag)
    }
}

/// One OSM way as an ordered point sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadSegment {
    /// OSM way id.
    pub way_id: u64,
    /// Road class, when the provider reported one.
    pub class: Option<RoadClass>,
    /// Vertices in way order.
    pub points: Vec<GeoPoint>,
}

impl RoadSegment {
    /// Segment without class information.
    pub fn new(way_id: u64, points: Vec<GeoPoint>) -> Self {
        Self {
            way_id,
            class: None,
            points,
        }
    }

    /// A line needs at least two vertices.
    pub fn is_line(&self) -> bool {
        self.points.len() >= 2
    }
}

/// Structured road request: an area and the classes to keep.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadQuery {
    /// Area to search.
    pub bbox: BoundingBox,
    /// Accepted road classes.
    pub classes: Vec<RoadClass>,
}

impl RoadQuery {
    /// Query for the standard street classes inside `bbox`.
    pub fn streets(bbox: BoundingBox) -> Self {
        Self {
            bbox,
            classes: RoadClass::STREETS.to_vec(),
        }
    }

    /// Replaces the accepted classes.
    pub fn with_classes(mut self, classes: &[RoadClass]) -> Self {
        self.classes = classes.to_vec();
        self
    }

    /// Whether a way tagged `highway=<tag>` belongs in the result.
    pub fn accepts(&self, tag: &str) -> bool {
        RoadClass::from_tag(tag).is_some_and(|c| self.classes.contains(&c))
    }

    /// Overpass QL for this query.
    pub fn to_overpass_ql(&self) -> String {
        let classes: Vec<&str> = self.classes.iter().map(|c| c.as_tag()).collect();
        let b = &self.bbox;
        format!(
            "[out:json];(way[\"highway\"~\"^({})$\"]({},{},{},{}););out geom;",
            classes.join("|"),
            b.south,
            b.west,
            b.north,
            b.east
        )
    }
}

/// Source of road geometries for an area.
///
/// Implementations may block on network I/O; the grid calls them from the
/// async compute pool.
pub trait RoadProvider: Send + Sync {
    /// Roads matching `query`. Zero results is `Ok(vec![])`, never an error.
    fn fetch(&self, query: &RoadQuery) -> Result<Vec<RoadSegment>, GridError>;
}

/// Provider that never finds roads. Used in offline mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRoads;

impl RoadProvider for NoRoads {
    fn fetch(&self, _query: &RoadQuery) -> Result<Vec<RoadSegment>, GridError> {
        Ok(Vec::new())
    }
}

/// Fetches roads for `query`, degrading every failure to an empty list.
pub fn fetch_roads(provider: &dyn RoadProvider, query: &RoadQuery) -> Vec<RoadSegment> {
    let b = &query.bbox;
    debug!(
        "Fetching roads for bbox s={} w={} n={} e={}",
        b.south, b.west, b.north, b.east
    );
    match provider.fetch(query) {
        Ok(roads) => {
            info!("Road provider returned {} ways", roads.len());
            roads
        }
        Err(e) => {
            error!("Road fetch failed, treating area as roadless: {e}");
            Vec::new()
        }
    }
}
