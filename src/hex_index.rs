//! Geodesic hexagon indexing on top of H3.
//!
//! Maps coordinates to cells at a fixed resolution, expands cells into their
//! k-ring neighbourhood and produces the polygon outline of a cell.

use std::str::FromStr;

use bevy::prelude::*;
use h3o::{CellIndex, LatLng, Resolution};

use crate::error::GridError;

/// Opaque identifier of a hexagonal cell (position + resolution).
pub type HexCellId = CellIndex;

/// A WGS84 coordinate in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a point from latitude and longitude in degrees.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for GeoPoint {
    fn from(ll: LatLng) -> Self {
        Self::new(ll.lat(), ll.lng())
    }
}

/// Validates an H3 resolution level (0..=15).
pub fn resolution(level: u8) -> Result<Resolution, GridError> {
    Resolution::try_from(level)
        .map_err(|e| GridError::InvalidGeometry(format!("resolution {level}: {e}")))
}

/// Cell containing `point` at resolution `level`.
pub fn cell_at(point: GeoPoint, level: u8) -> Result<HexCellId, GridError> {
    let res = resolution(level)?;
    let ll = LatLng::new(point.lat, point.lng).map_err(|e| {
        GridError::InvalidGeometry(format!("coordinate ({}, {}): {e}", point.lat, point.lng))
    })?;
    Ok(ll.to_cell(res))
}

/// All cells within `k` grid steps of `cell`, the center included.
///
/// The center is always the first element.
pub fn ring(cell: HexCellId, k: u32) -> Vec<HexCellId> {
    cell.grid_disk::<Vec<_>>(k)
}

/// Outline of `cell` as an ordered vertex sequence.
///
/// The ring is implicitly closed: the last vertex connects back to the first.
/// Winding order is whatever H3 produces and callers must not rely on it.
pub fn boundary(cell: HexCellId) -> Result<Vec<GeoPoint>, GridError> {
    let vertices: Vec<GeoPoint> = cell.boundary().iter().copied().map(GeoPoint::from).collect();
    if vertices.len() < 3 {
        return Err(GridError::InvalidGeometry(format!(
            "cell {cell} has a degenerate boundary ({} vertices)",
            vertices.len()
        )));
    }
    Ok(vertices)
}

/// Parses the canonical hexadecimal form of a cell id.
pub fn parse_cell(id: &str) -> Result<HexCellId, GridError> {
    CellIndex::from_str(id).map_err(|e| GridError::InvalidGeometry(format!("cell id {id:?}: {e}")))
}

/// Number of cells in a full k-ring: `1 + 3k(k + 1)`.
pub fn ring_cell_count(k: u32) -> u64 {
    let k = u64::from(k);
    1 + 3 * k * (k + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELFT: GeoPoint = GeoPoint::new(52.0116, 4.3571);

    fn delft_cell() -> HexCellId {
        cell_at(DELFT, 13).unwrap()
    }

    // ── cell_at ─────────────────────────────────────────────────────

    #[test]
    fn cell_at_uses_requested_resolution() {
        let cell = delft_cell();
        assert_eq!(u8::from(cell.resolution()), 13);
    }

    #[test]
    fn cell_at_rejects_out_of_range_resolution() {
        assert!(matches!(
            cell_at(DELFT, 16),
            Err(GridError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn cell_at_rejects_non_finite_coordinates() {
        assert!(matches!(
            cell_at(GeoPoint::new(f64::NAN, 4.0), 13),
            Err(GridError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn nearby_points_share_a_cell() {
        let a = cell_at(DELFT, 13).unwrap();
        let b = cell_at(GeoPoint::new(DELFT.lat + 1e-7, DELFT.lng + 1e-7), 13).unwrap();
        assert_eq!(a, b);
    }

    // ── ring ────────────────────────────────────────────────────────

    #[test]
    fn ring_zero_is_the_cell_itself() {
        let c = delft_cell();
        assert_eq!(ring(c, 0), vec![c]);
    }

    #[test]
    fn ring_one_has_center_and_six_neighbours() {
        let c = delft_cell();
        let r = ring(c, 1);
        assert_eq!(r.len(), 7);
        assert!(r.contains(&c));
    }

    #[test]
    fn ring_grows_monotonically() {
        let c = delft_cell();
        for k in 1..=4 {
            let inner = ring(c, k - 1);
            let outer = ring(c, k);
            assert!(
                inner.iter().all(|cell| outer.contains(cell)),
                "ring({k}) must contain ring({})",
                k - 1
            );
            assert_eq!(outer.len() as u64, ring_cell_count(k));
        }
    }

    #[test]
    fn ring_is_deterministic() {
        let c = delft_cell();
        assert_eq!(ring(c, 3), ring(c, 3));
    }

    #[test]
    fn neighbourhood_is_symmetric() {
        let c = delft_cell();
        for n in ring(c, 1) {
            assert!(ring(n, 1).contains(&c), "{n} should see {c} as a neighbour");
        }
    }

    // ── boundary ────────────────────────────────────────────────────

    #[test]
    fn boundary_has_at_least_three_distinct_vertices() {
        let b = boundary(delft_cell()).unwrap();
        assert!(b.len() >= 3);
        for i in 0..b.len() {
            for j in (i + 1)..b.len() {
                assert_ne!(b[i], b[j], "vertices {i} and {j} coincide");
            }
        }
    }

    #[test]
    fn boundary_surrounds_the_indexed_point() {
        let b = boundary(delft_cell()).unwrap();
        let (min_lat, max_lat) = b
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.lat), hi.max(p.lat)));
        let (min_lng, max_lng) = b
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.lng), hi.max(p.lng)));
        assert!((min_lat..=max_lat).contains(&DELFT.lat));
        assert!((min_lng..=max_lng).contains(&DELFT.lng));
    }

    // ── parse_cell ──────────────────────────────────────────────────

    #[test]
    fn parse_cell_reads_display_form() {
        let c = delft_cell();
        assert_eq!(parse_cell(&c.to_string()).unwrap(), c);
    }

    #[test]
    fn parse_cell_rejects_garbage() {
        assert!(parse_cell("not-a-cell").is_err());
    }

    #[test]
    fn reference_grid_is_721_cells() {
        assert_eq!(ring_cell_count(15), 721);
    }
}
