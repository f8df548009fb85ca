//! Map projection and mesh helpers.
//!
//! Plain functions over `GeoPoint`, `Vec2` and `Vec3` with no ECS access, so
//! the projection and grid-size arithmetic can be tested in isolation.

use bevy::prelude::{Vec2, Vec3};

use crate::hex_index::{GeoPoint, ring_cell_count};

/// Metres per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Projects `point` onto a local plane centred on `origin`.
///
/// Equirectangular: `x` is metres east, `y` metres north. Accurate to well
/// under a metre across the few hundred metres a grid covers.
///
/// # Examples
/// ```
/// # use hex_base::{GeoPoint, math::project};
/// let origin = GeoPoint::new(52.0, 4.0);
/// assert_eq!(project(origin, origin), bevy::prelude::Vec2::ZERO);
/// ```
pub fn project(origin: GeoPoint, point: GeoPoint) -> Vec2 {
    let cos_lat = origin.lat.to_radians().cos();
    let x = (point.lng - origin.lng) * METERS_PER_DEGREE * cos_lat;
    let y = (point.lat - origin.lat) * METERS_PER_DEGREE;
    Vec2::new(x as f32, y as f32)
}

/// Inverse of [`project`].
pub fn unproject(origin: GeoPoint, local: Vec2) -> GeoPoint {
    let cos_lat = origin.lat.to_radians().cos();
    GeoPoint::new(
        origin.lat + f64::from(local.y) / METERS_PER_DEGREE,
        origin.lng + f64::from(local.x) / (METERS_PER_DEGREE * cos_lat),
    )
}

/// Places a local-plane position in the world: east is +X, north is -Z.
pub fn ground_to_world(local: Vec2, height: f32) -> Vec3 {
    Vec3::new(local.x, height, -local.y)
}

/// Drops the height of a world position back onto the local plane.
pub fn world_to_ground(world: Vec3) -> Vec2 {
    Vec2::new(world.x, -world.z)
}

/// Triangle-fan indices for a convex polygon with `vertex_count` corners.
///
/// Vertex 0 is the fan pivot. Fewer than three corners yield no triangles.
pub fn fan_indices(vertex_count: usize) -> Vec<u32> {
    if vertex_count < 3 {
        return Vec::new();
    }
    (1..vertex_count as u32 - 1)
        .flat_map(|i| [0, i, i + 1])
        .collect()
}

/// Adds `delta` to an altitude and clamps the result to `[min, max]`.
pub fn clamp_altitude(current: f32, delta: f32, min: f32, max: f32) -> f32 {
    (current + delta).clamp(min, max)
}

/// Largest k-ring radius `<= radius` whose cell count fits in `max_cells`.
pub fn tractable_radius(radius: u32, max_cells: u64) -> u32 {
    (0..=radius)
        .rev()
        .find(|&k| ring_cell_count(k) <= max_cells)
        .unwrap_or(0)
}
