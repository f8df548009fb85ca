use bevy::prelude::*;

use crate::hex_index::GeoPoint;

/// Latest position reported by the geolocation source.
#[derive(Resource, Default, Reflect)]
pub struct UserPosition {
    /// Current fix; stays `None` when geolocation is unavailable.
    pub fix: Option<GeoPoint>,
}
