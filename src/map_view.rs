//! Top-down map view over a local projection.
//!
//! Spawns the camera looking straight down at the projection origin, pans with
//! the arrow keys, zooms with the mouse wheel and turns cursor clicks into
//! geographic coordinates through [`MapPointer`].

mod entities;
mod systems;

pub use entities::{MapCamera, MapClick, MapOrigin, MapPointer};

use bevy::prelude::*;

use crate::hex_index::GeoPoint;
use crate::session::GridSession;

/// Per-plugin configuration for the map view.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct MapViewConfig {
    /// Projection origin and initial camera target.
    pub center: GeoPoint,
    /// Initial camera height above the ground in metres.
    pub altitude: f32,
    /// Lowest zoom altitude.
    pub min_altitude: f32,
    /// Highest zoom altitude.
    pub max_altitude: f32,
    /// Pan speed as a fraction of the altitude per second.
    pub pan_speed: f32,
    /// Altitude change per scroll line.
    pub scroll_sensitivity: f32,
    /// Background color of the ground.
    pub clear_color: Color,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(52.0116, 4.3571),
            altitude: 160.0,
            min_altitude: 20.0,
            max_altitude: 1500.0,
            pan_speed: 0.8,
            scroll_sensitivity: 15.0,
            clear_color: Color::srgb(0.93, 0.92, 0.89),
        }
    }
}

/// Camera, panning and cursor-to-coordinate conversion.
pub struct MapViewPlugin(pub MapViewConfig);

impl Plugin for MapViewPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<MapViewConfig>()
            .register_type::<MapCamera>()
            .insert_resource(self.0.clone())
            .insert_resource(MapOrigin(self.0.center))
            .insert_resource(ClearColor(self.0.clear_color))
            .add_systems(Startup, systems::spawn_camera)
            .add_systems(
                Update,
                (
                    systems::pan_and_zoom,
                    systems::recenter_on_user.run_if(resource_exists::<GridSession>),
                )
                    .chain(),
            );
    }
}
