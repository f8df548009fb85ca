//! Simulated geolocation provider.
//!
//! Desktop builds have no GPS, so the user's position starts from a
//! configured fix and is walked around with WASD. Each step writes
//! [`UserPosition`]; the grid consumes it as a position update. Without an
//! initial fix geolocation is unavailable and tracking never starts.

mod entities;
mod systems;

pub use entities::UserPosition;

use bevy::prelude::*;

use crate::hex_index::GeoPoint;

/// Per-plugin configuration for the simulated position source.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct WalkerConfig {
    /// Initial fix. `None` means no geolocation support.
    pub initial: Option<GeoPoint>,
    /// Walking speed in metres per second.
    pub walk_speed: f32,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            initial: None,
            walk_speed: 4.0,
        }
    }
}

/// Position source driven by the keyboard.
pub struct WalkerPlugin(pub WalkerConfig);

impl Plugin for WalkerPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<WalkerConfig>()
            .register_type::<UserPosition>()
            .insert_resource(self.0.clone())
            .insert_resource(UserPosition {
                fix: self.0.initial,
            })
            .add_systems(Startup, systems::report_availability)
            .add_systems(
                Update,
                systems::walk.run_if(|pos: Res<UserPosition>| pos.fix.is_some()),
            );
    }
}
