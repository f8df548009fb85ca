//! Hex grid around the player's base.
//!
//! The first map click after the prompt becomes the base ([`BaseChosen`]). Its k-ring is
//! planned immediately, roads for the covering box are fetched on the async
//! compute pool, and once they arrive the session is populated and mirrored
//! onto tile entities. Later clicks open the color selector for editable
//! cells, and [`UserPosition`](crate::walker::UserPosition) changes move the
//! editable neighbourhood.

mod entities;
mod systems;

pub use entities::{
    BaseChosen, HexGridRoot, HexTile, Marker, PendingGrid, RoadOverlay, RoadSource,
};

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;

use crate::SessionState;
use crate::hex_index;
use crate::math;
use crate::roads::{NoRoads, OverpassProvider, RoadClass, RoadProvider};
use crate::session::{GridSession, SessionSettings};

/// Road provider settings.
#[derive(Clone, Debug, Reflect)]
pub struct RoadsConfig {
    /// Overpass interpreter URL.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// `highway` classes treated as streets.
    pub classes: Vec<RoadClass>,
    /// Skip the network entirely; every cell becomes land.
    pub offline: bool,
}

/// Per-plugin configuration for the grid.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct GridConfig {
    /// Resolution, radius and opacity of the session.
    pub session: SessionSettings,
    /// Upper bound on cells per grid; larger radii are clamped.
    pub max_cells: u64,
    /// Road source.
    pub roads: RoadsConfig,
    /// Draw fetched roads as polylines.
    pub draw_roads: bool,
    /// Outline of ordinary cells.
    pub outline_color: Color,
    /// Outline of cells in the editable neighbourhood.
    pub editable_color: Color,
    /// Road polyline color.
    pub road_color: Color,
    /// Height of the tile plane above the ground.
    pub tile_height: f32,
    /// Radius of the base and user marker spheres.
    pub marker_radius: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            session: SessionSettings::default(),
            max_cells: 5000,
            roads: RoadsConfig {
                endpoint: "https://overpass.kumi.systems/api/interpreter".into(),
                timeout_secs: 60,
                classes: RoadClass::STREETS.to_vec(),
                offline: false,
            },
            draw_roads: true,
            outline_color: Color::BLACK,
            editable_color: Color::srgb(1.0, 0.84, 0.0),
            road_color: Color::srgb(0.1, 0.3, 1.0),
            tile_height: 0.05,
            marker_radius: 1.5,
        }
    }
}

/// Session settings with the radius clamped to `max_cells`.
fn tractable_settings(cfg: &GridConfig) -> SessionSettings {
    let mut settings = cfg.session.clone();
    let radius = math::tractable_radius(settings.radius, cfg.max_cells);
    if radius != settings.radius {
        warn!(
            "Grid radius {} gives {} cells (max {}), clamping to {}",
            settings.radius,
            hex_index::ring_cell_count(settings.radius),
            cfg.max_cells,
            radius
        );
        settings.radius = radius;
    }
    settings
}

fn road_source(cfg: &RoadsConfig) -> Arc<dyn RoadProvider> {
    if cfg.offline {
        info!("Offline mode, roads disabled");
        return Arc::new(NoRoads);
    }
    match OverpassProvider::new(cfg.endpoint.clone(), Duration::from_secs(cfg.timeout_secs)) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            error!("Road client unavailable, continuing without roads: {e}");
            Arc::new(NoRoads)
        }
    }
}

/// Base choice, road fetch and position updates, in that order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridPipeline;

/// Session side of the grid: everything that mutates [`GridSession`] without
/// touching the window, meshes or egui.
struct SessionPipelinePlugin;

impl Plugin for SessionPipelinePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<BaseChosen>()
            .init_resource::<RoadOverlay>()
            .add_systems(
                Update,
                (
                    systems::start_grid
                        .run_if(in_state(SessionState::AwaitingBaseClick))
                        .run_if(not(resource_exists::<PendingGrid>)),
                    systems::finish_pending_grid.run_if(resource_exists::<PendingGrid>),
                    systems::apply_position_updates.run_if(not(resource_exists::<PendingGrid>)),
                )
                    .chain()
                    .in_set(GridPipeline)
                    .run_if(resource_exists::<GridSession>),
            );
    }
}

/// Grid generation, editing and rendering.
pub struct GridPlugin(pub GridConfig);

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        let mut cfg = self.0.clone();
        cfg.session = tractable_settings(&cfg);

        let session = GridSession::new(cfg.session.clone()).or_else(|e| {
            error!("Invalid grid settings, using defaults: {e}");
            cfg.session = SessionSettings::default();
            GridSession::new(cfg.session.clone())
        });
        match session {
            Ok(session) => {
                info!(
                    "Grid: resolution {}, radius {} ({} cells)",
                    cfg.session.resolution,
                    cfg.session.radius,
                    hex_index::ring_cell_count(cfg.session.radius)
                );
                app.insert_resource(session);
            }
            Err(e) => error!("Grid disabled: {e}"),
        }

        app.register_type::<GridConfig>()
            .register_type::<Marker>()
            .register_type::<HexGridRoot>()
            .insert_resource(RoadSource {
                provider: road_source(&cfg.roads),
            })
            .insert_resource(cfg)
            .add_plugins(SessionPipelinePlugin)
            .add_systems(
                Update,
                systems::pick_base
                    .run_if(in_state(SessionState::AwaitingBaseClick))
                    .run_if(not(resource_exists::<PendingGrid>))
                    .before(GridPipeline),
            )
            .add_systems(
                Update,
                (
                    systems::handle_cell_click.run_if(in_state(SessionState::GridActive)),
                    systems::sync_tiles,
                    systems::sync_markers,
                )
                    .chain()
                    .after(GridPipeline)
                    .run_if(resource_exists::<GridSession>),
            )
            .add_systems(
                Update,
                (
                    systems::draw_outlines,
                    systems::draw_roads.run_if(|cfg: Res<GridConfig>| cfg.draw_roads),
                )
                    .run_if(in_state(SessionState::GridActive)),
            );
    }
}
