use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::Task;

use crate::hex_index::{GeoPoint, HexCellId};
use crate::roads::{RoadProvider, RoadSegment};
use crate::session::GridPlan;

/// Injected road provider, shared with fetch tasks.
#[derive(Resource, Clone)]
pub struct RoadSource {
    /// Provider used for every grid generation.
    pub provider: Arc<dyn RoadProvider>,
}

/// Map location picked as the base. Only the first one starts a grid.
#[derive(Message, Clone, Copy, Debug)]
pub struct BaseChosen {
    /// Clicked point.
    pub point: GeoPoint,
}

/// Grid generation waiting on its road fetch.
///
/// While present, base choices and position updates are held back.
#[derive(Resource)]
pub struct PendingGrid {
    pub(super) plan: Option<GridPlan>,
    pub(super) task: Task<Vec<RoadSegment>>,
}

impl PendingGrid {
    /// Plan computed at click time and the road fetch it waits on.
    pub fn new(plan: GridPlan, task: Task<Vec<RoadSegment>>) -> Self {
        Self {
            plan: Some(plan),
            task,
        }
    }
}

/// Road lines of the current grid, drawn as an overlay.
#[derive(Resource, Default, Debug)]
pub struct RoadOverlay {
    /// One point sequence per road.
    pub lines: Vec<Vec<GeoPoint>>,
}

/// Parent of every [`HexTile`] of one generation.
#[derive(Component, Reflect)]
pub struct HexGridRoot;

/// Rendered hexagon.
#[derive(Component, Debug)]
pub struct HexTile {
    /// Session cell this tile shows.
    pub cell: HexCellId,
    /// World-space outline, open ring.
    pub outline: Vec<Vec3>,
}

/// Position marker kind.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum Marker {
    /// Where the grid was generated.
    Base,
    /// Last reported user position.
    User,
}

impl Marker {
    /// Sphere color.
    pub fn color(self) -> Color {
        match self {
            Self::Base => Color::srgb(0.9, 0.1, 0.1),
            Self::User => Color::srgb(0.1, 0.3, 1.0),
        }
    }

    /// Entity name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Base => "BaseMarker",
            Self::User => "UserMarker",
        }
    }
}
