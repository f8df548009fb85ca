#![warn(missing_docs)]
//! Hexagonal base builder.
//!
//! The player clicks a base location, a geodesic H3 grid is laid around it,
//! every hexagon is classified as street or buildable land against
//! OpenStreetMap roads, and hexagons adjacent to the player's live position
//! can be colored while build mode is on.

pub mod bbox;
pub mod classify;
pub mod error;
pub mod grid;
pub mod hex_index;
pub mod map_view;
pub mod math;
pub mod prompt;
pub mod roads;
pub mod session;
pub mod ui;
pub mod walker;

pub use hex_index::GeoPoint;

use bevy::prelude::*;

/// Session phase, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum SessionState {
    /// No base yet; the prompt has not been shown.
    #[default]
    Uninitialized,
    /// The next map click becomes the base.
    AwaitingBaseClick,
    /// A grid exists; clicks select cells.
    GridActive,
}

/// World inspector visibility (Tab to toggle).
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum InspectorState {
    /// Inspector closed.
    #[default]
    Hidden,
    /// Inspector open.
    Visible,
}
