//! Error taxonomy shared by the grid pipeline and the interaction layer.

use thiserror::Error;

/// Failures of the grid pipeline.
///
/// `InvalidGeometry` and `EmptyInput` are programming errors: inputs are
/// validated before they reach the indexer and at least one hexagon always
/// exists before boxes are merged. `Transport` and `Parse` come from the road
/// provider and are recovered as "no roads" by [`crate::roads::fetch_roads`].
#[derive(Debug, Error)]
pub enum GridError {
    /// Bad cell id, resolution or coordinate.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Bounding boxes were merged from an empty list.
    #[error("cannot merge an empty list of bounding boxes")]
    EmptyInput,
    /// The road provider could not be reached.
    #[error("road provider transport failure: {0}")]
    Transport(String),
    /// The road provider answered with something unreadable.
    #[error("road provider response could not be parsed: {0}")]
    Parse(String),
}

/// A click or color choice that was refused. Cells are left unchanged.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Build mode is off (hexagons are transparent).
    #[error("Toggle build mode to place defensive structures in adjacent hexagons.")]
    NotInBuildMode,
    /// The cell is not next to the player's current position.
    #[error("You're too far away! Go closer to be able to build something.")]
    OutOfRange,
    /// Street cells cannot be colored.
    #[error("You can't build on a street.")]
    StreetCell,
}

/// A platform capability the session needs but does not have.
///
/// Reported once at startup; the dependent feature stays off.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {
    /// No position source exists on this platform.
    #[error("Geolocation is not supported on this device.")]
    Geolocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refusals_carry_the_alert_texts() {
        assert_eq!(
            Rejection::OutOfRange.to_string(),
            "You're too far away! Go closer to be able to build something."
        );
        assert_eq!(
            Rejection::NotInBuildMode.to_string(),
            "Toggle build mode to place defensive structures in adjacent hexagons."
        );
        assert_eq!(Rejection::StreetCell.to_string(), "You can't build on a street.");
    }

    #[test]
    fn missing_geolocation_notice_text() {
        assert_eq!(
            Unavailable::Geolocation.to_string(),
            "Geolocation is not supported on this device."
        );
    }
}
