//! Grid session state: rendered hexagons, editable neighbourhood, markers.
//!
//! [`GridSession`] is a plain resource with no ECS queries so the whole
//! generate / move / select / color cycle can be driven from tests. The
//! `grid` plugin mirrors it onto entities.
//!
//! Grid generation is split in two around the road fetch:
//! [`GridSession::plan_grid`] computes cells and the covering box,
//! [`GridSession::apply_grid`] classifies and stores them once roads arrive.

use bevy::platform::collections::{HashMap, HashSet};
use bevy::prelude::*;

use crate::bbox::BoundingBox;
use crate::classify::{Classification, StreetClassifier};
use crate::error::{GridError, Rejection};
use crate::hex_index::{self, GeoPoint, HexCellId};
use crate::roads::{RoadProvider, RoadQuery, RoadSegment, fetch_roads};

/// Default fill of street cells.
pub const STREET_FILL: Color = Color::srgb(1.0, 1.0, 1.0);
/// Default fill of buildable cells (CSS "brown").
pub const LAND_FILL: Color = Color::srgb(0.647, 0.165, 0.165);
/// Fill of cells that have not been classified.
pub const UNKNOWN_FILL: Color = Color::srgb(0.5, 0.5, 0.5);

/// The two colors a player can place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum EditColor {
    /// Black structure.
    Black,
    /// Red structure.
    Red,
}

impl EditColor {
    /// Both choices, in menu order.
    pub const ALL: [EditColor; 2] = [EditColor::Black, EditColor::Red];

    /// Render color.
    pub fn color(self) -> Color {
        match self {
            Self::Black => Color::srgb(0.0, 0.0, 0.0),
            Self::Red => Color::srgb(1.0, 0.0, 0.0),
        }
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Black => "Black",
            Self::Red => "Red",
        }
    }
}

/// One rendered hexagon.
#[derive(Clone, Debug, PartialEq)]
pub struct HexCell {
    /// Cell id.
    pub id: HexCellId,
    /// Outline, implicitly closed.
    pub boundary: Vec<GeoPoint>,
    /// Street / land label, fixed once computed.
    pub classification: Classification,
    /// Color placed by the player (land cells only).
    pub edit_color: Option<EditColor>,
    /// Current fill opacity.
    pub fill_opacity: f32,
}

impl HexCell {
    /// Fill color: the player's color if any, else the classification default.
    pub fn fill_color(&self) -> Color {
        if let Some(edit) = self.edit_color {
            return edit.color();
        }
        match self.classification {
            Classification::Street => STREET_FILL,
            Classification::Land => LAND_FILL,
            Classification::Unknown => UNKNOWN_FILL,
        }
    }
}

/// Fixed grid parameters.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub struct SessionSettings {
    /// H3 resolution of every cell.
    pub resolution: u8,
    /// k-ring radius of a generated grid.
    pub radius: u32,
    /// k-ring radius of the editable neighbourhood.
    pub editable_radius: u32,
    /// Fill opacity while build mode is on.
    pub visible_opacity: f32,
    /// Whether the session starts with transparent (build mode off) cells.
    pub start_transparent: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            resolution: 13,
            radius: 15,
            editable_radius: 1,
            visible_opacity: 0.6,
            start_transparent: true,
        }
    }
}

/// Pending color choice for a cell, anchored at a screen position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    /// Cell being colored.
    pub cell: HexCellId,
    /// Logical window position where the selector opens.
    pub anchor: Vec2,
}

/// Cells and covering box of a grid that still needs roads.
#[derive(Clone, Debug)]
pub struct GridPlan {
    /// Clicked base location.
    pub center: GeoPoint,
    /// Cell containing `center`.
    pub center_cell: HexCellId,
    /// Every cell of the k-ring with its outline.
    pub outlines: Vec<(HexCellId, Vec<GeoPoint>)>,
    /// Union of the outline boxes.
    pub bbox: BoundingBox,
}

impl GridPlan {
    /// Road request covering the whole grid.
    pub fn road_query(&self) -> RoadQuery {
        RoadQuery::streets(self.bbox)
    }
}

/// Result of applying a plan, for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSummary {
    /// Cells stored.
    pub cells: usize,
    /// Cells classified as street.
    pub streets: usize,
    /// Road lines used for classification.
    pub roads: usize,
}

/// The single live session.
#[derive(Resource, Debug)]
pub struct GridSession {
    settings: SessionSettings,
    cells: HashMap<HexCellId, HexCell>,
    editable: HashSet<HexCellId>,
    base_marker: Option<GeoPoint>,
    user_marker: Option<GeoPoint>,
    transparent: bool,
    selection: Option<Selection>,
    generation: u64,
}

impl GridSession {
    /// Empty session. Fails if the resolution is not a valid H3 level.
    pub fn new(settings: SessionSettings) -> Result<Self, GridError> {
        hex_index::resolution(settings.resolution)?;
        Ok(Self {
            transparent: settings.start_transparent,
            settings,
            cells: HashMap::new(),
            editable: HashSet::new(),
            base_marker: None,
            user_marker: None,
            selection: None,
            generation: 0,
        })
    }

    // ── Grid generation ────────────────────────────────────────────

    /// Cells and covering box for a grid centred on `center`.
    pub fn plan_grid(&self, center: GeoPoint) -> Result<GridPlan, GridError> {
        let center_cell = hex_index::cell_at(center, self.settings.resolution)?;
        let outlines = hex_index::ring(center_cell, self.settings.radius)
            .into_iter()
            .map(|cell| Ok((cell, hex_index::boundary(cell)?)))
            .collect::<Result<Vec<_>, GridError>>()?;
        let boxes = outlines
            .iter()
            .map(|(_, outline)| BoundingBox::of(outline))
            .collect::<Result<Vec<_>, GridError>>()?;
        let bbox = BoundingBox::merge(&boxes)?;
        Ok(GridPlan {
            center,
            center_cell,
            outlines,
            bbox,
        })
    }

    /// Classifies the planned cells against `roads` and replaces the grid.
    ///
    /// Recomputes the editable set around the base and moves the base marker.
    pub fn apply_grid(&mut self, plan: GridPlan, roads: &[RoadSegment]) -> GridSummary {
        let classifier = StreetClassifier::new(roads);
        let opacity = self.current_opacity();

        self.cells.clear();
        let mut streets = 0;
        for (id, boundary) in plan.outlines {
            let classification = classifier.classify(&boundary);
            if classification == Classification::Street {
                streets += 1;
            }
            self.cells.insert(
                id,
                HexCell {
                    id,
                    boundary,
                    classification,
                    edit_color: None,
                    fill_opacity: opacity,
                },
            );
        }

        self.editable = hex_index::ring(plan.center_cell, self.settings.editable_radius)
            .into_iter()
            .collect();
        self.base_marker = Some(plan.center);
        self.selection = None;
        self.generation += 1;

        GridSummary {
            cells: self.cells.len(),
            streets,
            roads: classifier.line_count(),
        }
    }

    /// Plans, fetches roads and applies in one blocking call.
    ///
    /// Road failures never surface here: the grid renders as all land.
    pub fn generate_grid(
        &mut self,
        center: GeoPoint,
        provider: &dyn RoadProvider,
    ) -> Result<GridSummary, GridError> {
        let plan = self.plan_grid(center)?;
        let roads = fetch_roads(provider, &plan.road_query());
        Ok(self.apply_grid(plan, &roads))
    }

    // ── Position tracking ──────────────────────────────────────────

    /// Moves the user marker and recenters the editable set on it.
    ///
    /// Cell classifications and colors are left alone.
    pub fn update_position(&mut self, position: GeoPoint) -> Result<(), GridError> {
        let cell = hex_index::cell_at(position, self.settings.resolution)?;
        self.editable = hex_index::ring(cell, self.settings.editable_radius)
            .into_iter()
            .collect();
        self.user_marker = Some(position);
        Ok(())
    }

    // ── Editing ────────────────────────────────────────────────────

    /// Opens the color selector for `cell` at `anchor`.
    ///
    /// Range is checked before build mode: a far cell is always `OutOfRange`.
    pub fn select_cell(&mut self, cell: HexCellId, anchor: Vec2) -> Result<(), Rejection> {
        if !self.editable.contains(&cell) {
            return Err(Rejection::OutOfRange);
        }
        if self.transparent {
            return Err(Rejection::NotInBuildMode);
        }
        self.selection = Some(Selection { cell, anchor });
        Ok(())
    }

    /// Colors `cell` and closes the selector.
    ///
    /// Only the cell of the open selector can be colored, so range and build
    /// mode are enforced by [`GridSession::select_cell`].
    pub fn apply_color(&mut self, cell: HexCellId, color: EditColor) -> Result<(), Rejection> {
        let selected = self.selection.take().map(|s| s.cell);
        if selected != Some(cell) {
            if self.transparent && self.editable.contains(&cell) {
                return Err(Rejection::NotInBuildMode);
            }
            return Err(Rejection::OutOfRange);
        }
        let opacity = self.current_opacity();
        let Some(hex) = self.cells.get_mut(&cell) else {
            return Err(Rejection::OutOfRange);
        };
        if hex.classification == Classification::Street {
            return Err(Rejection::StreetCell);
        }
        hex.edit_color = Some(color);
        hex.fill_opacity = opacity;
        Ok(())
    }

    /// Closes the selector without changes.
    pub fn cancel_selection(&mut self) {
        self.selection = None;
    }

    /// Flips build mode and reapplies the fill opacity of every cell.
    ///
    /// Returns the new transparency flag.
    pub fn toggle_transparency(&mut self) -> bool {
        self.transparent = !self.transparent;
        let opacity = self.current_opacity();
        for cell in self.cells.values_mut() {
            cell.fill_opacity = opacity;
        }
        self.transparent
    }

    fn current_opacity(&self) -> f32 {
        if self.transparent {
            0.0
        } else {
            self.settings.visible_opacity
        }
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Grid parameters.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Every rendered cell.
    pub fn cells(&self) -> &HashMap<HexCellId, HexCell> {
        &self.cells
    }

    /// A rendered cell.
    pub fn cell(&self, id: &HexCellId) -> Option<&HexCell> {
        self.cells.get(id)
    }

    /// Cells the player may currently color.
    pub fn editable(&self) -> &HashSet<HexCellId> {
        &self.editable
    }

    /// Base location, once a grid exists.
    pub fn base_marker(&self) -> Option<GeoPoint> {
        self.base_marker
    }

    /// Last known user position.
    pub fn user_marker(&self) -> Option<GeoPoint> {
        self.user_marker
    }

    /// True while build mode is off.
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Open color selector, if any.
    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Bumped each time the grid is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cell containing `point`, if it belongs to the rendered grid.
    pub fn rendered_cell_at(&self, point: GeoPoint) -> Option<HexCellId> {
        let id = hex_index::cell_at(point, self.settings.resolution).ok()?;
        self.cells.contains_key(&id).then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roads::NoRoads;

    const BASE: GeoPoint = GeoPoint::new(52.0116, 4.3571);

    /// North-south road along the base longitude, about 70 m long.
    struct OneRoad;

    impl RoadProvider for OneRoad {
        fn fetch(&self, _query: &RoadQuery) -> Result<Vec<RoadSegment>, GridError> {
            Ok(vec![RoadSegment::new(
                1,
                vec![
                    GeoPoint::new(BASE.lat - 0.0003, BASE.lng),
                    GeoPoint::new(BASE.lat + 0.0003, BASE.lng),
                ],
            )])
        }
    }

    struct Unreachable;

    impl RoadProvider for Unreachable {
        fn fetch(&self, _query: &RoadQuery) -> Result<Vec<RoadSegment>, GridError> {
            Err(GridError::Transport("timed out".into()))
        }
    }

    fn small_settings() -> SessionSettings {
        SessionSettings {
            radius: 3,
            ..default()
        }
    }

    fn session_with_grid(provider: &dyn RoadProvider) -> GridSession {
        let mut s = GridSession::new(small_settings()).unwrap();
        s.generate_grid(BASE, provider).unwrap();
        s
    }

    fn base_cell() -> HexCellId {
        hex_index::cell_at(BASE, 13).unwrap()
    }

    /// A rendered land cell one step from the base.
    fn neighbour_land(s: &GridSession) -> HexCellId {
        *s.editable()
            .iter()
            .find(|id| {
                **id != base_cell() && s.cell(id).unwrap().classification == Classification::Land
            })
            .expect("a land neighbour next to a single road")
    }

    // ── new ─────────────────────────────────────────────────────────

    #[test]
    fn invalid_resolution_is_rejected() {
        let settings = SessionSettings {
            resolution: 20,
            ..default()
        };
        assert!(matches!(
            GridSession::new(settings),
            Err(GridError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn fresh_session_is_empty_and_transparent() {
        let s = GridSession::new(default()).unwrap();
        assert!(s.cells().is_empty());
        assert!(s.editable().is_empty());
        assert!(s.is_transparent());
        assert_eq!(s.base_marker(), None);
        assert_eq!(s.generation(), 0);
    }

    // ── generate_grid ───────────────────────────────────────────────

    #[test]
    fn reference_settings_render_721_cells() {
        let mut s = GridSession::new(default()).unwrap();
        let summary = s.generate_grid(BASE, &NoRoads).unwrap();
        assert_eq!(summary.cells, 721);
        assert_eq!(s.cells().len(), 721);
    }

    #[test]
    fn plan_box_covers_every_outline() {
        let s = GridSession::new(small_settings()).unwrap();
        let plan = s.plan_grid(BASE).unwrap();
        assert_eq!(plan.outlines.len(), 37);
        for (_, outline) in &plan.outlines {
            for p in outline {
                assert!(plan.bbox.south <= p.lat && p.lat <= plan.bbox.north);
                assert!(plan.bbox.west <= p.lng && p.lng <= plan.bbox.east);
            }
        }
        assert_eq!(plan.road_query().bbox, plan.bbox);
    }

    #[test]
    fn editable_set_is_ring_around_base() {
        let s = session_with_grid(&NoRoads);
        let expected: HashSet<HexCellId> = hex_index::ring(base_cell(), 1).into_iter().collect();
        assert_eq!(s.editable(), &expected);
        assert!(s.editable().len() <= 7);
        for id in s.editable() {
            assert!(s.cells().contains_key(id), "editable cell {id} not rendered");
        }
    }

    #[test]
    fn road_marks_base_cell_as_street() {
        let s = session_with_grid(&OneRoad);
        let base = s.cell(&base_cell()).unwrap();
        assert_eq!(base.classification, Classification::Street);
        assert_eq!(base.fill_color(), STREET_FILL);
    }

    #[test]
    fn cells_clear_of_the_road_are_land() {
        let s = session_with_grid(&OneRoad);
        let mut land = 0;
        for cell in s.cells().values() {
            let b = BoundingBox::of(&cell.boundary).unwrap();
            if b.west > BASE.lng || b.east < BASE.lng {
                assert_eq!(cell.classification, Classification::Land);
                assert_eq!(cell.fill_color(), LAND_FILL);
                land += 1;
            }
        }
        assert!(land > 0);
    }

    #[test]
    fn road_failure_renders_everything_as_land() {
        let mut s = GridSession::new(small_settings()).unwrap();
        let summary = s.generate_grid(BASE, &Unreachable).unwrap();
        assert_eq!(summary.cells, 37);
        assert_eq!(summary.streets, 0);
        assert!(
            s.cells()
                .values()
                .all(|c| c.classification == Classification::Land)
        );
    }

    #[test]
    fn new_base_replaces_grid_and_moves_marker() {
        let mut s = session_with_grid(&NoRoads);
        assert_eq!(s.base_marker(), Some(BASE));
        let elsewhere = GeoPoint::new(52.02, 4.36);
        s.generate_grid(elsewhere, &NoRoads).unwrap();
        assert_eq!(s.base_marker(), Some(elsewhere));
        assert_eq!(s.generation(), 2);
        assert!(!s.cells().contains_key(&base_cell()));
    }

    #[test]
    fn cells_start_transparent() {
        let s = session_with_grid(&NoRoads);
        assert!(s.cells().values().all(|c| c.fill_opacity == 0.0));
    }

    // ── update_position ─────────────────────────────────────────────

    #[test]
    fn position_update_moves_editable_set_only() {
        let mut s = session_with_grid(&OneRoad);
        let before: Vec<(HexCellId, Classification)> = s
            .cells()
            .values()
            .map(|c| (c.id, c.classification))
            .collect();

        let walk_to = GeoPoint::new(BASE.lat + 0.0002, BASE.lng + 0.0002);
        s.update_position(walk_to).unwrap();

        let here = hex_index::cell_at(walk_to, 13).unwrap();
        let expected: HashSet<HexCellId> = hex_index::ring(here, 1).into_iter().collect();
        assert_eq!(s.editable(), &expected);
        assert_eq!(s.user_marker(), Some(walk_to));
        assert_eq!(s.base_marker(), Some(BASE));
        for (id, class) in before {
            assert_eq!(s.cell(&id).unwrap().classification, class);
        }
    }

    #[test]
    fn repeated_position_is_idempotent() {
        let mut s = session_with_grid(&NoRoads);
        let p = GeoPoint::new(BASE.lat + 0.0001, BASE.lng);
        s.update_position(p).unwrap();
        let first = s.editable().clone();
        s.update_position(p).unwrap();
        assert_eq!(s.editable(), &first);
    }

    #[test]
    fn position_before_grid_sets_marker() {
        let mut s = GridSession::new(small_settings()).unwrap();
        s.update_position(BASE).unwrap();
        assert_eq!(s.user_marker(), Some(BASE));
        assert_eq!(s.editable().len(), 7);
    }

    // ── select_cell ─────────────────────────────────────────────────

    #[test]
    fn far_cell_is_out_of_range_in_any_mode() {
        let mut s = session_with_grid(&NoRoads);
        let far = *s
            .cells()
            .keys()
            .find(|id| !s.editable().contains(*id))
            .unwrap();
        assert_eq!(s.select_cell(far, Vec2::ZERO), Err(Rejection::OutOfRange));
        s.toggle_transparency();
        assert_eq!(s.select_cell(far, Vec2::ZERO), Err(Rejection::OutOfRange));
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn near_cell_needs_build_mode() {
        let mut s = session_with_grid(&NoRoads);
        assert_eq!(
            s.select_cell(base_cell(), Vec2::ZERO),
            Err(Rejection::NotInBuildMode)
        );
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn near_cell_in_build_mode_opens_selector() {
        let mut s = session_with_grid(&NoRoads);
        s.toggle_transparency();
        let anchor = Vec2::new(120.0, 80.0);
        s.select_cell(base_cell(), anchor).unwrap();
        assert_eq!(
            s.selection(),
            Some(Selection {
                cell: base_cell(),
                anchor
            })
        );
    }

    // ── apply_color / cancel ────────────────────────────────────────

    #[test]
    fn apply_color_paints_land_and_closes_selector() {
        let mut s = session_with_grid(&OneRoad);
        s.toggle_transparency();
        let target = neighbour_land(&s);
        s.select_cell(target, Vec2::ZERO).unwrap();
        s.apply_color(target, EditColor::Red).unwrap();

        let cell = s.cell(&target).unwrap();
        assert_eq!(cell.edit_color, Some(EditColor::Red));
        assert_eq!(cell.fill_color(), EditColor::Red.color());
        assert_eq!(cell.fill_opacity, 0.6);
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn street_cells_cannot_be_painted() {
        let mut s = session_with_grid(&OneRoad);
        s.toggle_transparency();
        s.select_cell(base_cell(), Vec2::ZERO).unwrap();
        assert_eq!(
            s.apply_color(base_cell(), EditColor::Black),
            Err(Rejection::StreetCell)
        );
        assert_eq!(s.cell(&base_cell()).unwrap().edit_color, None);
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn far_cell_without_selection_cannot_be_painted() {
        let mut s = session_with_grid(&NoRoads);
        let far = *s
            .cells()
            .keys()
            .find(|id| !s.editable().contains(*id))
            .unwrap();
        assert_eq!(
            s.apply_color(far, EditColor::Red),
            Err(Rejection::OutOfRange)
        );
        s.toggle_transparency();
        assert_eq!(
            s.apply_color(far, EditColor::Red),
            Err(Rejection::OutOfRange)
        );
        assert_eq!(s.cell(&far).unwrap().edit_color, None);
    }

    #[test]
    fn only_the_selected_cell_can_be_painted() {
        let mut s = session_with_grid(&NoRoads);
        s.toggle_transparency();
        let other = *s.editable().iter().find(|id| **id != base_cell()).unwrap();
        s.select_cell(base_cell(), Vec2::ZERO).unwrap();
        assert_eq!(
            s.apply_color(other, EditColor::Black),
            Err(Rejection::OutOfRange)
        );
        assert_eq!(s.cell(&other).unwrap().edit_color, None);
        assert_eq!(s.cell(&base_cell()).unwrap().edit_color, None);
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn near_cell_cannot_be_painted_with_build_mode_off() {
        let mut s = session_with_grid(&NoRoads);
        assert_eq!(
            s.apply_color(base_cell(), EditColor::Black),
            Err(Rejection::NotInBuildMode)
        );
        assert_eq!(s.cell(&base_cell()).unwrap().edit_color, None);
    }

    #[test]
    fn cancel_leaves_cells_untouched() {
        let mut s = session_with_grid(&NoRoads);
        s.toggle_transparency();
        s.select_cell(base_cell(), Vec2::ZERO).unwrap();
        let before = s.cell(&base_cell()).cloned();
        s.cancel_selection();
        assert_eq!(s.selection(), None);
        assert_eq!(s.cell(&base_cell()).cloned(), before);
    }

    // ── toggle_transparency ─────────────────────────────────────────

    #[test]
    fn toggle_switches_every_opacity() {
        let mut s = session_with_grid(&NoRoads);
        assert!(!s.toggle_transparency());
        assert!(s.cells().values().all(|c| c.fill_opacity == 0.6));
        assert!(s.toggle_transparency());
        assert!(s.cells().values().all(|c| c.fill_opacity == 0.0));
    }

    #[test]
    fn double_toggle_restores_opacity_and_color() {
        let mut s = session_with_grid(&OneRoad);
        s.toggle_transparency();
        let target = neighbour_land(&s);
        s.select_cell(target, Vec2::ZERO).unwrap();
        s.apply_color(target, EditColor::Black).unwrap();

        let snapshot: Vec<(HexCellId, f32, Color)> = s
            .cells()
            .values()
            .map(|c| (c.id, c.fill_opacity, c.fill_color()))
            .collect();
        s.toggle_transparency();
        s.toggle_transparency();
        for (id, opacity, color) in snapshot {
            let cell = s.cell(&id).unwrap();
            assert_eq!(cell.fill_opacity, opacity);
            assert_eq!(cell.fill_color(), color);
        }
    }

    // ── rendered_cell_at ────────────────────────────────────────────

    #[test]
    fn rendered_cell_lookup() {
        let s = session_with_grid(&NoRoads);
        assert_eq!(s.rendered_cell_at(BASE), Some(base_cell()));
        assert_eq!(s.rendered_cell_at(GeoPoint::new(10.0, 10.0)), None);
    }
}
