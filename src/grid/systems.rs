use std::sync::Arc;

use bevy::asset::RenderAssetUsages;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use bevy::tasks::{AsyncComputeTaskPool, block_on};

use super::GridConfig;
use super::entities::{
    BaseChosen, HexGridRoot, HexTile, Marker, PendingGrid, RoadOverlay, RoadSource,
};
use crate::SessionState;
use crate::map_view::{MapOrigin, MapPointer};
use crate::math;
use crate::roads::fetch_roads;
use crate::session::GridSession;
use crate::ui::Notices;
use crate::walker::UserPosition;

/// Flat triangle-fan mesh over a convex world-space outline.
pub(super) fn tile_mesh(outline: &[Vec3]) -> Mesh {
    let positions: Vec<[f32; 3]> = outline.iter().map(|v| v.to_array()).collect();
    let normals = vec![[0.0, 1.0, 0.0]; positions.len()];
    let uvs = vec![[0.0, 0.0]; positions.len()];
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(math::fan_indices(outline.len())))
}

fn tile_material(color: Color) -> StandardMaterial {
    StandardMaterial {
        base_color: color,
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        cull_mode: None,
        double_sided: true,
        ..default()
    }
}

/// Turns a map click into a base choice.
pub fn pick_base(mut pointer: MapPointer, mut chosen: MessageWriter<BaseChosen>) {
    if let Some(click) = pointer.clicked() {
        chosen.write(BaseChosen { point: click.point });
    }
}

/// First base choice: plans the grid and starts the road fetch.
pub fn start_grid(
    mut commands: Commands,
    mut chosen: MessageReader<BaseChosen>,
    session: Res<GridSession>,
    source: Res<RoadSource>,
    cfg: Res<GridConfig>,
    mut notices: ResMut<Notices>,
) {
    let first = chosen.read().next().copied();
    chosen.clear();
    let Some(BaseChosen { point }) = first else {
        return;
    };
    let plan = match session.plan_grid(point) {
        Ok(plan) => plan,
        Err(e) => {
            warn!(
                "Cannot build a grid at ({:.6}, {:.6}): {e}",
                point.lat, point.lng
            );
            notices.push(e.to_string());
            return;
        }
    };
    info!(
        "Base set at ({:.6}, {:.6}), fetching roads for {} cells",
        point.lat,
        point.lng,
        plan.outlines.len()
    );

    let query = plan.road_query().with_classes(&cfg.roads.classes);
    let provider = Arc::clone(&source.provider);
    let task = AsyncComputeTaskPool::get()
        .spawn(async move { fetch_roads(provider.as_ref(), &query) });
    commands.insert_resource(PendingGrid::new(plan, task));
}

/// Polls the road fetch; once done, classifies and activates the grid.
pub fn finish_pending_grid(
    mut commands: Commands,
    mut pending: ResMut<PendingGrid>,
    mut session: ResMut<GridSession>,
    mut overlay: ResMut<RoadOverlay>,
    mut next: ResMut<NextState<SessionState>>,
) {
    let Some(roads) = block_on(futures_lite::future::poll_once(&mut pending.task)) else {
        return;
    };
    commands.remove_resource::<PendingGrid>();
    let Some(plan) = pending.plan.take() else {
        return;
    };

    let summary = session.apply_grid(plan, &roads);
    info!(
        "Grid ready: {} cells, {} streets, {} roads",
        summary.cells, summary.streets, summary.roads
    );
    overlay.lines = roads
        .into_iter()
        .filter(|r| r.is_line())
        .map(|r| r.points)
        .collect();

    next.set(SessionState::GridActive);
}

/// Clicks on rendered cells open the color selector or report why not.
pub fn handle_cell_click(
    mut pointer: MapPointer,
    mut session: ResMut<GridSession>,
    mut notices: ResMut<Notices>,
) {
    let Some(click) = pointer.clicked() else {
        return;
    };
    let Some(cell) = session.rendered_cell_at(click.point) else {
        if session.selection().is_some() {
            session.cancel_selection();
        }
        return;
    };
    if let Err(rejection) = session.select_cell(cell, click.screen) {
        debug!("Selection of {cell} rejected: {rejection:?}");
        notices.push(rejection.to_string());
    }
}

/// Feeds position changes into the session.
pub fn apply_position_updates(pos: Res<UserPosition>, mut session: ResMut<GridSession>) {
    if !pos.is_changed() {
        return;
    }
    let Some(fix) = pos.fix else {
        return;
    };
    if let Err(e) = session.update_position(fix) {
        warn!("Ignoring position ({:.6}, {:.6}): {e}", fix.lat, fix.lng);
    }
}

/// Respawns tiles when the grid is replaced, otherwise refreshes their fills.
#[allow(clippy::too_many_arguments)]
pub fn sync_tiles(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    session: Res<GridSession>,
    origin: Res<MapOrigin>,
    cfg: Res<GridConfig>,
    roots: Query<Entity, With<HexGridRoot>>,
    tiles: Query<(&HexTile, &MeshMaterial3d<StandardMaterial>)>,
    mut drawn: Local<u64>,
) {
    if !session.is_changed() {
        return;
    }

    if *drawn != session.generation() {
        *drawn = session.generation();
        for root in &roots {
            commands.entity(root).despawn();
        }

        let root = commands
            .spawn((
                Name::new("HexGrid"),
                HexGridRoot,
                Transform::default(),
                Visibility::default(),
            ))
            .id();
        for cell in session.cells().values() {
            let outline: Vec<Vec3> = cell
                .boundary
                .iter()
                .map(|p| origin.to_world(*p, cfg.tile_height))
                .collect();
            let mesh = meshes.add(tile_mesh(&outline));
            let material =
                materials.add(tile_material(cell.fill_color().with_alpha(cell.fill_opacity)));
            let tile = commands
                .spawn((
                    Name::new(format!("Hex({})", cell.id)),
                    HexTile {
                        cell: cell.id,
                        outline,
                    },
                    Mesh3d(mesh),
                    MeshMaterial3d(material),
                    Transform::default(),
                ))
                .id();
            commands.entity(root).add_child(tile);
        }
        return;
    }

    for (tile, handle) in &tiles {
        let Some(cell) = session.cell(&tile.cell) else {
            continue;
        };
        let color = cell.fill_color().with_alpha(cell.fill_opacity);
        let stale = materials.get(&handle.0).is_some_and(|m| m.base_color != color);
        if stale && let Some(mat) = materials.get_mut(&handle.0) {
            mat.base_color = color;
        }
    }
}

/// Places or repositions the base and user markers.
pub fn sync_markers(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    session: Res<GridSession>,
    origin: Res<MapOrigin>,
    cfg: Res<GridConfig>,
    mut markers: Query<(&Marker, &mut Transform)>,
) {
    if !session.is_changed() {
        return;
    }

    let wanted = [
        (Marker::Base, session.base_marker()),
        (Marker::User, session.user_marker()),
    ];
    for (kind, point) in wanted {
        let Some(point) = point else { continue };
        let position = origin.to_world(point, cfg.marker_radius);
        if let Some((_, mut transform)) = markers.iter_mut().find(|(m, _)| **m == kind) {
            transform.translation = position;
            continue;
        }
        commands.spawn((
            Name::new(kind.name()),
            kind,
            Mesh3d(meshes.add(Sphere::new(cfg.marker_radius))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: kind.color(),
                unlit: true,
                ..default()
            })),
            Transform::from_translation(position),
        ));
    }
}

/// Cell outlines; the editable neighbourhood is highlighted.
pub fn draw_outlines(
    mut gizmos: Gizmos,
    session: Res<GridSession>,
    cfg: Res<GridConfig>,
    tiles: Query<&HexTile>,
) {
    for tile in &tiles {
        let Some(&first) = tile.outline.first() else {
            continue;
        };
        let color = if session.editable().contains(&tile.cell) {
            cfg.editable_color
        } else {
            cfg.outline_color
        };
        gizmos.linestrip(tile.outline.iter().copied().chain([first]), color);
    }
}

/// Fetched roads as thin polylines.
pub fn draw_roads(
    mut gizmos: Gizmos,
    overlay: Res<RoadOverlay>,
    origin: Res<MapOrigin>,
    cfg: Res<GridConfig>,
) {
    let height = cfg.tile_height * 2.0;
    for line in &overlay.lines {
        gizmos.linestrip(line.iter().map(|p| origin.to_world(*p, height)), cfg.road_color);
    }
}
