use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use super::MapViewConfig;
use super::entities::{MapCamera, MapOrigin};
use crate::math;
use crate::session::GridSession;

/// Spawns the Camera3d looking straight down, north at the top of the screen.
pub fn spawn_camera(mut commands: Commands, cfg: Res<MapViewConfig>) {
    commands.spawn((
        Name::new("MapCamera"),
        Camera3d::default(),
        Transform::from_xyz(0.0, cfg.altitude, 0.0).looking_at(Vec3::ZERO, Vec3::NEG_Z),
        MapCamera,
    ));
}

/// Arrow keys pan, mouse wheel changes altitude.
pub fn pan_and_zoom(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut scroll: MessageReader<MouseWheel>,
    cfg: Res<MapViewConfig>,
    mut query: Query<&mut Transform, With<MapCamera>>,
) {
    let Ok(mut transform) = query.single_mut() else {
        return;
    };

    let mut direction = Vec2::ZERO;
    if keys.pressed(KeyCode::ArrowUp) {
        direction.y += 1.0;
    }
    if keys.pressed(KeyCode::ArrowDown) {
        direction.y -= 1.0;
    }
    if keys.pressed(KeyCode::ArrowRight) {
        direction.x += 1.0;
    }
    if keys.pressed(KeyCode::ArrowLeft) {
        direction.x -= 1.0;
    }
    if direction != Vec2::ZERO {
        // Pan faster when zoomed out
        let step = direction.normalize()
            * cfg.pan_speed
            * transform.translation.y
            * time.delta_secs();
        let ground = math::world_to_ground(transform.translation) + step;
        transform.translation = math::ground_to_world(ground, transform.translation.y);
    }

    for ev in scroll.read() {
        let lines = match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / 40.0,
        };
        transform.translation.y = math::clamp_altitude(
            transform.translation.y,
            -lines * cfg.scroll_sensitivity,
            cfg.min_altitude,
            cfg.max_altitude,
        );
    }
}

/// `C` centers the view on the user, or on the base when no fix exists.
pub fn recenter_on_user(
    keys: Res<ButtonInput<KeyCode>>,
    session: Res<GridSession>,
    origin: Res<MapOrigin>,
    mut query: Query<&mut Transform, With<MapCamera>>,
) {
    if !keys.just_pressed(KeyCode::KeyC) {
        return;
    }
    let Some(target) = session.user_marker().or(session.base_marker()) else {
        return;
    };
    let Ok(mut transform) = query.single_mut() else {
        return;
    };
    transform.translation = origin.to_world(target, transform.translation.y);
}
