use bevy::prelude::*;

use super::WalkerConfig;
use super::entities::UserPosition;
use crate::error::Unavailable;
use crate::math;
use crate::ui::Notices;

/// Tells the user once when there is no position source.
pub fn report_availability(pos: Res<UserPosition>, mut notices: ResMut<Notices>) {
    match pos.fix {
        Some(fix) => info!("Geolocation fix at ({:.6}, {:.6})", fix.lat, fix.lng),
        None => {
            warn!("No initial position given, geolocation disabled");
            notices.push(Unavailable::Geolocation.to_string());
        }
    }
}

/// WASD walks the user north/west/south/east. Writes to [`UserPosition`].
pub fn walk(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    cfg: Res<WalkerConfig>,
    mut pos: ResMut<UserPosition>,
) {
    let Some(current) = pos.fix else { return };

    let mut direction = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        direction.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        direction.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if direction == Vec2::ZERO {
        return;
    }

    let step = direction.normalize() * cfg.walk_speed * time.delta_secs();
    pos.fix = Some(math::unproject(current, step));
}
