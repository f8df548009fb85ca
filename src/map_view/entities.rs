use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContext;

use crate::hex_index::GeoPoint;
use crate::math;

/// Marker component for the map camera entity.
#[derive(Component, Reflect)]
pub struct MapCamera;

/// Geographic origin of the local projection. Fixed for the whole session.
#[derive(Resource, Clone, Copy, Debug)]
pub struct MapOrigin(pub GeoPoint);

impl MapOrigin {
    /// World position of `point` at `height` metres above the ground.
    pub fn to_world(&self, point: GeoPoint, height: f32) -> Vec3 {
        math::ground_to_world(math::project(self.0, point), height)
    }

    /// Geographic position under a world position.
    pub fn to_geo(&self, world: Vec3) -> GeoPoint {
        math::unproject(self.0, math::world_to_ground(world))
    }
}

/// A left click on the map.
#[derive(Clone, Copy, Debug)]
pub struct MapClick {
    /// Ground coordinate under the cursor.
    pub point: GeoPoint,
    /// Cursor position in logical window pixels.
    pub screen: Vec2,
}

/// Cursor access bundled for click handlers.
#[derive(SystemParam)]
pub struct MapPointer<'w, 's> {
    buttons: Res<'w, ButtonInput<MouseButton>>,
    windows: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    camera_q: Query<'w, 's, (&'static Camera, &'static GlobalTransform), With<MapCamera>>,
    egui_q: Query<'w, 's, &'static mut EguiContext>,
    origin: Res<'w, MapOrigin>,
}

impl MapPointer<'_, '_> {
    /// The click of this frame, if any landed on the map rather than on a widget.
    pub fn clicked(&mut self) -> Option<MapClick> {
        if !self.buttons.just_pressed(MouseButton::Left) {
            return None;
        }
        if let Ok(mut ctx) = self.egui_q.single_mut() {
            let ctx = ctx.get_mut();
            if ctx.wants_pointer_input() || ctx.is_pointer_over_area() {
                return None;
            }
        }
        let window = self.windows.single().ok()?;
        let screen = window.cursor_position()?;
        let (camera, cam_gt) = self.camera_q.single().ok()?;
        let ray = camera.viewport_to_world(cam_gt, screen).ok()?;
        let distance = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y))?;
        Some(MapClick {
            point: self.origin.to_geo(ray.get_point(distance)),
            screen,
        })
    }
}
