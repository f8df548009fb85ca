use bevy::prelude::*;
use bevy_egui::{EguiContext, egui};

use super::Notices;
use crate::map_view::{MapCamera, MapOrigin};
use crate::session::{EditColor, GridSession};

fn to_egui(color: Color) -> egui::Color32 {
    let c = color.to_srgba();
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgb(channel(c.red), channel(c.green), channel(c.blue))
}

/// Status line of the build-mode panel. Transparent cells mean build mode is off.
fn build_mode_status(transparent: bool) -> &'static str {
    if transparent {
        "Build mode: off"
    } else {
        "Build mode: on"
    }
}

/// Front notice with an OK button.
pub fn notice_window(mut egui_ctx: Query<&mut EguiContext>, mut notices: ResMut<Notices>) {
    let Some(message) = notices.current().map(str::to_owned) else {
        return;
    };
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };

    let mut dismissed = false;
    egui::Window::new("Notice")
        .anchor(egui::Align2::CENTER_TOP, [0.0, 24.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx.get_mut(), |ui| {
            ui.label(message);
            dismissed = ui.button("OK").clicked();
        });
    if dismissed {
        notices.dismiss();
    }
}

/// Build-mode toggle and a short status line.
pub fn build_mode_panel(
    mut egui_ctx: Query<&mut EguiContext>,
    mut session: ResMut<GridSession>,
) {
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };

    let mut toggle = false;
    egui::Window::new("Base")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx.get_mut(), |ui| {
            ui.label(build_mode_status(session.is_transparent()));
            ui.label(format!("{} hexagons", session.cells().len()));
            toggle = ui.button("Toggle build mode").clicked();
        });
    if toggle {
        let transparent = session.toggle_transparency();
        debug!("Build mode toggled, transparent = {transparent}");
    }
}

/// Black/Red/Cancel buttons next to the selected cell.
pub fn color_selector(
    mut egui_ctx: Query<&mut EguiContext>,
    mut session: ResMut<GridSession>,
    mut notices: ResMut<Notices>,
) {
    let Some(selection) = session.selection() else {
        return;
    };
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };

    let mut choice: Option<Option<EditColor>> = None;
    egui::Area::new(egui::Id::new("color_selector"))
        .fixed_pos(egui::pos2(selection.anchor.x, selection.anchor.y))
        .show(ctx.get_mut(), |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    for color in EditColor::ALL {
                        let text = egui::RichText::new(color.label()).color(egui::Color32::WHITE);
                        let button = egui::Button::new(text).fill(to_egui(color.color()));
                        if ui.add(button).clicked() {
                            choice = Some(Some(color));
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        choice = Some(None);
                    }
                });
            });
        });

    match choice {
        Some(Some(color)) => {
            if let Err(rejection) = session.apply_color(selection.cell, color) {
                notices.push(rejection.to_string());
            }
        }
        Some(None) => session.cancel_selection(),
        None => {}
    }
}

/// "Base Location" and "You are here" captions above the markers.
pub fn marker_labels(
    mut egui_ctx: Query<&mut EguiContext>,
    camera_q: Query<(&Camera, &GlobalTransform), With<MapCamera>>,
    origin: Res<MapOrigin>,
    session: Res<GridSession>,
) {
    let Ok((camera, cam_gt)) = camera_q.single() else {
        return;
    };
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());

    let labelled = [
        (session.base_marker(), "Base Location"),
        (session.user_marker(), "You are here"),
    ];
    for (point, text) in labelled {
        let Some(point) = point else { continue };
        if let Ok(viewport) = camera.world_to_viewport(cam_gt, origin.to_world(point, 0.0)) {
            painter.text(
                egui::pos2(viewport.x, viewport.y - 14.0),
                egui::Align2::CENTER_BOTTOM,
                text,
                egui::FontId::proportional(13.0),
                egui::Color32::WHITE,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_reports_build_mode_off() {
        let session = GridSession::new(default()).unwrap();
        assert!(session.is_transparent());
        assert_eq!(build_mode_status(session.is_transparent()), "Build mode: off");
    }

    #[test]
    fn toggled_session_reports_build_mode_on() {
        let mut session = GridSession::new(default()).unwrap();
        session.toggle_transparency();
        assert_eq!(build_mode_status(session.is_transparent()), "Build mode: on");
    }

    #[test]
    fn colors_convert_to_egui() {
        assert_eq!(to_egui(Color::BLACK), egui::Color32::from_rgb(0, 0, 0));
        assert_eq!(
            to_egui(Color::srgb(1.0, 0.0, 0.0)),
            egui::Color32::from_rgb(255, 0, 0)
        );
    }
}
