//! Egui overlay: notices, build-mode toggle, color selector and marker labels.

mod systems;

use std::collections::VecDeque;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::SessionState;
use crate::session::GridSession;

/// Queue of user-facing messages, shown one at a time until dismissed.
#[derive(Resource, Default, Debug)]
pub struct Notices {
    queue: VecDeque<String>,
}

impl Notices {
    /// Queues a message. A message equal to the last queued one is dropped.
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.queue.back() != Some(&message) {
            self.queue.push_back(message);
        }
    }

    /// Message currently on screen.
    pub fn current(&self) -> Option<&str> {
        self.queue.front().map(String::as_str)
    }

    /// Dismisses the current message.
    pub fn dismiss(&mut self) {
        self.queue.pop_front();
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Egui widgets drawn over the map.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Notices>().add_systems(
            EguiPrimaryContextPass,
            (
                (systems::build_mode_panel, systems::color_selector)
                    .run_if(in_state(SessionState::GridActive))
                    .run_if(resource_exists::<GridSession>),
                systems::marker_labels.run_if(resource_exists::<GridSession>),
                systems::notice_window,
            ),
        );
    }
}
