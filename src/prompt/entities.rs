use bevy::prelude::*;

/// Countdown until the base prompt is shown.
#[derive(Resource)]
pub struct PromptTimer(pub Timer);

impl PromptTimer {
    pub(super) fn new(delay_secs: f32) -> Self {
        Self(Timer::from_seconds(delay_secs, TimerMode::Once))
    }
}
