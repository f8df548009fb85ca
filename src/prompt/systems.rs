use bevy::prelude::*;

use super::BASE_PROMPT;
use super::entities::PromptTimer;
use crate::SessionState;
use crate::ui::Notices;

/// Shows the prompt once the delay has passed and arms the base click.
pub fn prompt_for_base(
    time: Res<Time>,
    mut timer: ResMut<PromptTimer>,
    mut notices: ResMut<Notices>,
    mut next: ResMut<NextState<SessionState>>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    notices.push(BASE_PROMPT);
    next.set(SessionState::AwaitingBaseClick);
}
