//! Startup prompt asking the player to pick a base.
//!
//! Waits a short delay after launch, shows the instruction and moves the
//! session from [`SessionState::Uninitialized`] to
//! [`SessionState::AwaitingBaseClick`].

mod entities;
mod systems;

pub use entities::PromptTimer;

use bevy::prelude::*;

use crate::SessionState;

/// Message shown when the player should click the map.
pub const BASE_PROMPT: &str = "Please click on the map to set your base location.";

/// Per-plugin configuration for the startup prompt.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct PromptConfig {
    /// Delay before the prompt appears (seconds).
    pub delay_secs: f32,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { delay_secs: 0.5 }
    }
}

/// Delayed base-location prompt.
pub struct PromptPlugin(pub PromptConfig);

impl Plugin for PromptPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PromptConfig>()
            .insert_resource(self.0.clone())
            .insert_resource(PromptTimer::new(self.0.delay_secs))
            .add_systems(
                Update,
                systems::prompt_for_base.run_if(in_state(SessionState::Uninitialized)),
            );
    }
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;
    use crate::ui::Notices;

    fn app(delay_secs: f32) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<SessionState>()
            .init_resource::<Notices>()
            .add_plugins(PromptPlugin(PromptConfig { delay_secs }));
        app
    }

    #[test]
    fn prompt_arms_the_base_click() {
        let mut app = app(0.0);
        app.update();
        app.update();
        assert_eq!(
            app.world().resource::<State<SessionState>>().get(),
            &SessionState::AwaitingBaseClick
        );
        assert_eq!(app.world().resource::<Notices>().current(), Some(BASE_PROMPT));
        assert_eq!(app.world().resource::<Notices>().len(), 1);
    }

    #[test]
    fn prompt_waits_for_the_delay() {
        let mut app = app(3600.0);
        app.update();
        app.update();
        assert_eq!(
            app.world().resource::<State<SessionState>>().get(),
            &SessionState::Uninitialized
        );
        assert!(app.world().resource::<Notices>().is_empty());
    }
}
