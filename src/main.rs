//! Hex base builder on a top-down map.
//!
//! Click the map to set a base, Tab opens the world inspector, WASD walks the
//! simulated user, arrow keys and the mouse wheel move the view.

use bevy::app::AppExit;
use bevy::prelude::*;
#[cfg(feature = "native")]
use bevy::remote::{RemotePlugin, http::RemoteHttpPlugin};
use bevy_inspector_egui::quick::WorldInspectorPlugin;
#[cfg(feature = "native")]
use clap::Parser;

use hex_base::grid::{GridConfig, GridPlugin};
use hex_base::map_view::{MapViewConfig, MapViewPlugin};
use hex_base::prompt::{PromptConfig, PromptPlugin};
use hex_base::ui::UiPlugin;
use hex_base::walker::{WalkerConfig, WalkerPlugin};
#[cfg(feature = "native")]
use hex_base::GeoPoint;
use hex_base::{InspectorState, SessionState};

/// Hex base builder
#[cfg(feature = "native")]
#[derive(Parser, Debug)]
#[command(name = "hex-base")]
#[command(about = "Claim hexagons around a base on a real street map")]
struct Args {
    /// Latitude of the simulated geolocation fix
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the simulated geolocation fix
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Latitude the map opens at (defaults to the fix)
    #[arg(long, requires = "center_lng", allow_negative_numbers = true)]
    center_lat: Option<f64>,

    /// Longitude the map opens at (defaults to the fix)
    #[arg(long, requires = "center_lat", allow_negative_numbers = true)]
    center_lng: Option<f64>,

    /// H3 resolution of the grid
    #[arg(long)]
    resolution: Option<u8>,

    /// k-ring radius of the grid
    #[arg(long)]
    radius: Option<u32>,

    /// Overpass interpreter endpoint
    #[arg(long)]
    overpass_url: Option<String>,

    /// Do not fetch roads
    #[arg(long)]
    offline: bool,
}

struct Configs {
    map: MapViewConfig,
    walker: WalkerConfig,
    grid: GridConfig,
}

#[cfg(feature = "native")]
fn configs() -> Configs {
    let args = Args::parse();

    let fix = args.lat.zip(args.lng).map(|(lat, lng)| GeoPoint::new(lat, lng));
    let center = args
        .center_lat
        .zip(args.center_lng)
        .map(|(lat, lng)| GeoPoint::new(lat, lng));

    let mut map = MapViewConfig::default();
    if let Some(center) = center.or(fix) {
        map.center = center;
    }

    let mut grid = GridConfig::default();
    if let Some(resolution) = args.resolution {
        grid.session.resolution = resolution;
    }
    if let Some(radius) = args.radius {
        grid.session.radius = radius;
    }
    if let Some(url) = args.overpass_url {
        grid.roads.endpoint = url;
    }
    grid.roads.offline = args.offline;

    Configs {
        map,
        walker: WalkerConfig {
            initial: fix,
            ..default()
        },
        grid,
    }
}

#[cfg(not(feature = "native"))]
fn configs() -> Configs {
    Configs {
        map: MapViewConfig::default(),
        walker: WalkerConfig::default(),
        grid: GridConfig::default(),
    }
}

fn main() {
    let configs = configs();
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Base".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<SessionState>()
    .register_type::<InspectorState>()
    .init_state::<SessionState>()
    .init_state::<InspectorState>();

    #[cfg(feature = "native")]
    app.add_plugins(RemotePlugin::default())
        .add_plugins(RemoteHttpPlugin::default());

    app.add_plugins(bevy_egui::EguiPlugin::default())
        .add_plugins(UiPlugin)
        .add_plugins(MapViewPlugin(configs.map))
        .add_plugins(WalkerPlugin(configs.walker))
        .add_plugins(PromptPlugin(PromptConfig::default()))
        .add_plugins(GridPlugin(configs.grid))
        .add_systems(Update, exit_on_esc)
        .add_systems(Update, toggle_inspector)
        .add_plugins(WorldInspectorPlugin::new().run_if(in_state(InspectorState::Visible)));

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<InspectorState>>,
    mut next: ResMut<NextState<InspectorState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(match state.get() {
            InspectorState::Hidden => InspectorState::Visible,
            InspectorState::Visible => InspectorState::Hidden,
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
