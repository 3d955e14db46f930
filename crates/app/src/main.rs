//! Drape - 3D garment customizer with decal placement

use bevy::prelude::*;
use bevy::window::WindowResolution;
use drape_config::DrapeConfig;
use drape_scene::DrapeScenePlugin;

mod bridge;
mod config;

use bridge::StdioBridgePlugin;
use config::BridgeMode;

fn main() -> AppExit {
    let config = match DrapeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("drape: {e}");
            return AppExit::error();
        }
    };
    let bridge_mode = BridgeMode::from_env();

    let display = &config.viewer.display;
    let mut resolution = WindowResolution::new(display.width, display.height);
    if let Some(scale) = display.scale_factor {
        resolution = resolution.with_scale_factor_override(scale);
    }
    let window_config = Window {
        title: display.title.clone(),
        resolution,
        present_mode: bevy::window::PresentMode::AutoVsync,
        ..default()
    };

    let mut app = App::new();

    app.insert_resource(bridge_mode).add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(window_config),
                ..default()
            })
            .set(bevy::log::LogPlugin {
                level: bevy::log::Level::INFO,
                ..default()
            }),
    );

    info!(
        "Starting Drape with model {} ({:?} bridge)",
        config.engine.assets.model_path, bridge_mode
    );
    app.add_plugins(DrapeScenePlugin { config });

    if bridge_mode == BridgeMode::Stdio {
        app.add_plugins(StdioBridgePlugin);
    }

    app.run()
}
