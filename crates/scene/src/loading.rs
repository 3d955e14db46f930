//! Bridges the engine's load tickets to the background asset loader.

use bevy::prelude::*;
use drape_assets::AssetLoader;
use drape_config::DrapeConfig;

use crate::{DrapeSet, EngineResource};

/// Reported to the engine when the loader runtime could not start
const LOADER_UNAVAILABLE: &str = "asset loader is not running";

/// Background loader owned by the app
#[derive(Resource)]
pub struct AssetLoaderResource(pub AssetLoader);

pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        match AssetLoader::new() {
            Ok(loader) => {
                app.insert_resource(AssetLoaderResource(loader));
            }
            Err(e) => error!("Failed to start asset loader: {}", e),
        }

        app.add_systems(Startup, start_model_load)
            .add_systems(Update, apply_load_completions.in_set(DrapeSet::Loads))
            .add_systems(Update, queue_image_loads.in_set(DrapeSet::Engine));
    }
}

fn start_model_load(
    config: Res<DrapeConfig>,
    mut engine: ResMut<EngineResource>,
    loader: Option<Res<AssetLoaderResource>>,
) {
    let path = config.engine.assets.model_path.clone();
    let ticket = match engine.0.begin_model_load(&path) {
        Ok(ticket) => ticket,
        Err(e) => {
            warn!("Model load not started: {}", e);
            return;
        }
    };

    match loader {
        Some(loader) => loader.0.load_model(ticket, path),
        None => engine
            .0
            .on_model_loaded::<&str>(ticket, Err(LOADER_UNAVAILABLE)),
    }
}

/// Hand finished loads to the engine
fn apply_load_completions(
    mut engine: ResMut<EngineResource>,
    loader: Option<ResMut<AssetLoaderResource>>,
) {
    let Some(mut loader) = loader else {
        return;
    };
    for completion in loader.0.drain() {
        completion.apply(&mut engine.0);
    }
}

/// Start fetching every image the engine asked for this frame
fn queue_image_loads(
    mut engine: ResMut<EngineResource>,
    loader: Option<Res<AssetLoaderResource>>,
) {
    let requests = engine.0.take_image_requests();
    if requests.is_empty() {
        return;
    }

    match loader {
        Some(loader) => loader.0.load_images(requests),
        None => {
            for request in requests {
                engine
                    .0
                    .on_image_loaded::<&str>(request.ticket, Err(LOADER_UNAVAILABLE));
            }
        }
    }
}
