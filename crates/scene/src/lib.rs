//! Bevy viewer for Drape
//!
//! Hosts the [`DecalEngine`] inside a Bevy app: the engine stays the single
//! owner of customization state and the scene graph, and this crate mirrors
//! its [`garment::SceneChange`]s into meshes, materials and images every frame.
//!
//! UI hosts talk to the engine through [`InboundUiMessages`] and read replies
//! from [`OutboundUiMessages`].

use std::time::Instant;

use bevy::app::AppExit;
use bevy::prelude::*;
use drape_config::DrapeConfig;
use drape_ipc::{EngineToUi, UiToEngine};
use garment::DecalEngine;

mod camera;
mod capture;
mod input;
mod lighting;
mod loading;
mod studio;
mod sync;

pub use camera::{CameraControllerPlugin, MainCamera, OrbitCamera};
pub use capture::{CapturePlugin, CaptureQueue, CAPTURE_DEADLINE_FRAMES};
pub use input::{PointerInputPlugin, MOUSE_POINTER_ID};
pub use lighting::{LightingPlugin, StudioLight};
pub use loading::{AssetLoaderResource, LoadingPlugin};
pub use studio::{StudioPlatform, StudioPlugin};
pub use sync::{ModelRoot, SceneEntities, SceneSyncPlugin};

/// The engine owned by the render loop
#[derive(Resource)]
pub struct EngineResource(pub DecalEngine);

/// Commands queued by the UI host, applied once per frame
#[derive(Resource, Default)]
pub struct InboundUiMessages {
    messages: Vec<UiToEngine>,
}

impl InboundUiMessages {
    pub fn push(&mut self, msg: UiToEngine) {
        self.messages.push(msg);
    }

    pub fn drain(&mut self) -> Vec<UiToEngine> {
        std::mem::take(&mut self.messages)
    }
}

/// Resource for messages to send to the UI
#[derive(Resource, Default)]
pub struct OutboundUiMessages {
    messages: Vec<EngineToUi>,
}

impl OutboundUiMessages {
    pub fn send(&mut self, msg: EngineToUi) {
        self.messages.push(msg);
    }

    pub fn drain(&mut self) -> Vec<EngineToUi> {
        std::mem::take(&mut self.messages)
    }
}

/// Per-frame ordering of the viewer systems
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum DrapeSet {
    /// Apply finished asset loads
    Loads,
    /// Pointer input and UI commands
    Input,
    /// Release debounced work and publish state
    Engine,
    /// Mirror scene changes into Bevy
    Sync,
}

/// Viewer plugin: studio scene, camera, engine hosting and synchronization
pub struct DrapeScenePlugin {
    pub config: DrapeConfig,
}

impl Plugin for DrapeScenePlugin {
    fn build(&self, app: &mut App) {
        let engine = DecalEngine::new(self.config.engine.clone());

        app.insert_resource(self.config.clone())
            .insert_resource(EngineResource(engine))
            .init_resource::<InboundUiMessages>()
            .init_resource::<OutboundUiMessages>()
            .configure_sets(
                Update,
                (DrapeSet::Loads, DrapeSet::Input, DrapeSet::Engine, DrapeSet::Sync).chain(),
            )
            .add_plugins((
                StudioPlugin,
                LightingPlugin,
                CameraControllerPlugin,
                LoadingPlugin,
                PointerInputPlugin,
                CapturePlugin,
                SceneSyncPlugin,
            ))
            .add_systems(
                Update,
                (
                    advance_engine,
                    forward_engine_messages.after(advance_engine),
                )
                    .in_set(DrapeSet::Engine),
            )
            .add_systems(Last, (teardown_on_exit, sync::sync_scene_graph).chain());
    }
}

/// Release due debounced regenerations and emit the frame's state snapshot
fn advance_engine(mut engine: ResMut<EngineResource>) {
    if !engine.0.frame(Instant::now()) {
        trace!("Engine torn down; frame skipped");
    }
}

fn forward_engine_messages(
    mut engine: ResMut<EngineResource>,
    mut outbound: ResMut<OutboundUiMessages>,
) {
    for msg in engine.0.drain_outbound() {
        outbound.send(msg);
    }
}

/// Dispose every engine resource when the app is shutting down
fn teardown_on_exit(mut exit: MessageReader<AppExit>, mut engine: ResMut<EngineResource>) {
    if exit.read().next().is_none() {
        return;
    }
    if engine.0.is_alive() {
        info!("App exiting; tearing down customization session");
        engine.0.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_queues_drain() {
        let mut inbound = InboundUiMessages::default();
        inbound.push(UiToEngine::CaptureRender);
        inbound.push(UiToEngine::DeselectDecal);
        assert_eq!(inbound.drain().len(), 2);
        assert!(inbound.drain().is_empty());

        let mut outbound = OutboundUiMessages::default();
        outbound.send(EngineToUi::RenderDownloaded { path: None });
        assert_eq!(outbound.drain(), vec![EngineToUi::RenderDownloaded { path: None }]);
    }
}
