//! Model loading, fit, the frame tick and teardown.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;

use drape_ipc::{EngineToUi, ModelStatus};
use glam::Vec3;
use tracing::{debug, error, info, warn};

use super::{DecalEngine, LoadTicket};
use crate::constants::MODEL_LOAD_FAILED_MESSAGE;
use crate::error::EngineError;
use crate::mesh::GarmentModel;
use crate::scene_graph::{MaterialState, ModelTransform, PatchKey, PrimitiveId, Viewport};
use crate::types::Rgb;

impl DecalEngine {
    /// Start loading the garment model at `path`.
    ///
    /// The host performs the load and reports back with
    /// [`DecalEngine::on_model_loaded`] using the returned ticket.
    pub fn begin_model_load(&mut self, path: &str) -> Result<LoadTicket, EngineError> {
        self.ensure_alive()?;
        match &self.status {
            ModelStatus::Failed { message } => {
                return Err(EngineError::ModelUnavailable(message.clone()));
            }
            ModelStatus::Ready => {
                return Err(EngineError::ModelUnavailable("model already loaded".to_string()));
            }
            ModelStatus::Idle | ModelStatus::Loading => {}
        }

        info!("Loading garment model from {}", path);
        self.set_status(ModelStatus::Loading);
        Ok(LoadTicket {
            generation: self.generation,
        })
    }

    /// Apply the result of a model load.
    ///
    /// Stale tickets and completions that arrive after the model settled are
    /// ignored. A failure is terminal for the session.
    pub fn on_model_loaded<E: Display>(&mut self, ticket: LoadTicket, result: Result<GarmentModel, E>) {
        if !self.accepts(ticket.generation) {
            debug!("Dropping model completion from generation {}", ticket.generation);
            return;
        }
        if self.status != ModelStatus::Loading {
            debug!("Ignoring model completion while {:?}", self.status);
            return;
        }

        match result {
            Ok(model) => self.install_model(model),
            Err(e) => {
                error!("Failed to load garment model: {}", e);
                self.set_status(ModelStatus::Failed {
                    message: MODEL_LOAD_FAILED_MESSAGE.to_string(),
                });
            }
        }
    }

    fn install_model(&mut self, model: GarmentModel) {
        let triangles = model.triangle_count();
        let primitives: Vec<(PrimitiveId, _)> = model
            .primitives
            .into_iter()
            .enumerate()
            .map(|(i, p)| (PrimitiveId(i as u32), p))
            .collect();

        self.index = self
            .catalog
            .build_index(primitives.iter().map(|(id, p)| (*id, p.name.as_str())));
        if !self.index.unclassified().is_empty() {
            debug!(
                "{} primitives belong to no region",
                self.index.unclassified().len()
            );
        }

        for (id, primitive) in primitives {
            self.scene
                .add_primitive(id, Arc::new(primitive), MaterialState::with_color(Rgb::WHITE));
        }
        self.apply_model_transform();

        // Lowest priority first so the first matching region's color wins on
        // shared primitives
        let region_ids: Vec<_> = self.catalog.ids().collect();
        for region in region_ids.iter().rev() {
            self.apply_region_color(region);
        }
        self.apply_fabric(&region_ids);
        self.reproject_all();

        info!(
            "Garment model ready: {} primitives, {} triangles",
            self.scene.primitive_count(),
            triangles
        );
        self.set_status(ModelStatus::Ready);
    }

    /// Scale the garment to `percent` of its base fit.
    ///
    /// Existing patches are rebuilt right away so decals stay on the surface.
    pub fn set_fit_adjustment(&mut self, percent: f32) -> Result<(), EngineError> {
        if !percent.is_finite() || percent <= 0.0 {
            return Err(EngineError::InvalidFit(percent));
        }
        self.fit_percent = percent;
        self.apply_model_transform();
        self.reproject_all();
        self.dirty = true;
        Ok(())
    }

    fn apply_model_transform(&mut self) {
        let fit = &self.config.fit;
        self.scene.set_model_transform(ModelTransform {
            translation: Vec3::new(0.0, fit.model_offset_y, 0.0),
            scale: fit.scale_for(self.fit_percent),
        });
    }

    /// Advance the session to `now`.
    ///
    /// Releases a due debounced regeneration and publishes a state snapshot
    /// when something observable changed. Returns `false` once torn down.
    pub fn frame(&mut self, now: Instant) -> bool {
        if !self.alive {
            return false;
        }
        self.now = now;

        if let Some(key) = self.debouncer.poll(now) {
            self.project_decal(&key);
        }

        if self.dirty {
            self.dirty = false;
            let snapshot = self.snapshot();
            self.outbound.push(EngineToUi::StateChanged(snapshot));
        }
        true
    }

    /// Track the viewport size. Zero sizes (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.scene.resize(Viewport { width, height });
    }

    /// Release every resource of the session.
    ///
    /// Safe to call more than once. Completions issued before teardown are
    /// dropped when they arrive.
    pub fn teardown(&mut self) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.generation += 1;
        self.debouncer.cancel();
        self.drag = None;
        self.image_requests.clear();

        let mut disposed = 0usize;
        for region in 0..self.regions.len() {
            let decals = std::mem::take(&mut self.regions[region].decals);
            let region_id = self.regions[region].id.clone();
            for decal in decals {
                let key = PatchKey::new(region_id.clone(), decal.id);
                self.dispose_decal(&key, decal.texture);
                disposed += 1;
            }
        }
        self.selected_decal = None;

        for texture in self.fabric_textures.drain() {
            self.scene.dispose_texture(texture);
        }
        self.scene.clear();
        if !self.scene.is_empty() {
            warn!("Scene graph not empty after teardown");
        }
        self.last_frame = None;

        info!("Decal engine torn down ({} decals disposed)", disposed);
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn model_status(&self) -> &ModelStatus {
        &self.status
    }

    pub(crate) fn set_status(&mut self, status: ModelStatus) {
        self.status = status.clone();
        self.outbound.push(EngineToUi::ModelStatusChanged(status));
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use drape_config::EngineConfig;

    use super::super::test_support::*;
    use super::*;
    use crate::scene_graph::SceneChange;
    use crate::types::RegionId;

    #[test]
    fn test_model_load_classifies_and_readies() {
        let engine = loaded_engine();
        assert_eq!(engine.model_status(), &ModelStatus::Ready);
        assert_eq!(engine.scene().primitive_count(), 5);
        assert_eq!(engine.region_index().primitives(&RegionId::from("front")).len(), 1);
        assert_eq!(engine.region_index().primitives(&RegionId::from("bazo")).len(), 1);

        let transform = engine.scene().model_transform();
        assert!((transform.scale - 1.1).abs() < 1e-6);
        assert!((transform.translation.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_model_load_applies_fabric_and_color() {
        let engine = loaded_engine();
        let front = engine.region_index().first_primitive(&RegionId::from("front")).unwrap();
        let material = engine.scene().material(front).unwrap();
        assert!(material.texture.is_some());
        assert_eq!(
            Some(material.color),
            engine.region_color(&RegionId::from("front"))
        );
    }

    #[test]
    fn test_model_failure_is_terminal() {
        let mut engine = DecalEngine::new(EngineConfig::default());
        let ticket = engine.begin_model_load("missing.glb").unwrap();
        engine.on_model_loaded(ticket, Err("file not found"));
        assert_eq!(
            engine.model_status(),
            &ModelStatus::Failed {
                message: MODEL_LOAD_FAILED_MESSAGE.to_string()
            }
        );
        assert!(matches!(
            engine.begin_model_load("missing.glb"),
            Err(EngineError::ModelUnavailable(_))
        ));

        // A late success for the same ticket is ignored
        engine.on_model_loaded::<String>(ticket, Ok(garment()));
        assert_eq!(engine.scene().primitive_count(), 0);
    }

    #[test]
    fn test_fit_rescales_and_reprojects() {
        let mut engine = loaded_engine();
        let key = add_ready_decal(&mut engine, "front");
        let before = engine.scene().patch(&key).unwrap().geometry;

        engine.set_fit_adjustment(110.0).unwrap();
        assert!((engine.scene().model_transform().scale - 1.21).abs() < 1e-5);
        let after = engine.scene().patch(&key).unwrap().geometry;
        assert_ne!(before, after);
        assert_eq!(engine.scene().patch_count(), 1);

        assert!(matches!(
            engine.set_fit_adjustment(0.0),
            Err(EngineError::InvalidFit(_))
        ));
    }

    #[test]
    fn test_frame_emits_snapshot_once() {
        let mut engine = loaded_engine();
        let now = Instant::now();
        engine.set_fit_adjustment(95.0).unwrap();
        assert!(engine.frame(now));
        let messages = engine.drain_outbound();
        assert_eq!(
            messages
                .iter()
                .filter(|m| matches!(m, EngineToUi::StateChanged(_)))
                .count(),
            1
        );
        assert!(engine.frame(now + Duration::from_millis(16)));
        assert!(engine.drain_outbound().is_empty());
    }

    #[test]
    fn test_resize_ignores_zero() {
        let mut engine = loaded_engine();
        engine.resize(800, 600);
        engine.resize(0, 600);
        assert_eq!(engine.scene().viewport(), Viewport { width: 800, height: 600 });
    }

    #[test]
    fn test_teardown_disposes_everything() {
        let mut engine = loaded_engine();
        add_ready_decal(&mut engine, "front");
        add_ready_decal(&mut engine, "back");
        engine.drain_scene_changes();

        engine.teardown();
        assert!(engine.scene().is_empty());
        assert_eq!(engine.total_decals(), 0);
        assert!(!engine.frame(Instant::now()));

        let changes = engine.drain_scene_changes();
        let disposed_textures = changes
            .iter()
            .filter(|c| matches!(c, SceneChange::TextureDisposed(_)))
            .count();
        // Two decal images plus the active fabric
        assert_eq!(disposed_textures, 3);

        // Idempotent
        engine.teardown();
        assert!(engine.drain_scene_changes().is_empty());
    }
}
