//! Decal placement, removal, image completion and patch projection.

use std::fmt::Display;
use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, info, warn};

use super::{DecalEngine, ImageRequest, ImageSource, ImageTicket};
use crate::data_url::{decode_upload, resolve_library_url};
use crate::error::EngineError;
use crate::projection::{project_decal, Projector};
use crate::scene_graph::{PatchKey, SamplerSettings, TextureData, TextureId};
use crate::transform::DecalTransform;
use crate::types::{Decal, DecalId, DecalSource, RegionId};

impl DecalEngine {
    /// Place a new decal and select it.
    ///
    /// The decal goes to `region`, or to the active region when `None`. Its
    /// target region becomes the active region. The image is requested from
    /// the host; the patch appears once the image has been decoded.
    pub fn add_decal(
        &mut self,
        region: Option<RegionId>,
        source: DecalSource,
        name: Option<String>,
    ) -> Result<DecalId, EngineError> {
        self.ensure_alive()?;
        let region = match region {
            Some(region) => region,
            None => self.active_region.clone().ok_or(EngineError::NoActiveRegion)?,
        };
        let transform = DecalTransform::from(self.config.initial_transform(region.as_str()))
            .clamped(&self.config.bounds);

        self.decal_sequence += 1;
        let id = DecalId::from_sequence(self.decal_sequence);
        let image_source = match &source {
            DecalSource::Inline { bytes, .. } => ImageSource::Bytes(Arc::clone(bytes)),
            DecalSource::Remote { url, .. } => ImageSource::Url(url.clone()),
        };

        let state = self.region_state_mut(&region)?;
        state
            .decals
            .push(Decal::new(id.clone(), source, transform, name));
        let count = state.decals.len();

        let key = PatchKey::new(region.clone(), id.clone());
        self.image_requests.push(ImageRequest {
            ticket: ImageTicket {
                generation: self.generation,
                key,
            },
            source: image_source,
        });

        self.section = drape_ipc::ActiveSection::Region(region.to_string());
        self.active_region = Some(region.clone());
        self.selected_decal = Some(id.clone());
        self.drag = None;
        self.dirty = true;

        info!("Added decal {} to {} ({} in region)", id, region, count);
        Ok(id)
    }

    /// Place an uploaded image (base64 or `data:` URL)
    pub fn add_upload(
        &mut self,
        region: Option<RegionId>,
        data: &str,
        file_name: Option<String>,
    ) -> Result<DecalId, EngineError> {
        let bytes = decode_upload(data)?;
        let source = DecalSource::Inline {
            bytes: Arc::from(bytes),
            file_name: file_name.clone(),
        };
        self.add_decal(region, source, file_name)
    }

    /// Place a design from the library, resolving relative URLs
    pub fn add_library_design(
        &mut self,
        region: Option<RegionId>,
        library_id: &str,
        name: &str,
        url: &str,
    ) -> Result<DecalId, EngineError> {
        let url = resolve_library_url(url, self.config.assets.library_base_url.as_deref());
        let source = DecalSource::Remote {
            library_id: library_id.to_string(),
            url,
        };
        self.add_decal(region, source, Some(name.to_string()))
    }

    /// Remove one decal and release its patch and texture.
    ///
    /// When it was the region's last decal the active fabric is re-applied
    /// to the region.
    pub fn remove_decal(&mut self, region: &RegionId, decal: &DecalId) -> Result<(), EngineError> {
        let state = self.region_state_mut(region)?;
        let position = state
            .decals
            .iter()
            .position(|d| &d.id == decal)
            .ok_or_else(|| EngineError::UnknownDecal(decal.to_string()))?;
        let removed = state.decals.remove(position);
        let now_empty = state.decals.is_empty();

        self.dispose_decal(&PatchKey::new(region.clone(), removed.id), removed.texture);
        if self.active_region.as_ref() == Some(region) && self.selected_decal.as_ref() == Some(decal) {
            self.selected_decal = None;
        }
        if now_empty {
            self.apply_fabric(std::slice::from_ref(region));
        }
        self.dirty = true;

        info!("Removed decal {} from {}", decal, region);
        Ok(())
    }

    /// Remove every decal of a region. Returns how many were removed.
    pub fn clear_decals(&mut self, region: &RegionId) -> Result<usize, EngineError> {
        let decals = std::mem::take(&mut self.region_state_mut(region)?.decals);
        let count = decals.len();
        for decal in decals {
            self.dispose_decal(&PatchKey::new(region.clone(), decal.id), decal.texture);
        }

        self.selected_decal = None;
        self.apply_fabric(std::slice::from_ref(region));
        self.dirty = true;

        info!("Cleared {} decals from {}", count, region);
        Ok(count)
    }

    /// Apply a decoded (or failed) decal image.
    ///
    /// Completions from a previous session or for decals that were removed
    /// in the meantime are dropped.
    pub fn on_image_loaded<E: Display>(&mut self, ticket: ImageTicket, result: Result<RgbaImage, E>) {
        if !self.accepts(ticket.generation) {
            debug!("Dropping image completion for {:?} from generation {}", ticket.key, ticket.generation);
            return;
        }
        if self.decal(&ticket.key).is_none() {
            debug!("Dropping image for removed decal {}", ticket.key.decal);
            return;
        }

        let image = match result {
            Ok(image) => image,
            Err(e) => {
                warn!("Failed to load image for decal {}: {}", ticket.key.decal, e);
                return;
            }
        };

        let texture = self.scene.create_texture(TextureData {
            label: format!("decal:{}", ticket.key.decal),
            image: Arc::new(image),
            sampler: SamplerSettings::default(),
        });
        let previous = self
            .decal_mut(&ticket.key)
            .and_then(|decal| decal.texture.replace(texture));
        if let Some(previous) = previous {
            self.scene.dispose_texture(previous);
        }

        self.project_decal(&ticket.key);
        self.dirty = true;
    }

    /// Rebuild the patch of one decal from its current transform.
    ///
    /// No-op while the decal image is pending or when the region owns no
    /// primitives.
    pub(crate) fn project_decal(&mut self, key: &PatchKey) {
        if !self.alive {
            return;
        }
        let Some(decal) = self.decal(key) else {
            debug!("project_decal: decal {} no longer exists", key.decal);
            return;
        };
        let Some(texture) = decal.texture else {
            debug!("project_decal: image for {} not ready", key.decal);
            return;
        };
        let transform = decal.transform;

        let Some(primitive_id) = self.index.first_primitive(&key.region) else {
            debug!("project_decal: region {} has no primitives", key.region);
            return;
        };
        let Some(primitive) = self.scene.primitive(primitive_id) else {
            debug!("project_decal: primitive {:?} not in scene", primitive_id);
            return;
        };
        let model_matrix = self.scene.model_transform().matrix();
        let Some(bounds) = primitive.bounds() else {
            debug!("project_decal: primitive {} is empty", primitive.name);
            return;
        };
        let anchor = bounds.transformed(&model_matrix).center();
        let projector = Projector::from_decal(anchor, &transform);

        match project_decal(primitive, model_matrix, &projector) {
            Ok(geometry) => {
                debug!(
                    "Projected decal {} onto {}: {} triangles",
                    key.decal,
                    key.region,
                    geometry.triangle_count()
                );
                self.scene.upsert_patch(key.clone(), geometry, texture);
            }
            Err(e) => warn!("Failed to project decal {}: {}", key.decal, e),
        }
    }

    /// Rebuild every decal patch
    pub(crate) fn reproject_all(&mut self) {
        let keys: Vec<PatchKey> = self
            .regions
            .iter()
            .flat_map(|r| {
                r.decals
                    .iter()
                    .map(|d| PatchKey::new(r.id.clone(), d.id.clone()))
            })
            .collect();
        for key in &keys {
            self.debouncer.cancel_key(key);
            self.project_decal(key);
        }
    }

    /// Release the render resources of a decal that has left the state.
    pub(crate) fn dispose_decal(&mut self, key: &PatchKey, texture: Option<TextureId>) {
        self.debouncer.cancel_key(key);
        if self.drag.as_ref().is_some_and(|drag| &drag.target == key) {
            self.drag = None;
        }
        self.scene.remove_patch(key);
        if let Some(texture) = texture {
            self.scene.dispose_texture(texture);
        }
        debug!("Disposed decal {}", key.decal);
    }
}

#[cfg(test)]
mod tests {
    use drape_config::EngineConfig;
    use drape_ipc::ActiveSection;

    use super::super::test_support::*;
    use super::*;
    use crate::scene_graph::SceneChange;

    #[test]
    fn test_add_selects_and_activates_region() {
        let mut engine = loaded_engine();
        let key = add_ready_decal(&mut engine, "gala");
        assert_eq!(engine.active_region(), Some(&RegionId::from("gala")));
        assert_eq!(engine.selected_decal(), Some(&key.decal));
        assert_eq!(engine.active_section(), &ActiveSection::Region("gala".to_string()));
        assert!(engine.scene().patch(&key).is_some());
    }

    #[test]
    fn test_patch_waits_for_image() {
        let mut engine = loaded_engine();
        let id = engine
            .add_upload(None, "AQID", Some("a.png".to_string()))
            .unwrap();
        let key = PatchKey::new(RegionId::from("front"), id);
        assert!(engine.scene().patch(&key).is_none());

        let requests = engine.take_image_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].source, ImageSource::Bytes(Arc::from(vec![1u8, 2, 3])));
        engine.on_image_loaded::<String>(requests[0].ticket.clone(), Ok(decal_image()));
        assert!(engine.scene().patch(&key).is_some());
    }

    #[test]
    fn test_image_failure_creates_nothing() {
        let mut engine = loaded_engine();
        engine.add_upload(None, "AQID", None).unwrap();
        let request = engine.take_image_requests().remove(0);
        engine.on_image_loaded(request.ticket, Err("corrupt image"));
        assert_eq!(engine.scene().patch_count(), 0);
        // Only the fabric texture exists
        assert_eq!(engine.scene().texture_count(), 1);
    }

    #[test]
    fn test_library_url_resolution() {
        let mut engine = loaded_engine();
        engine
            .add_library_design(None, "lib-1", "Paisley", "/designs/paisley.png")
            .unwrap();
        let request = engine.take_image_requests().remove(0);
        assert_eq!(
            request.source,
            ImageSource::Url("http://localhost:5000/designs/paisley.png".to_string())
        );
    }

    #[test]
    fn test_remove_disposes_resources() {
        let mut engine = loaded_engine();
        let key = add_ready_decal(&mut engine, "front");
        let texture = engine.decal(&key).unwrap().texture.unwrap();
        let geometry = engine.scene().patch(&key).unwrap().geometry;
        engine.drain_scene_changes();

        engine.remove_decal(&key.region, &key.decal).unwrap();
        assert!(engine.scene().patch(&key).is_none());
        assert!(engine.scene().texture(texture).is_none());
        assert_eq!(engine.selected_decal(), None);

        let changes = engine.drain_scene_changes();
        assert!(changes.iter().any(|c| matches!(c, SceneChange::TextureDisposed(t) if *t == texture)));
        assert!(changes.iter().any(|c| matches!(c, SceneChange::GeometryDisposed(g) if *g == geometry)));
    }

    #[test]
    fn test_remove_unknown_decal() {
        let mut engine = loaded_engine();
        let result = engine.remove_decal(&RegionId::from("front"), &DecalId::from_sequence(42));
        assert!(matches!(result, Err(EngineError::UnknownDecal(_))));
    }

    #[test]
    fn test_late_image_for_removed_decal_dropped() {
        let mut engine = loaded_engine();
        let id = engine.add_upload(None, "AQID", None).unwrap();
        let request = engine.take_image_requests().remove(0);
        engine.remove_decal(&RegionId::from("front"), &id).unwrap();

        engine.on_image_loaded::<String>(request.ticket, Ok(decal_image()));
        assert_eq!(engine.scene().patch_count(), 0);
        assert_eq!(engine.scene().texture_count(), 1);
    }

    #[test]
    fn test_region_without_primitives_is_noop() {
        let mut engine = DecalEngine::new(EngineConfig::default());
        let ticket = engine.begin_model_load("garment.glb").unwrap();
        // Only a front panel; the back region owns nothing
        let model = crate::mesh::GarmentModel::new(vec![panel(
            "Front",
            glam::Vec3::ZERO,
            1.0,
        )]);
        engine.on_model_loaded::<String>(ticket, Ok(model));

        let key = add_ready_decal(&mut engine, "back");
        assert!(engine.decal(&key).unwrap().texture.is_some());
        assert!(engine.scene().patch(&key).is_none());
    }

    #[test]
    fn test_reprojection_keeps_single_patch() {
        let mut engine = loaded_engine();
        let key = add_ready_decal(&mut engine, "front");
        for _ in 0..3 {
            engine.reproject_all();
        }
        assert_eq!(engine.scene().patch_count(), 1);
        assert_eq!(engine.scene().geometry_count(), 1);
    }
}
