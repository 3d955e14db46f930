//! Authoritative render resources of a customization session.
//!
//! The engine owns every primitive, texture, patch geometry and patch here
//! and records each mutation as a [`SceneChange`]. A renderer drains the
//! queue once per frame and mirrors it into GPU resources; dispose changes
//! tell it when to drop them. Nothing outside this module hands out ids, so
//! a disposed id is never reused within a session.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use glam::Vec3;
use image::RgbaImage;
use tracing::debug;

use crate::constants::{DECAL_DEPTH_BIAS, TEXTURE_ANISOTROPY};
use crate::mesh::MeshPrimitive;
use crate::projection::PatchGeometry;
use crate::types::{DecalId, RegionId, Rgb};

/// Garment primitive handle (index in the imported model)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveId(pub u32);

/// Texture handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// Patch geometry handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub u64);

/// Identifies the single patch of a decal
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchKey {
    pub region: RegionId,
    pub decal: DecalId,
}

impl PatchKey {
    pub fn new(region: RegionId, decal: DecalId) -> Self {
        Self { region, decal }
    }
}

/// How a texture is sampled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    /// UV multiplier
    pub repeat: [f32; 2],
    /// Repeat outside 0..1 instead of clamping to the edge
    pub wrap: bool,
    pub anisotropy: u16,
}

impl Default for SamplerSettings {
    /// Clamped, unrepeated sampling used for decal images
    fn default() -> Self {
        Self {
            repeat: [1.0, 1.0],
            wrap: false,
            anisotropy: TEXTURE_ANISOTROPY,
        }
    }
}

/// sRGB RGBA8 pixels plus sampler
#[derive(Debug, Clone)]
pub struct TextureData {
    pub label: String,
    pub image: Arc<RgbaImage>,
    pub sampler: SamplerSettings,
}

/// Surface of a garment primitive
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialState {
    pub color: Rgb,
    pub texture: Option<TextureId>,
    pub roughness: f32,
    pub metalness: f32,
}

impl MaterialState {
    pub fn with_color(color: Rgb) -> Self {
        Self {
            color,
            texture: None,
            roughness: 0.5,
            metalness: 0.0,
        }
    }
}

/// Material of a decal patch: textured, blended over the garment
#[derive(Debug, Clone, PartialEq)]
pub struct PatchMaterial {
    pub texture: TextureId,
    /// Alpha blended; blended patches skip depth writes and draw after opaque geometry
    pub transparent: bool,
    pub double_sided: bool,
    /// Positive values pull the patch toward the camera
    pub depth_bias: f32,
}

impl PatchMaterial {
    pub fn decal(texture: TextureId) -> Self {
        Self {
            texture,
            transparent: true,
            double_sided: true,
            depth_bias: DECAL_DEPTH_BIAS,
        }
    }
}

/// A projected decal: geometry plus material
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub geometry: GeometryId,
    pub material: PatchMaterial,
}

/// Model root placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub translation: Vec3,
    pub scale: f32,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

impl ModelTransform {
    pub fn matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            glam::Quat::IDENTITY,
            self.translation,
        )
    }
}

/// Viewport size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Camera aspect ratio, 1.0 before the first resize
    pub fn aspect(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// One mutation of the scene graph
#[derive(Debug, Clone)]
pub enum SceneChange {
    PrimitiveAdded {
        id: PrimitiveId,
        mesh: Arc<MeshPrimitive>,
        material: MaterialState,
    },
    MaterialChanged {
        id: PrimitiveId,
        material: MaterialState,
    },
    PrimitiveRemoved(PrimitiveId),
    TextureCreated {
        id: TextureId,
        data: TextureData,
    },
    TextureDisposed(TextureId),
    GeometryCreated {
        id: GeometryId,
        geometry: Arc<PatchGeometry>,
    },
    GeometryDisposed(GeometryId),
    PatchUpserted {
        key: PatchKey,
        patch: Patch,
    },
    PatchRemoved(PatchKey),
    ModelTransformChanged(ModelTransform),
    ViewportResized(Viewport),
}

#[derive(Debug, Clone)]
struct PrimitiveNode {
    mesh: Arc<MeshPrimitive>,
    material: MaterialState,
}

/// Every live render resource of a session
#[derive(Debug, Default)]
pub struct SceneGraph {
    primitives: BTreeMap<PrimitiveId, PrimitiveNode>,
    textures: HashMap<TextureId, TextureData>,
    geometries: HashMap<GeometryId, Arc<PatchGeometry>>,
    patches: HashMap<PatchKey, Patch>,
    model: ModelTransform,
    viewport: Viewport,
    next_id: u64,
    changes: Vec<SceneChange>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // --- primitives ---

    pub fn add_primitive(&mut self, id: PrimitiveId, mesh: Arc<MeshPrimitive>, material: MaterialState) {
        self.changes.push(SceneChange::PrimitiveAdded {
            id,
            mesh: Arc::clone(&mesh),
            material: material.clone(),
        });
        self.primitives.insert(id, PrimitiveNode { mesh, material });
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&MeshPrimitive> {
        self.primitives.get(&id).map(|node| node.mesh.as_ref())
    }

    pub fn material(&self, id: PrimitiveId) -> Option<&MaterialState> {
        self.primitives.get(&id).map(|node| &node.material)
    }

    /// Mutate a primitive's material; emits a change only when it differs
    pub fn update_material(&mut self, id: PrimitiveId, f: impl FnOnce(&mut MaterialState)) {
        let Some(node) = self.primitives.get_mut(&id) else {
            debug!("update_material: unknown primitive {:?}", id);
            return;
        };
        let before = node.material.clone();
        f(&mut node.material);
        if node.material != before {
            self.changes.push(SceneChange::MaterialChanged {
                id,
                material: node.material.clone(),
            });
        }
    }

    pub fn primitive_ids(&self) -> impl Iterator<Item = PrimitiveId> + '_ {
        self.primitives.keys().copied()
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    // --- textures ---

    pub fn create_texture(&mut self, data: TextureData) -> TextureId {
        let id = TextureId(self.allocate_id());
        self.changes.push(SceneChange::TextureCreated {
            id,
            data: data.clone(),
        });
        self.textures.insert(id, data);
        id
    }

    /// Dispose a texture; returns false if it was already gone
    pub fn dispose_texture(&mut self, id: TextureId) -> bool {
        if self.textures.remove(&id).is_none() {
            return false;
        }
        self.changes.push(SceneChange::TextureDisposed(id));
        true
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureData> {
        self.textures.get(&id)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    // --- patches ---

    /// Insert or replace the patch for `key`.
    ///
    /// A replaced patch's geometry is disposed; the texture is only swapped,
    /// since decal textures are owned by the decal.
    pub fn upsert_patch(&mut self, key: PatchKey, geometry: PatchGeometry, texture: TextureId) -> GeometryId {
        let geometry_id = GeometryId(self.allocate_id());
        let geometry = Arc::new(geometry);
        self.changes.push(SceneChange::GeometryCreated {
            id: geometry_id,
            geometry: Arc::clone(&geometry),
        });
        self.geometries.insert(geometry_id, geometry);

        let patch = Patch {
            geometry: geometry_id,
            material: PatchMaterial::decal(texture),
        };
        self.changes.push(SceneChange::PatchUpserted {
            key: key.clone(),
            patch: patch.clone(),
        });
        if let Some(old) = self.patches.insert(key, patch) {
            self.dispose_geometry(old.geometry);
        }
        geometry_id
    }

    /// Remove a patch and dispose its geometry
    pub fn remove_patch(&mut self, key: &PatchKey) -> Option<Patch> {
        let patch = self.patches.remove(key)?;
        self.changes.push(SceneChange::PatchRemoved(key.clone()));
        self.dispose_geometry(patch.geometry);
        Some(patch)
    }

    fn dispose_geometry(&mut self, id: GeometryId) {
        if self.geometries.remove(&id).is_some() {
            self.changes.push(SceneChange::GeometryDisposed(id));
        }
    }

    pub fn patch(&self, key: &PatchKey) -> Option<&Patch> {
        self.patches.get(key)
    }

    pub fn patch_geometry(&self, key: &PatchKey) -> Option<&PatchGeometry> {
        let patch = self.patches.get(key)?;
        self.geometries.get(&patch.geometry).map(Arc::as_ref)
    }

    pub fn patch_keys(&self) -> impl Iterator<Item = &PatchKey> {
        self.patches.keys()
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    // --- model & viewport ---

    pub fn set_model_transform(&mut self, transform: ModelTransform) {
        if self.model != transform {
            self.model = transform;
            self.changes.push(SceneChange::ModelTransformChanged(transform));
        }
    }

    pub fn model_transform(&self) -> ModelTransform {
        self.model
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.changes.push(SceneChange::ViewportResized(viewport));
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    // --- lifecycle ---

    /// Dispose every remaining resource (patches, geometry, textures, primitives)
    pub fn clear(&mut self) {
        let keys: Vec<PatchKey> = self.patches.keys().cloned().collect();
        for key in keys {
            self.remove_patch(&key);
        }
        let orphaned: Vec<GeometryId> = self.geometries.keys().copied().collect();
        for id in orphaned {
            self.dispose_geometry(id);
        }
        let textures: Vec<TextureId> = self.textures.keys().copied().collect();
        for id in textures {
            self.dispose_texture(id);
        }
        let primitives: Vec<PrimitiveId> = self.primitives.keys().copied().collect();
        for id in primitives {
            self.primitives.remove(&id);
            self.changes.push(SceneChange::PrimitiveRemoved(id));
        }
    }

    /// True when no render resource is alive
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
            && self.textures.is_empty()
            && self.geometries.is_empty()
            && self.patches.is_empty()
    }

    /// Take every change recorded since the last drain
    pub fn drain_changes(&mut self) -> Vec<SceneChange> {
        std::mem::take(&mut self.changes)
    }
}
