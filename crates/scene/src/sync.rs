//! Mirrors the engine's scene graph into Bevy entities and assets
//!
//! Every [`SceneChange`] drained from the engine maps to one Bevy operation:
//! creations add meshes, materials and images, dispose changes remove the
//! assets and despawn their entities. Garment primitives are children of the
//! [`ModelRoot`] so the fit transform applies to them; decal patches are
//! already in world space and live at the top level.

use std::collections::HashMap;

use bevy::asset::RenderAssetUsages;
use bevy::image::{ImageAddressMode, ImageFilterMode, ImageSampler, ImageSamplerDescriptor};
use bevy::math::Affine2;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use garment::{
    GeometryId, MaterialState, MeshPrimitive, ModelTransform, PatchGeometry, PatchKey,
    PatchMaterial, PrimitiveId, SceneChange, TextureData, TextureId,
};

use crate::{DrapeSet, EngineResource};

/// Parent of every garment primitive; carries the fit transform
#[derive(Component)]
pub struct ModelRoot;

/// Garment primitive entity
#[derive(Component, Debug, Clone, Copy)]
pub struct GarmentPrimitive(pub PrimitiveId);

/// Decal patch entity
#[derive(Component, Debug, Clone)]
pub struct DecalPatch(pub PatchKey);

#[derive(Debug, Clone)]
struct SyncedTexture {
    handle: Handle<Image>,
    repeat: Vec2,
}

#[derive(Debug, Clone)]
struct SyncedEntity {
    entity: Entity,
    material: Handle<StandardMaterial>,
    /// Owned mesh; patch meshes are owned by their geometry entry
    mesh: Option<Handle<Mesh>>,
}

/// Bevy handles for every live engine resource
#[derive(Resource, Default)]
pub struct SceneEntities {
    root: Option<Entity>,
    primitives: HashMap<PrimitiveId, SyncedEntity>,
    textures: HashMap<TextureId, SyncedTexture>,
    geometries: HashMap<GeometryId, Handle<Mesh>>,
    patches: HashMap<PatchKey, SyncedEntity>,
}

impl SceneEntities {
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    pub fn patch_entity(&self, key: &PatchKey) -> Option<Entity> {
        self.patches.get(key).map(|p| p.entity)
    }
}

pub struct SceneSyncPlugin;

impl Plugin for SceneSyncPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneEntities>()
            .add_systems(Update, sync_scene_graph.in_set(DrapeSet::Sync));
    }
}

/// Build a render mesh for a garment primitive
fn primitive_mesh(primitive: &MeshPrimitive) -> Mesh {
    let positions: Vec<[f32; 3]> = primitive.positions.iter().map(|p| p.to_array()).collect();
    let normals: Vec<[f32; 3]> = primitive.normals.iter().map(|n| n.to_array()).collect();
    let uvs: Vec<[f32; 2]> = if primitive.uvs.len() == primitive.positions.len() {
        primitive.uvs.iter().map(|uv| uv.to_array()).collect()
    } else {
        // Textured materials need UV0 even when the model has none
        vec![[0.0, 0.0]; primitive.positions.len()]
    };

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(primitive.indices.clone()));
    mesh
}

/// Build a render mesh for a decal patch (unindexed triangle list)
fn patch_mesh(geometry: &PatchGeometry) -> Mesh {
    let positions: Vec<[f32; 3]> = geometry.positions.iter().map(|p| p.to_array()).collect();
    let normals: Vec<[f32; 3]> = geometry.normals.iter().map(|n| n.to_array()).collect();
    let uvs: Vec<[f32; 2]> = geometry.uvs.iter().map(|uv| uv.to_array()).collect();

    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh
}

/// Upload sRGB pixels with the engine's sampler settings
fn texture_image(data: &TextureData) -> Image {
    let (width, height) = data.image.dimensions();
    let mut image = Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data.image.as_raw().clone(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    );

    let address_mode = if data.sampler.wrap {
        ImageAddressMode::Repeat
    } else {
        ImageAddressMode::ClampToEdge
    };
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        label: Some(data.label.clone()),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        mag_filter: ImageFilterMode::Linear,
        min_filter: ImageFilterMode::Linear,
        mipmap_filter: ImageFilterMode::Linear,
        anisotropy_clamp: data.sampler.anisotropy.max(1),
        ..default()
    });
    image
}

fn garment_material(state: &MaterialState, texture: Option<&SyncedTexture>) -> StandardMaterial {
    let [r, g, b] = state.color.to_srgb_f32();
    StandardMaterial {
        base_color: Color::srgb(r, g, b),
        base_color_texture: texture.map(|t| t.handle.clone()),
        uv_transform: texture.map_or(Affine2::IDENTITY, |t| Affine2::from_scale(t.repeat)),
        perceptual_roughness: state.roughness,
        metallic: state.metalness,
        ..default()
    }
}

fn patch_material(material: &PatchMaterial, texture: Option<&SyncedTexture>) -> StandardMaterial {
    StandardMaterial {
        base_color: Color::WHITE,
        base_color_texture: texture.map(|t| t.handle.clone()),
        alpha_mode: if material.transparent {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        },
        double_sided: material.double_sided,
        cull_mode: if material.double_sided {
            None
        } else {
            Some(bevy::render::render_resource::Face::Back)
        },
        depth_bias: material.depth_bias,
        perceptual_roughness: 0.8,
        ..default()
    }
}

fn model_root_transform(transform: &ModelTransform) -> Transform {
    Transform::from_translation(Vec3::from_array(transform.translation.to_array()))
        .with_scale(Vec3::splat(transform.scale))
}

/// Drain the engine's scene changes and apply them
pub(crate) fn sync_scene_graph(
    mut commands: Commands,
    mut engine: ResMut<EngineResource>,
    mut synced: ResMut<SceneEntities>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    mut roots: Query<&mut Transform, With<ModelRoot>>,
) {
    let changes = engine.0.drain_scene_changes();
    if changes.is_empty() {
        return;
    }
    trace!("Applying {} scene changes", changes.len());

    let root = match synced.root {
        Some(root) => root,
        None => {
            let root = commands
                .spawn((ModelRoot, Transform::default(), Visibility::default(), Name::new("Garment")))
                .id();
            synced.root = Some(root);
            root
        }
    };

    for change in changes {
        match change {
            SceneChange::PrimitiveAdded { id, mesh, material } => {
                let texture = material.texture.and_then(|t| synced.textures.get(&t));
                let material_handle = materials.add(garment_material(&material, texture));
                let mesh_handle = meshes.add(primitive_mesh(&mesh));
                let entity = commands
                    .spawn((
                        Mesh3d(mesh_handle.clone()),
                        MeshMaterial3d(material_handle.clone()),
                        Transform::default(),
                        GarmentPrimitive(id),
                        Name::new(mesh.name.clone()),
                        ChildOf(root),
                    ))
                    .id();
                synced.primitives.insert(
                    id,
                    SyncedEntity {
                        entity,
                        material: material_handle,
                        mesh: Some(mesh_handle),
                    },
                );
            }
            SceneChange::MaterialChanged { id, material } => {
                let Some(primitive) = synced.primitives.get(&id) else {
                    warn!("Material change for unknown primitive {:?}", id);
                    continue;
                };
                let texture = material.texture.and_then(|t| synced.textures.get(&t));
                if let Some(target) = materials.get_mut(&primitive.material) {
                    *target = garment_material(&material, texture);
                }
            }
            SceneChange::PrimitiveRemoved(id) => {
                if let Some(primitive) = synced.primitives.remove(&id) {
                    commands.entity(primitive.entity).despawn();
                    materials.remove(&primitive.material);
                    if let Some(mesh) = primitive.mesh {
                        meshes.remove(&mesh);
                    }
                }
            }
            SceneChange::TextureCreated { id, data } => {
                let handle = images.add(texture_image(&data));
                debug!("Uploaded texture {} ({:?})", data.label, id);
                synced.textures.insert(
                    id,
                    SyncedTexture {
                        handle,
                        repeat: Vec2::from_array(data.sampler.repeat),
                    },
                );
            }
            SceneChange::TextureDisposed(id) => {
                if let Some(texture) = synced.textures.remove(&id) {
                    images.remove(&texture.handle);
                }
            }
            SceneChange::GeometryCreated { id, geometry } => {
                synced.geometries.insert(id, meshes.add(patch_mesh(&geometry)));
            }
            SceneChange::GeometryDisposed(id) => {
                if let Some(handle) = synced.geometries.remove(&id) {
                    meshes.remove(&handle);
                }
            }
            SceneChange::PatchUpserted { key, patch } => {
                let Some(mesh) = synced.geometries.get(&patch.geometry).cloned() else {
                    warn!("Patch {} references unknown geometry", key.decal);
                    continue;
                };
                let texture = synced.textures.get(&patch.material.texture);
                let material = patch_material(&patch.material, texture);

                if let Some(existing) = synced.patches.get(&key) {
                    if let Some(target) = materials.get_mut(&existing.material) {
                        *target = material;
                    }
                    commands.entity(existing.entity).insert(Mesh3d(mesh));
                    continue;
                }

                let material_handle = materials.add(material);
                let entity = commands
                    .spawn((
                        Mesh3d(mesh),
                        MeshMaterial3d(material_handle.clone()),
                        Transform::default(),
                        DecalPatch(key.clone()),
                        Name::new(format!("decal {}/{}", key.region, key.decal)),
                    ))
                    .id();
                synced.patches.insert(
                    key,
                    SyncedEntity {
                        entity,
                        material: material_handle,
                        mesh: None,
                    },
                );
            }
            SceneChange::PatchRemoved(key) => {
                if let Some(patch) = synced.patches.remove(&key) {
                    commands.entity(patch.entity).despawn();
                    materials.remove(&patch.material);
                }
            }
            SceneChange::ModelTransformChanged(transform) => {
                let target = model_root_transform(&transform);
                match roots.get_mut(root) {
                    Ok(mut current) => *current = target,
                    // Root spawned this frame; commands have not been applied yet
                    Err(_) => {
                        commands.entity(root).insert(target);
                    }
                }
            }
            SceneChange::ViewportResized(viewport) => {
                debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use drape_config::EngineConfig;
    use garment::{DecalEngine, DecalSource, GarmentModel, RegionId, SamplerSettings};
    use image::{Rgba, RgbaImage};

    use super::*;

    fn quad(name: &str, z: f32) -> MeshPrimitive {
        let positions = vec![
            glam::Vec3::new(-0.5, -0.5, z),
            glam::Vec3::new(0.5, -0.5, z),
            glam::Vec3::new(0.5, 0.5, z),
            glam::Vec3::new(-0.5, 0.5, z),
        ];
        MeshPrimitive::new(name, positions, vec![], vec![], vec![0, 1, 2, 0, 2, 3]).unwrap()
    }

    fn loaded_engine() -> DecalEngine {
        let mut engine = DecalEngine::new(EngineConfig::default());
        let ticket = engine.begin_model_load("garment.glb").unwrap();
        let model = GarmentModel::new(vec![quad("Kurta_Front", 0.1), quad("Kurta_Back", -0.1)]);
        engine.on_model_loaded::<String>(ticket, Ok(model));
        engine
    }

    fn sync_app(engine: DecalEngine) -> App {
        let mut app = App::new();
        app.insert_resource(EngineResource(engine))
            .init_resource::<SceneEntities>()
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<Assets<Image>>()
            .add_systems(Update, sync_scene_graph);
        app
    }

    #[test]
    fn test_primitive_mesh_fills_missing_uvs() {
        let mesh = primitive_mesh(&quad("panel", 0.0));
        assert_eq!(mesh.count_vertices(), 4);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_some());
        assert_eq!(mesh.indices().map(|i| i.len()), Some(6));
    }

    #[test]
    fn test_texture_sampler_follows_settings() {
        let data = TextureData {
            label: "fabric".to_string(),
            image: Arc::new(RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 255]))),
            sampler: SamplerSettings {
                repeat: [4.0, 4.0],
                wrap: true,
                anisotropy: 8,
            },
        };
        let image = texture_image(&data);
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 2);
        let ImageSampler::Descriptor(descriptor) = &image.sampler else {
            panic!("expected explicit sampler");
        };
        assert_eq!(descriptor.address_mode_u, ImageAddressMode::Repeat);
        assert_eq!(descriptor.anisotropy_clamp, 8);
    }

    #[test]
    fn test_patch_material_blends() {
        let decal = PatchMaterial::decal(TextureId(3));
        let material = patch_material(&decal, None);
        assert!(matches!(material.alpha_mode, AlphaMode::Blend));
        assert!(material.double_sided);
        assert!(material.cull_mode.is_none());
        assert_eq!(material.depth_bias, decal.depth_bias);

        let opaque = PatchMaterial {
            transparent: false,
            double_sided: false,
            ..decal
        };
        let material = patch_material(&opaque, None);
        assert!(matches!(material.alpha_mode, AlphaMode::Opaque));
        assert!(material.cull_mode.is_some());
    }

    #[test]
    fn test_sync_mirrors_engine_and_disposal() {
        let mut app = sync_app(loaded_engine());
        app.update();

        let synced = app.world().resource::<SceneEntities>();
        assert_eq!(synced.primitive_count(), 2);
        // The active fabric texture
        assert_eq!(synced.texture_count(), 1);
        assert_eq!(app.world().resource::<Assets<StandardMaterial>>().len(), 2);

        {
            let mut engine = app.world_mut().resource_mut::<EngineResource>();
            let id = engine
                .0
                .add_decal(
                    Some(RegionId::from("front")),
                    DecalSource::Inline {
                        bytes: Arc::from(vec![0u8; 4]),
                        file_name: None,
                    },
                    None,
                )
                .unwrap();
            let request = engine.0.take_image_requests().remove(0);
            assert_eq!(request.ticket.key.decal, id);
            let image = RgbaImage::from_pixel(4, 4, Rgba([200, 20, 20, 255]));
            engine.0.on_image_loaded::<String>(request.ticket, Ok(image));
        }
        app.update();

        let synced = app.world().resource::<SceneEntities>();
        assert_eq!(synced.patch_count(), 1);
        assert_eq!(synced.geometry_count(), 1);
        assert_eq!(synced.texture_count(), 2);

        app.world_mut().resource_mut::<EngineResource>().0.teardown();
        app.update();

        let synced = app.world().resource::<SceneEntities>();
        assert_eq!(synced.primitive_count(), 0);
        assert_eq!(synced.patch_count(), 0);
        assert_eq!(synced.texture_count(), 0);
        assert_eq!(synced.geometry_count(), 0);
        assert_eq!(app.world().resource::<Assets<Image>>().len(), 0);
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 0);
        assert_eq!(app.world().resource::<Assets<StandardMaterial>>().len(), 0);
    }
}
