//! Drape garment engine - decal placement on 3D garments
//!
//! This crate is the renderer-agnostic core of the customizer:
//! - [`region`] - Classify mesh primitives into garment regions
//! - [`mesh`] - Imported garment geometry and bounds
//! - [`projection`] - Clip garment triangles into decal patch geometry
//! - [`transform`] - Decal transforms and their bounds
//! - [`interaction`] - Drag and wheel gestures on the selected decal
//! - [`debounce`] - Coalescing of patch regeneration
//! - [`fabric`] - Procedural fabric rasters and their cache
//! - [`scene_graph`] - Authoritative render resources and the change queue
//! - [`engine`] - [`DecalEngine`], which ties everything together
//!
//! Nothing here depends on Bevy. A renderer drains [`SceneChange`]s and
//! mirrors them; asset loading happens elsewhere and is fed back through
//! [`DecalEngine::on_model_loaded`] and [`DecalEngine::on_image_loaded`].

pub mod constants;
pub mod data_url;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod fabric;
pub mod interaction;
pub mod mesh;
pub mod pricing;
pub mod projection;
pub mod region;
pub mod scene_graph;
pub mod transform;
pub mod types;

pub use constants::*;
pub use debounce::Debouncer;
pub use engine::{DecalEngine, ImageRequest, ImageSource, ImageTicket, LoadTicket};
pub use error::{CaptureError, EngineError, ProjectionError};
pub use fabric::FabricTextureCache;
pub use mesh::{Aabb, GarmentModel, MeshPrimitive};
pub use projection::{PatchGeometry, Projector};
pub use region::{RegionCatalog, RegionIndex};
pub use scene_graph::{
    GeometryId, MaterialState, ModelTransform, Patch, PatchKey, PatchMaterial, PrimitiveId,
    SamplerSettings, SceneChange, SceneGraph, TextureData, TextureId, Viewport,
};
pub use transform::DecalTransform;
pub use types::*;
