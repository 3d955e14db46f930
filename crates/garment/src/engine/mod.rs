//! The decal engine: one customization session.
//!
//! [`DecalEngine`] owns the observable customization state (regions, decals,
//! colors, fabric, selection) and the authoritative [`SceneGraph`]. It is
//! single-threaded and driven by the host's render loop:
//!
//! 1. Commands arrive via [`DecalEngine::handle_command`] or the typed methods
//! 2. Asset loads are requested through [`LoadTicket`]s and [`ImageRequest`]s
//!    and completed with `on_model_loaded` / `on_image_loaded`
//! 3. [`DecalEngine::frame`] releases debounced work and publishes state
//! 4. The renderer drains [`SceneChange`]s and outbound UI messages
//!
//! Every asynchronous request carries the session generation. Teardown bumps
//! it, so completions that arrive late are recognized and dropped.

mod commands;
mod controls;
mod decals;
mod lifecycle;
mod output;
mod surface;

use std::sync::Arc;
use std::time::{Duration, Instant};

use drape_config::EngineConfig;
use drape_ipc::{ActiveSection, EngineToUi, ModelStatus};
use image::RgbaImage;
use tracing::warn;

use crate::debounce::Debouncer;
use crate::error::EngineError;
use crate::fabric::FabricTextureCache;
use crate::interaction::DragState;
use crate::region::{RegionCatalog, RegionIndex};
use crate::scene_graph::{PatchKey, SceneChange, SceneGraph};
use crate::types::{Decal, DecalId, RegionId, Rgb};

/// Identifies a model load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
}

/// Identifies a decal image load request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTicket {
    pub generation: u64,
    pub key: PatchKey,
}

/// Where the host should read a decal image from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Bytes(Arc<[u8]>),
    Url(String),
}

/// A decal image the host must fetch and decode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub ticket: ImageTicket,
    pub source: ImageSource,
}

/// Per-region customization state
#[derive(Debug, Clone)]
pub(crate) struct RegionState {
    pub(crate) id: RegionId,
    pub(crate) color: Rgb,
    /// Display order
    pub(crate) decals: Vec<Decal>,
}

/// Garment customization engine
pub struct DecalEngine {
    pub(crate) config: EngineConfig,
    pub(crate) catalog: RegionCatalog,
    /// Same order as `catalog`
    pub(crate) regions: Vec<RegionState>,
    /// Primitive ownership, empty until the model loads
    pub(crate) index: RegionIndex,
    pub(crate) scene: SceneGraph,
    pub(crate) fabric_id: String,
    pub(crate) fabric_textures: FabricTextureCache,
    pub(crate) fit_percent: f32,
    pub(crate) section: ActiveSection,
    pub(crate) active_region: Option<RegionId>,
    pub(crate) selected_decal: Option<DecalId>,
    pub(crate) status: ModelStatus,
    pub(crate) generation: u64,
    pub(crate) debouncer: Debouncer<PatchKey>,
    pub(crate) drag: Option<DragState>,
    /// Time of the latest frame
    pub(crate) now: Instant,
    pub(crate) image_requests: Vec<ImageRequest>,
    pub(crate) outbound: Vec<EngineToUi>,
    /// Observable state changed since the last published snapshot
    pub(crate) dirty: bool,
    pub(crate) last_frame: Option<Arc<RgbaImage>>,
    pub(crate) alive: bool,
    pub(crate) decal_sequence: u64,
}

impl DecalEngine {
    /// Create an engine for a new session.
    ///
    /// Every region starts with the first palette color, the first fabric is
    /// active and the first region is the active region.
    pub fn new(config: EngineConfig) -> Self {
        let catalog = RegionCatalog::new(&config.regions);
        let initial_color = config
            .palette
            .first()
            .and_then(|c| match Rgb::from_hex(&c.value) {
                Ok(rgb) => Some(rgb),
                Err(e) => {
                    warn!("Ignoring palette color: {}", e);
                    None
                }
            })
            .unwrap_or(Rgb::WHITE);

        let regions = catalog
            .ids()
            .map(|id| RegionState {
                id,
                color: initial_color,
                decals: Vec::new(),
            })
            .collect();

        let fabric_id = config
            .fabrics
            .first()
            .map(|f| f.id.clone())
            .unwrap_or_default();
        let active_region = catalog.ids().next();
        let debounce = Duration::from_millis(config.interaction.debounce_ms);
        let fit_percent = config.fit.default_percent;

        Self {
            config,
            catalog,
            regions,
            index: RegionIndex::default(),
            scene: SceneGraph::new(),
            fabric_id,
            fabric_textures: FabricTextureCache::new(),
            fit_percent,
            section: ActiveSection::Fabric,
            active_region,
            selected_decal: None,
            status: ModelStatus::Idle,
            generation: 0,
            debouncer: Debouncer::new(debounce),
            drag: None,
            now: Instant::now(),
            image_requests: Vec::new(),
            outbound: Vec::new(),
            dirty: true,
            last_frame: None,
            alive: true,
            decal_sequence: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    /// Primitive ownership of the loaded model
    pub fn region_index(&self) -> &RegionIndex {
        &self.index
    }

    /// Authoritative render resources
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn active_section(&self) -> &ActiveSection {
        &self.section
    }

    pub fn active_region(&self) -> Option<&RegionId> {
        self.active_region.as_ref()
    }

    pub fn selected_decal(&self) -> Option<&DecalId> {
        self.selected_decal.as_ref()
    }

    pub fn active_fabric_id(&self) -> &str {
        &self.fabric_id
    }

    pub fn fit_percent(&self) -> f32 {
        self.fit_percent
    }

    /// Current color of a region
    pub fn region_color(&self, region: &RegionId) -> Option<Rgb> {
        self.region_state(region).ok().map(|r| r.color)
    }

    /// Decals of a region in display order
    pub fn decals(&self, region: &RegionId) -> &[Decal] {
        self.region_state(region)
            .map(|r| r.decals.as_slice())
            .unwrap_or(&[])
    }

    pub fn decal(&self, key: &PatchKey) -> Option<&Decal> {
        self.region_state(&key.region)
            .ok()?
            .decals
            .iter()
            .find(|d| d.id == key.decal)
    }

    /// Decals across every region
    pub fn total_decals(&self) -> usize {
        self.regions.iter().map(|r| r.decals.len()).sum()
    }

    /// Take every scene change recorded since the last call
    pub fn drain_scene_changes(&mut self) -> Vec<SceneChange> {
        self.scene.drain_changes()
    }

    /// Take every message queued for the UI
    pub fn drain_outbound(&mut self) -> Vec<EngineToUi> {
        std::mem::take(&mut self.outbound)
    }

    /// Take every pending decal image request
    pub fn take_image_requests(&mut self) -> Vec<ImageRequest> {
        std::mem::take(&mut self.image_requests)
    }

    pub(crate) fn region_state(&self, region: &RegionId) -> Result<&RegionState, EngineError> {
        self.regions
            .iter()
            .find(|r| &r.id == region)
            .ok_or_else(|| EngineError::UnknownRegion(region.to_string()))
    }

    pub(crate) fn region_state_mut(&mut self, region: &RegionId) -> Result<&mut RegionState, EngineError> {
        self.regions
            .iter_mut()
            .find(|r| &r.id == region)
            .ok_or_else(|| EngineError::UnknownRegion(region.to_string()))
    }

    pub(crate) fn decal_mut(&mut self, key: &PatchKey) -> Option<&mut Decal> {
        self.region_state_mut(&key.region)
            .ok()?
            .decals
            .iter_mut()
            .find(|d| d.id == key.decal)
    }

    pub(crate) fn region_has_decals(&self, region: &RegionId) -> bool {
        self.region_state(region)
            .map(|r| !r.decals.is_empty())
            .unwrap_or(false)
    }

    /// Patch key of the selected decal
    pub(crate) fn selected_key(&self) -> Option<PatchKey> {
        let region = self.active_region.clone()?;
        let decal = self.selected_decal.clone()?;
        Some(PatchKey::new(region, decal))
    }

    pub(crate) fn ensure_alive(&self) -> Result<(), EngineError> {
        if self.alive {
            Ok(())
        } else {
            Err(EngineError::TornDown)
        }
    }

    /// True for requests issued by the current, live session
    pub(crate) fn accepts(&self, generation: u64) -> bool {
        self.alive && generation == self.generation
    }
}
