//! Customization view-model.
//!
//! These structures are snapshots for display. The engine keeps its own
//! authoritative scene graph and rebuilds a [`CustomizationState`] whenever
//! something observable changes.

use serde::{Deserialize, Serialize};

/// Which editor panel is active.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "region", rename_all = "snake_case")]
pub enum ActiveSection {
    /// Fabric picker; no region is being decorated
    #[default]
    Fabric,
    /// A garment region by id
    Region(String),
}

impl ActiveSection {
    /// Region id when a region section is active
    pub fn region(&self) -> Option<&str> {
        match self {
            ActiveSection::Fabric => None,
            ActiveSection::Region(id) => Some(id),
        }
    }
}

/// Garment model loading status.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Terminal for the session
    Failed { message: String },
}

/// Where a decal image came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRef {
    /// User upload held in memory
    Upload { file_name: Option<String> },
    /// Design library entry
    Library { id: String, url: String },
}

/// Offset, Euler rotation (radians, XYZ) and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformView {
    pub offset: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: f32,
}

/// A decal as shown in the region's design list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecalView {
    pub id: String,
    pub name: Option<String>,
    pub source: ImageRef,
    pub transform: TransformView,
    /// The decal image has been decoded and projected
    pub ready: bool,
}

/// A garment region with its color and decals in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionView {
    pub id: String,
    pub label: String,
    pub description: String,
    /// `#RRGGBB`
    pub color: String,
    pub primitive_count: usize,
    pub decals: Vec<DecalView>,
}

/// A selectable fabric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricView {
    pub id: String,
    pub name: String,
    pub price: u32,
}

/// Complete observable customization state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomizationState {
    pub model: ModelStatus,
    pub active_section: ActiveSection,
    pub active_region: Option<String>,
    pub selected_decal: Option<String>,
    pub active_fabric: String,
    pub fabrics: Vec<FabricView>,
    pub fit_percent: f32,
    pub regions: Vec<RegionView>,
    pub price: u32,
    pub summary: String,
}

impl CustomizationState {
    /// Total decals across every region
    pub fn decal_count(&self) -> usize {
        self.regions.iter().map(|r| r.decals.len()).sum()
    }

    /// Look up a region view by id
    pub fn region(&self, id: &str) -> Option<&RegionView> {
        self.regions.iter().find(|r| r.id == id)
    }
}
