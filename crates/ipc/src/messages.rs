//! Main IPC message enums for communication between the engine and UI.

use serde::{Deserialize, Serialize};

use crate::commands::{AddDecalRequest, PointerCommand, TransformCommand};
use crate::error::IpcError;
use crate::types::{ActiveSection, CapturedRender, CartLineItem, CustomizationState, ModelStatus};

/// Messages from the engine to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineToUi {
    /// Observable state changed since the last frame
    StateChanged(CustomizationState),

    /// Garment model load progressed
    ModelStatusChanged(ModelStatus),

    /// Response to `CaptureRender`
    RenderCaptured(CapturedRender),

    /// Response to `DownloadRender`; `path` is `None` when no frame was available
    RenderDownloaded { path: Option<String> },

    /// Response to `RequestCartItem`
    CartItem(CartLineItem),

    /// A command was rejected
    Error { code: String, message: String },
}

/// Messages from the UI to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToEngine {
    /// Switch editor panel; selecting a region makes it the active region
    SelectSection(ActiveSection),

    /// Place a decal and select it
    AddDecal(AddDecalRequest),

    RemoveDecal { region: String, decal_id: String },

    /// Remove every decal of a region
    ClearDecals { region: String },

    /// Select a decal of the active region
    SelectDecal { decal_id: String },

    DeselectDecal,

    /// Recolor a region; the active region when `region` is omitted
    SetRegionColor { region: Option<String>, color: String },

    SetFabric { fabric_id: String },

    /// Garment fit percentage (100 = base size)
    SetFit { percent: f32 },

    Pointer(PointerCommand),

    Transform(TransformCommand),

    CaptureRender,

    /// Write the current render as a PNG into `directory` (working directory when omitted)
    DownloadRender { directory: Option<String> },

    RequestCartItem,
}

impl EngineToUi {
    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl UiToEngine {
    /// Parse a command from a JSON string
    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        if json.trim().is_empty() {
            return Err(IpcError::InvalidFormat("empty message".to_string()));
        }
        Ok(serde_json::from_str(json)?)
    }
}
