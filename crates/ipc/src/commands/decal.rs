//! Decal creation and transform commands.

use serde::{Deserialize, Serialize};

use crate::error::IpcError;

/// Image source for a new decal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecalUpload {
    /// Uploaded file contents, base64 encoded (a `data:` URL is also accepted)
    Upload {
        data: String,
        file_name: Option<String>,
    },
    /// Design library entry; relative URLs are resolved against the library base URL
    Library { id: String, name: String, url: String },
}

/// Request to place a new decal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDecalRequest {
    /// Target region; the active region when omitted
    pub region: Option<String>,
    pub source: DecalUpload,
}

/// Transform axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index (x = 0, y = 1, z = 2)
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = IpcError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Axis::ALL.get(index).copied().ok_or(IpcError::InvalidAxis(index))
    }
}

/// Slider edits applied to the selected decal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransformCommand {
    SetOffset { axis: Axis, value: f32 },
    /// Rotation in degrees; the engine stores radians
    SetRotation { axis: Axis, degrees: f32 },
    SetScale { value: f32 },
}
