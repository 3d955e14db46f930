//! Error types for the garment engine.

use thiserror::Error;

/// Errors returned by [`crate::DecalEngine`] operations.
///
/// These are caller mistakes (unknown ids, malformed input). Asynchronous
/// failures such as image decoding are logged instead of returned.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown region '{0}'")]
    UnknownRegion(String),

    #[error("Unknown fabric '{0}'")]
    UnknownFabric(String),

    #[error("Unknown decal '{0}'")]
    UnknownDecal(String),

    #[error("Invalid color '{0}': expected #RRGGBB or #RGB")]
    InvalidColor(String),

    #[error("No region is active")]
    NoActiveRegion,

    #[error("No decal is selected")]
    NoSelection,

    #[error("Invalid fit percentage {0}")]
    InvalidFit(f32),

    #[error("Invalid image data: {0}")]
    InvalidImageData(String),

    #[error("Garment model is unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Engine has been torn down")]
    TornDown,

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl EngineError {
    /// Stable machine-readable code for UI error messages
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::UnknownRegion(_) => "unknown_region",
            EngineError::UnknownFabric(_) => "unknown_fabric",
            EngineError::UnknownDecal(_) => "unknown_decal",
            EngineError::InvalidColor(_) => "invalid_color",
            EngineError::NoActiveRegion => "no_active_region",
            EngineError::NoSelection => "no_selection",
            EngineError::InvalidFit(_) => "invalid_fit",
            EngineError::InvalidImageData(_) => "invalid_image_data",
            EngineError::ModelUnavailable(_) => "model_unavailable",
            EngineError::TornDown => "torn_down",
            EngineError::Projection(_) => "projection_failed",
            EngineError::Capture(_) => "capture_failed",
        }
    }
}

/// Errors from building decal patch geometry.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Projector size must be positive and finite, got {0}")]
    DegenerateProjector(f32),

    #[error("Triangle index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("Mesh '{0}' has mismatched attribute lengths")]
    AttributeMismatch(String),
}

/// Errors from capturing or saving the rendered frame.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No rendered frame is available")]
    NoFrame,

    #[error("Failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write render: {0}")]
    Io(#[from] std::io::Error),
}
