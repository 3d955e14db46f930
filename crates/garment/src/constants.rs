/// Depth bias pulling decal patches toward the camera to avoid z-fighting.
pub const DECAL_DEPTH_BIAS: f32 = 1.0;

/// Anisotropic filtering level for fabric and decal textures.
pub const TEXTURE_ANISOTROPY: u16 = 8;

/// Texture repeat for tiled fabric patterns.
pub const FABRIC_REPEAT: f32 = 4.0;

/// Texture repeat for the gradient fabric (stretched, not tiled).
pub const GRADIENT_REPEAT: f32 = 1.5;

/// Shown when the garment model cannot be loaded.
pub const MODEL_LOAD_FAILED_MESSAGE: &str = "Unable to load model. Please refresh to try again.";

/// Geometric tolerance for clipping and degenerate-triangle checks.
pub const GEOMETRY_EPSILON: f32 = 1e-6;
