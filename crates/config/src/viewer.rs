//! Window, camera, lighting and studio settings for the 3D viewer.

use serde::{Deserialize, Serialize};

/// Initial window width in logical pixels
pub const DEFAULT_WIDTH: u32 = 1280;

/// Initial window height in logical pixels
pub const DEFAULT_HEIGHT: u32 = 800;

/// Window title
pub const DEFAULT_TITLE: &str = "Drape";

/// Viewer window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Overrides the OS scale factor when set
    pub scale_factor: Option<f32>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scale_factor: None,
        }
    }
}

impl DisplayConfig {
    /// Width over height, 1.0 for a degenerate window
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Perspective camera and orbit-control limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    /// Point the camera orbits around
    pub target: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    /// Smooth camera motion toward the requested orbit
    pub damping: bool,
    /// Fraction of the remaining orbit delta applied per frame when damping
    pub damping_factor: f32,
    /// Orbit sensitivity (radians per pixel)
    pub orbit_sensitivity: f32,
    /// Zoom sensitivity (fraction of distance per scroll line)
    pub zoom_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            position: [0.0, 1.7, 3.2],
            target: [0.0, 1.3, 0.0],
            min_distance: 1.5,
            max_distance: 4.0,
            damping: true,
            damping_factor: 0.05,
            orbit_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
        }
    }
}

/// Studio lighting: ambient fill plus key and back directional lights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub key_position: [f32; 3],
    pub key_intensity: f32,
    pub back_position: [f32; 3],
    pub back_intensity: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.8,
            key_position: [3.0, 5.0, 4.0],
            key_intensity: 1.0,
            back_position: [-2.0, 4.0, -3.0],
            back_intensity: 0.5,
        }
    }
}

/// Backdrop and display platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub background: String,
    pub platform_radius: f32,
    pub platform_height: f32,
    pub platform_y: f32,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            background: "#f8f4ed".to_string(),
            platform_radius: 1.3,
            platform_height: 0.1,
            platform_y: -1.0,
        }
    }
}

/// Everything the Bevy viewer reads at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub display: DisplayConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub studio: StudioConfig,
}
