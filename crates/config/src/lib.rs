//! Shared configuration for Drape
//!
//! This crate is the single source of truth for the garment catalog (regions,
//! fabrics, palette), decal transform bounds, pricing, and the viewer settings
//! shared by the engine core and the Bevy front end.
//!
//! Everything has a `Default` matching the shipped storefront, and every field
//! is `#[serde(default)]` so a config file only needs the values it overrides.

mod catalog;
mod viewer;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

pub use catalog::{FabricConfig, NamedColor, PatternKind, RegionConfig, TransformConfig};
pub use viewer::{CameraConfig, DisplayConfig, LightingConfig, StudioConfig, ViewerConfig};

/// Environment variable naming a JSON config file to load at startup
pub const CONFIG_ENV_VAR: &str = "DRAPE_CONFIG";

/// Delay before a debounced decal geometry update is applied (~one frame at 60fps)
pub const DEFAULT_DEBOUNCE_MS: u64 = 16;

/// Scale change per wheel delta unit
pub const DEFAULT_WHEEL_SENSITIVITY: f32 = 0.0015;

/// Errors produced while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration file layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct DrapeConfig {
    pub engine: EngineConfig,
    pub viewer: ViewerConfig,
}

impl DrapeConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load from the file named by `DRAPE_CONFIG`, falling back to defaults
    /// when the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => {
                tracing::info!("Loading configuration from {}", path);
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// Inclusive `[min, max]` range
pub type Range = [f32; 2];

/// Limits applied to every decal transform mutation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformBounds {
    pub offset_x: Range,
    pub offset_y: Range,
    pub offset_z: Range,
    pub scale: Range,
    /// Rotation range per axis, in degrees (slider range)
    pub rotation_degrees: Range,
}

impl Default for TransformBounds {
    fn default() -> Self {
        Self {
            offset_x: [-0.7, 0.7],
            offset_y: [-0.8, 0.8],
            offset_z: [-0.25, 0.25],
            scale: [0.15, 1.5],
            rotation_degrees: [-180.0, 180.0],
        }
    }
}

impl TransformBounds {
    /// Offset range for an axis index (0 = x, 1 = y, 2 = z)
    pub fn offset(&self, axis: usize) -> Range {
        match axis {
            0 => self.offset_x,
            1 => self.offset_y,
            _ => self.offset_z,
        }
    }

    /// Width of the offset range for an axis index
    pub fn offset_span(&self, axis: usize) -> f32 {
        let [min, max] = self.offset(axis);
        max - min
    }
}

/// Continuous-input tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Debounce window for patch regeneration, in milliseconds
    pub debounce_ms: u64,
    /// Multiplicative scale change per wheel delta unit
    pub wheel_sensitivity: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            wheel_sensitivity: DEFAULT_WHEEL_SENSITIVITY,
        }
    }
}

/// Pricing of a customized garment, in the store currency's minor-free units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub base_price: u32,
    /// Surcharge for each decal across all regions
    pub per_decal: u32,
    pub currency: String,
    /// Cart line-item name
    pub product_name: String,
    /// Cart line-item size label
    pub size_label: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_price: 3500,
            per_decal: 300,
            currency: "PKR".to_string(),
            product_name: "Custom Design - Ladies Kurta".to_string(),
            size_label: "Custom Fit".to_string(),
        }
    }
}

/// Model placement and "fit" scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Model scale at 100% fit
    pub base_scale: f32,
    /// Fit percentage applied at load time
    pub default_percent: f32,
    /// Vertical offset of the model root
    pub model_offset_y: f32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            base_scale: 1.1,
            default_percent: 100.0,
            model_offset_y: 1.0,
        }
    }
}

impl FitConfig {
    /// Uniform model scale for a fit percentage
    pub fn scale_for(&self, percent: f32) -> f32 {
        self.base_scale * (percent / 100.0)
    }
}

/// Asset locations and generated texture sizes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Path of the garment GLB loaded at startup
    pub model_path: String,
    /// Edge length of generated fabric rasters, in pixels
    pub fabric_texture_size: u32,
    /// Prefix for library design URLs that are not absolute
    pub library_base_url: Option<String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            model_path: "assets/ladies_qurta.glb".to_string(),
            fabric_texture_size: 256,
            library_base_url: Some("http://localhost:5000".to_string()),
        }
    }
}

/// Render capture and download settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Image reference returned when no rendered frame is available
    pub fallback_image: String,
    /// File name used when downloading the current render
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fallback_image: "https://res.cloudinary.com/dmqcpclos/image/upload/c_limit,w_400,f_auto,q_auto/traditional-embroidered-suit".to_string(),
            file_name: "khudsakht-design.png".to_string(),
        }
    }
}

/// Everything the decal engine core needs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct EngineConfig {
    /// Garment regions in classification priority order
    pub regions: Vec<RegionConfig>,
    /// Fabric catalog; the first entry is active at startup
    pub fabrics: Vec<FabricConfig>,
    /// Color palette; the first entry is every region's initial color
    pub palette: Vec<NamedColor>,
    /// Transform used for regions without their own default
    pub default_transform: TransformConfig,
    pub bounds: TransformBounds,
    pub interaction: InteractionConfig,
    pub pricing: PricingConfig,
    pub fit: FitConfig,
    pub assets: AssetConfig,
    pub export: ExportConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            regions: catalog::default_regions(),
            fabrics: catalog::default_fabrics(),
            palette: catalog::default_palette(),
            default_transform: TransformConfig::default(),
            bounds: TransformBounds::default(),
            interaction: InteractionConfig::default(),
            pricing: PricingConfig::default(),
            fit: FitConfig::default(),
            assets: AssetConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Check catalog consistency and range ordering
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.regions.is_empty() {
            return Err(ConfigError::Invalid("at least one region is required".into()));
        }
        if self.fabrics.is_empty() {
            return Err(ConfigError::Invalid("at least one fabric is required".into()));
        }
        if self.palette.is_empty() {
            return Err(ConfigError::Invalid("palette must not be empty".into()));
        }

        let mut seen = std::collections::HashSet::new();
        for region in &self.regions {
            if !seen.insert(region.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate region id '{}'", region.id)));
            }
            if region.matchers.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "region '{}' has no matchers",
                    region.id
                )));
            }
            // An empty substring would claim every primitive
            if region.matchers.iter().any(|m| m.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "region '{}' has an empty matcher",
                    region.id
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for fabric in &self.fabrics {
            if !seen.insert(fabric.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate fabric id '{}'", fabric.id)));
            }
        }

        let bounds = &self.bounds;
        for (name, [min, max]) in [
            ("offset_x", bounds.offset_x),
            ("offset_y", bounds.offset_y),
            ("offset_z", bounds.offset_z),
            ("scale", bounds.scale),
            ("rotation_degrees", bounds.rotation_degrees),
        ] {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "bounds.{name}: min {min} is greater than max {max}"
                )));
            }
        }
        if bounds.scale[0] <= 0.0 {
            return Err(ConfigError::Invalid("bounds.scale must be positive".into()));
        }
        if self.assets.fabric_texture_size == 0 {
            return Err(ConfigError::Invalid("assets.fabric_texture_size must be positive".into()));
        }

        Ok(())
    }

    /// Look up a region by id
    pub fn region(&self, id: &str) -> Option<&RegionConfig> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Look up a fabric by id
    pub fn fabric(&self, id: &str) -> Option<&FabricConfig> {
        self.fabrics.iter().find(|f| f.id == id)
    }

    /// Initial decal transform for a region
    pub fn initial_transform(&self, region_id: &str) -> TransformConfig {
        self.region(region_id)
            .and_then(|r| r.default_transform)
            .unwrap_or(self.default_transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.regions.len(), 5);
        assert_eq!(config.fabrics.len(), 4);
        assert_eq!(config.palette[0].value, "#FAF7F0");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = DrapeConfig::from_json_str(
            r#"{ "engine": { "pricing": { "base_price": 4000 } } }"#,
        )
        .unwrap();
        assert_eq!(config.engine.pricing.base_price, 4000);
        assert_eq!(config.engine.pricing.per_decal, 300);
        assert_eq!(config.engine.bounds, TransformBounds::default());
        assert_eq!(config.viewer.camera.fov_degrees, 45.0);
    }

    #[test]
    fn test_duplicate_region_rejected() {
        let mut config = EngineConfig::default();
        let first = config.regions[0].clone();
        config.regions.push(first);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_matcher_rejected() {
        let mut config = EngineConfig::default();
        config.regions[1].matchers.push(" ".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_fabric_texture_size_rejected() {
        let mut config = EngineConfig::default();
        config.assets.fabric_texture_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = EngineConfig::default();
        config.bounds.offset_y = [0.8, -0.8];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_initial_transform_falls_back() {
        let mut config = EngineConfig::default();
        assert_eq!(config.initial_transform("gala").scale, 1.2);
        config.regions[0].default_transform = None;
        let front = config.initial_transform("front");
        assert_eq!(front, TransformConfig::default());
        assert_eq!(front.offset, [0.0, 0.25, 0.05]);
        assert_eq!(config.initial_transform("unknown").scale, 0.45);
    }

    #[test]
    fn test_fit_scale() {
        let fit = FitConfig::default();
        assert!((fit.scale_for(100.0) - 1.1).abs() < 1e-6);
        assert!((fit.scale_for(50.0) - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_offset_span() {
        let bounds = TransformBounds::default();
        assert!((bounds.offset_span(0) - 1.4).abs() < 1e-6);
        assert!((bounds.offset_span(1) - 1.6).abs() < 1e-6);
        assert!((bounds.offset_span(2) - 0.5).abs() < 1e-6);
    }
}
