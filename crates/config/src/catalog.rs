//! Garment catalog: regions, fabrics and the color palette.

use serde::{Deserialize, Serialize};

/// Placement of a decal relative to its region anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    pub offset: [f32; 3],
    /// Euler angles (XYZ order) in radians
    pub rotation: [f32; 3],
    pub scale: f32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            offset: [0.0, 0.25, 0.05],
            rotation: [0.0, 0.0, 0.0],
            scale: 0.45,
        }
    }
}

impl TransformConfig {
    const fn at(offset: [f32; 3], scale: f32) -> Self {
        Self {
            offset,
            rotation: [0.0, 0.0, 0.0],
            scale,
        }
    }
}

/// A named garment zone and the mesh-name substrings that select it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Lowercase substrings matched against primitive names
    pub matchers: Vec<String>,
    #[serde(default)]
    pub default_transform: Option<TransformConfig>,
}

impl RegionConfig {
    fn new(
        id: &str,
        label: &str,
        description: &str,
        matchers: &[&str],
        default_transform: TransformConfig,
    ) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            matchers: matchers.iter().map(|m| m.to_string()).collect(),
            default_transform: Some(default_transform),
        }
    }
}

/// Procedural pattern drawn into a fabric texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Diagonal,
    Grid,
    Dots,
    Gradient,
}

/// A selectable fabric and its price add-on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricConfig {
    pub id: String,
    pub name: String,
    /// Price add-on
    pub price: u32,
    pub pattern: PatternKind,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default = "default_metalness")]
    pub metalness: f32,
}

fn default_roughness() -> f32 {
    0.4
}

fn default_metalness() -> f32 {
    0.1
}

impl FabricConfig {
    fn new(id: &str, name: &str, price: u32, pattern: PatternKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            pattern,
            roughness: default_roughness(),
            metalness: default_metalness(),
        }
    }
}

/// Palette entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedColor {
    pub name: String,
    /// `#RRGGBB`
    pub value: String,
}

pub(crate) fn default_regions() -> Vec<RegionConfig> {
    vec![
        RegionConfig::new(
            "front",
            "Front",
            "Kurta front panel",
            &["front"],
            TransformConfig::at([0.0, 0.1, 0.05], 0.65),
        ),
        RegionConfig::new(
            "back",
            "Back",
            "Kurta back panel",
            &["back"],
            TransformConfig::at([0.0, 0.1, 0.05], 0.65),
        ),
        RegionConfig::new(
            "gala",
            "Gala",
            "Neckline & collar",
            &["gala", "neck", "collar"],
            TransformConfig::at([0.0, 0.35, 0.1], 1.2),
        ),
        RegionConfig::new(
            "bazo",
            "Bazo",
            "Sleeves",
            &["bazo", "sleeve"],
            TransformConfig::at([0.0, 0.15, 0.05], 0.5),
        ),
        RegionConfig::new(
            "shalwar",
            "Shalwar",
            "Bottom fabric",
            &["shalwar", "bottom", "trouser"],
            TransformConfig::at([0.0, -0.2, 0.05], 0.6),
        ),
    ]
}

pub(crate) fn default_fabrics() -> Vec<FabricConfig> {
    let mut cotton_silk = FabricConfig::new("cotton-silk", "Cotton Silk", 500, PatternKind::Diagonal);
    cotton_silk.metalness = 0.3;
    let mut velvet = FabricConfig::new("velvet", "Velvet", 800, PatternKind::Gradient);
    velvet.roughness = 0.7;

    vec![
        cotton_silk,
        FabricConfig::new("lawn", "Lawn", 400, PatternKind::Grid),
        FabricConfig::new("chiffon", "Chiffon", 600, PatternKind::Dots),
        velvet,
    ]
}

pub(crate) fn default_palette() -> Vec<NamedColor> {
    [
        ("Cream", "#FAF7F0"),
        ("Rose Pink", "#D4A5A5"),
        ("Light Brown", "#B8956A"),
        ("Ivory", "#F5EFE6"),
        ("Beige", "#E8D5C4"),
        ("Dusty Rose", "#C8A5A5"),
    ]
    .into_iter()
    .map(|(name, value)| NamedColor {
        name: name.to_string(),
        value: value.to_string(),
    })
    .collect()
}
