use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::scene_graph::TextureId;
use crate::transform::DecalTransform;

/// Garment region identifier (`front`, `gala`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decal identifier, unique for the lifetime of an engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecalId(pub String);

impl DecalId {
    /// Build the id for the `sequence`-th decal of a session
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("decal-{sequence}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DecalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for DecalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` or `#RGB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, EngineError> {
        let invalid = || EngineError::InvalidColor(hex.to_string());
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            3 => {
                let short = |i: usize| channel(&digits[i..=i]).map(|v| v * 17);
                Ok(Self::new(short(0)?, short(1)?, short(2)?))
            }
            _ => Err(invalid()),
        }
    }

    /// Uppercase `#RRGGBB`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Channels as sRGB floats in 0.0-1.0
    pub fn to_srgb_f32(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Where a decal's image comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecalSource {
    /// Uploaded bytes (PNG/JPEG/WebP)
    Inline {
        bytes: Arc<[u8]>,
        file_name: Option<String>,
    },
    /// Library design fetched over HTTP
    Remote { library_id: String, url: String },
}

/// A decal placed on a garment region
#[derive(Debug, Clone)]
pub struct Decal {
    pub id: DecalId,
    pub source: DecalSource,
    pub transform: DecalTransform,
    /// Display name (upload file name or library design name)
    pub name: Option<String>,
    /// Decoded image, once the load completes
    pub texture: Option<TextureId>,
}

impl Decal {
    pub fn new(id: DecalId, source: DecalSource, transform: DecalTransform, name: Option<String>) -> Self {
        Self {
            id,
            source,
            transform,
            name,
            texture: None,
        }
    }
}
