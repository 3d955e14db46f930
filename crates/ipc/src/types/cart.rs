//! Outputs handed to the storefront.

use serde::{Deserialize, Serialize};

/// Still image of the current render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRender {
    /// PNG data URL, or the fallback image reference
    pub image: String,
    /// False when `image` is the fallback
    pub from_frame: bool,
}

/// Cart entry describing the customized garment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub name: String,
    pub price: u32,
    pub currency: String,
    pub size: String,
    pub fabric: String,
    /// Human-readable details joined with " • "
    pub custom_details: String,
    pub image: String,
    pub customized: bool,
}
