//! Price, summary and cart details of a customization.

use drape_config::{FabricConfig, PricingConfig};

/// Base price plus fabric add-on plus a surcharge per decal
pub fn customization_price(pricing: &PricingConfig, fabric: Option<&FabricConfig>, decal_count: usize) -> u32 {
    let fabric_price = fabric.map_or(0, |f| f.price);
    let decals = u32::try_from(decal_count).unwrap_or(u32::MAX);
    pricing
        .base_price
        .saturating_add(fabric_price)
        .saturating_add(pricing.per_decal.saturating_mul(decals))
}

/// "N custom design(s)"
pub fn designs_label(decal_count: usize) -> String {
    let plural = if decal_count == 1 { "" } else { "s" };
    format!("{decal_count} custom design{plural}")
}

/// "<fabric>, N custom designs", or "Custom colors" when neither applies
pub fn customization_summary(fabric: Option<&FabricConfig>, decal_count: usize) -> String {
    let mut parts = Vec::new();
    if let Some(fabric) = fabric {
        parts.push(fabric.name.clone());
    }
    if decal_count > 0 {
        parts.push(designs_label(decal_count));
    }
    if parts.is_empty() {
        return "Custom colors".to_string();
    }
    parts.join(", ")
}

/// Cart detail line: fabric, design count and one "<Region> color" entry per region
pub fn custom_details<'a>(
    fabric: Option<&FabricConfig>,
    decal_count: usize,
    region_labels: impl IntoIterator<Item = &'a str>,
) -> String {
    let mut parts = Vec::new();
    if let Some(fabric) = fabric {
        parts.push(format!("Fabric: {}", fabric.name));
    }
    if decal_count > 0 {
        parts.push(designs_label(decal_count));
    }
    parts.extend(region_labels.into_iter().map(|label| format!("{label} color")));
    parts.join(" • ")
}
