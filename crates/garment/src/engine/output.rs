//! State snapshots, pricing and render capture.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use drape_ipc::{
    CapturedRender, CartLineItem, CustomizationState, DecalView, FabricView, ImageRef, RegionView,
};
use image::RgbaImage;
use tracing::{info, warn};

use super::DecalEngine;
use crate::data_url::{encode_png, png_data_url};
use crate::error::CaptureError;
use crate::pricing;
use crate::types::{Decal, DecalSource};

impl DecalEngine {
    /// Build the observable state for the UI
    pub fn snapshot(&self) -> CustomizationState {
        let regions = self
            .regions
            .iter()
            .filter_map(|state| {
                let config = self.catalog.get(&state.id)?;
                Some(RegionView {
                    id: state.id.to_string(),
                    label: config.label.clone(),
                    description: config.description.clone(),
                    color: state.color.to_hex(),
                    primitive_count: self.index.primitives(&state.id).len(),
                    decals: state.decals.iter().map(decal_view).collect(),
                })
            })
            .collect();

        CustomizationState {
            model: self.status.clone(),
            active_section: self.section.clone(),
            active_region: self.active_region.as_ref().map(|r| r.to_string()),
            selected_decal: self.selected_decal.as_ref().map(|d| d.to_string()),
            active_fabric: self.fabric_id.clone(),
            fabrics: self
                .config
                .fabrics
                .iter()
                .map(|f| FabricView {
                    id: f.id.clone(),
                    name: f.name.clone(),
                    price: f.price,
                })
                .collect(),
            fit_percent: self.fit_percent,
            regions,
            price: self.customization_price(),
            summary: self.customization_summary(),
        }
    }

    /// Base price, fabric add-on and per-decal surcharge
    pub fn customization_price(&self) -> u32 {
        pricing::customization_price(&self.config.pricing, self.active_fabric(), self.total_decals())
    }

    pub fn customization_summary(&self) -> String {
        pricing::customization_summary(self.active_fabric(), self.total_decals())
    }

    /// Cart entry for the current design, with a captured render
    pub fn cart_line_item(&self) -> CartLineItem {
        let pricing = &self.config.pricing;
        let labels = self.catalog.iter().map(|r| r.label.as_str());
        CartLineItem {
            name: pricing.product_name.clone(),
            price: self.customization_price(),
            currency: pricing.currency.clone(),
            size: pricing.size_label.clone(),
            fabric: self
                .active_fabric()
                .map(|f| f.name.clone())
                .unwrap_or_default(),
            custom_details: pricing::custom_details(self.active_fabric(), self.total_decals(), labels),
            image: self.capture_render().image,
            customized: true,
        }
    }

    /// Store the frame the renderer just presented, for later capture
    pub fn present_frame(&mut self, frame: RgbaImage) {
        if !self.alive {
            return;
        }
        self.last_frame = Some(Arc::new(frame));
    }

    /// PNG data URL of the last presented frame, or the fallback image
    pub fn capture_render(&self) -> CapturedRender {
        let encoded = match &self.last_frame {
            Some(frame) => png_data_url(frame),
            None => Err(CaptureError::NoFrame),
        };
        match encoded {
            Ok(image) => CapturedRender {
                image,
                from_frame: true,
            },
            Err(e) => {
                warn!("Using fallback render image: {}", e);
                CapturedRender {
                    image: self.config.export.fallback_image.clone(),
                    from_frame: false,
                }
            }
        }
    }

    /// Write the last presented frame into `directory`.
    ///
    /// Returns `Ok(None)` when no frame has been presented yet.
    pub fn download_render(&self, directory: &Path) -> Result<Option<PathBuf>, CaptureError> {
        let Some(frame) = &self.last_frame else {
            warn!("No rendered frame available to download");
            return Ok(None);
        };
        let bytes = encode_png(frame)?;
        let path = directory.join(&self.config.export.file_name);
        std::fs::write(&path, bytes)?;
        info!("Saved render to {}", path.display());
        Ok(Some(path))
    }
}

fn decal_view(decal: &Decal) -> DecalView {
    let source = match &decal.source {
        DecalSource::Inline { file_name, .. } => ImageRef::Upload {
            file_name: file_name.clone(),
        },
        DecalSource::Remote { library_id, url } => ImageRef::Library {
            id: library_id.clone(),
            url: url.clone(),
        },
    };
    DecalView {
        id: decal.id.to_string(),
        name: decal.name.clone(),
        source,
        transform: decal.transform.to_view(),
        ready: decal.texture.is_some(),
    }
}
