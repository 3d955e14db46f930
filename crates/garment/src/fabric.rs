//! Procedural fabric textures.
//!
//! Each fabric pattern is a small RGBA raster drawn over white with a faint
//! black (or black-to-white) overlay, then tiled across the garment. Rasters
//! are generated once per fabric id and cached for the rest of the session.

use std::collections::HashMap;

use drape_config::PatternKind;
use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::constants::{FABRIC_REPEAT, GRADIENT_REPEAT, TEXTURE_ANISOTROPY};
use crate::scene_graph::{SamplerSettings, TextureId};

/// Grid line spacing in pixels
const GRID_STEP: f32 = 32.0;
const GRID_LINE_WIDTH: f32 = 2.0;
const GRID_ALPHA: f32 = 0.05;

/// Diagonal line spacing in pixels (measured along X)
const DIAGONAL_STEP: f32 = 24.0;
const DIAGONAL_LINE_WIDTH: f32 = 3.0;
const DIAGONAL_ALPHA: f32 = 0.06;

const DOT_STEP: f32 = 32.0;
const DOT_FIRST: f32 = 12.0;
const DOT_RADIUS: f32 = 4.0;
const DOT_ALPHA: f32 = 0.1;

const GRADIENT_ALPHA: f32 = 0.15;

/// Render a square fabric raster of `size` pixels.
pub fn render_pattern(kind: PatternKind, size: u32) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 255]));
    let extent = size as f32;

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        // Sample at the pixel center
        let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
        match kind {
            PatternKind::Grid => {
                // Vertical and horizontal strokes are separate, so crossings darken twice
                for coord in [p.x, p.y] {
                    if distance_to_lattice(coord, 0.0, GRID_STEP) <= GRID_LINE_WIDTH * 0.5 {
                        blend_over(pixel, 0.0, GRID_ALPHA);
                    }
                }
            }
            PatternKind::Diagonal => {
                // Lines run from (i, 0) to (i - h, h), i.e. x + y = i, for i = -h, -h + 24, ...
                let along = distance_to_lattice(p.x + p.y, -extent, DIAGONAL_STEP);
                if along / std::f32::consts::SQRT_2 <= DIAGONAL_LINE_WIDTH * 0.5 {
                    blend_over(pixel, 0.0, DIAGONAL_ALPHA);
                }
            }
            PatternKind::Dots => {
                let dx = distance_to_dot_center(p.x, extent);
                let dy = distance_to_dot_center(p.y, extent);
                if dx * dx + dy * dy <= DOT_RADIUS * DOT_RADIUS {
                    blend_over(pixel, 0.0, DOT_ALPHA);
                }
            }
            PatternKind::Gradient => {
                // Linear gradient from the top-left to the bottom-right corner
                let axis = Vec2::splat(extent);
                let t = (p.dot(axis) / axis.length_squared()).clamp(0.0, 1.0);
                blend_over(pixel, 1.0 - t, GRADIENT_ALPHA);
            }
        }
    }

    image
}

/// Sampler settings for a fabric: wrapped, tiled 4x4 (gradient 1.5x1.5).
pub fn sampler_for(kind: PatternKind) -> SamplerSettings {
    let repeat = match kind {
        PatternKind::Gradient => GRADIENT_REPEAT,
        _ => FABRIC_REPEAT,
    };
    SamplerSettings {
        repeat: [repeat, repeat],
        wrap: true,
        anisotropy: TEXTURE_ANISOTROPY,
    }
}

/// Distance from `value` to the nearest point of `start + k * step`.
fn distance_to_lattice(value: f32, start: f32, step: f32) -> f32 {
    let offset = (value - start).rem_euclid(step);
    offset.min(step - offset)
}

/// Distance to the nearest dot center (12, 44, 76, ...) that lies inside the raster.
fn distance_to_dot_center(value: f32, extent: f32) -> f32 {
    let last = ((extent - DOT_FIRST) / DOT_STEP).ceil() - 1.0;
    let k = ((value - DOT_FIRST) / DOT_STEP).round().clamp(0.0, last.max(0.0));
    (value - (DOT_FIRST + k * DOT_STEP)).abs()
}

/// Source-over blend of a gray level (0.0 black, 1.0 white) at `alpha`.
fn blend_over(pixel: &mut Rgba<u8>, gray: f32, alpha: f32) {
    let src = gray * 255.0;
    for channel in pixel.0.iter_mut().take(3) {
        let dst = *channel as f32;
        *channel = (src * alpha + dst * (1.0 - alpha)).round() as u8;
    }
}

/// Fabric id to texture handle, filled lazily.
#[derive(Debug, Clone, Default)]
pub struct FabricTextureCache {
    textures: HashMap<String, TextureId>,
}

impl FabricTextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fabric_id: &str) -> Option<TextureId> {
        self.textures.get(fabric_id).copied()
    }

    /// Cached texture for `fabric_id`, creating it with `create` on first use
    pub fn get_or_create(&mut self, fabric_id: &str, create: impl FnOnce() -> TextureId) -> TextureId {
        *self
            .textures
            .entry(fabric_id.to_string())
            .or_insert_with(create)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Empty the cache, returning every texture for disposal
    pub fn drain(&mut self) -> Vec<TextureId> {
        self.textures.drain().map(|(_, id)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: u32 = 256;

    fn gray(image: &RgbaImage, x: u32, y: u32) -> u8 {
        image.get_pixel(x, y).0[0]
    }

    #[test]
    fn test_grid_lines_every_32px() {
        let image = render_pattern(PatternKind::Grid, SIZE);
        // Line centered on x = 32 covers pixels 31 and 32
        assert!(gray(&image, 32, 10) < 255);
        assert!(gray(&image, 31, 10) < 255);
        assert_eq!(gray(&image, 16, 10), 255);
        // Crossing is darker than a single line
        assert!(gray(&image, 32, 32) < gray(&image, 32, 10));
        assert_eq!(image.get_pixel(16, 16).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_diagonal_lines() {
        let image = render_pattern(PatternKind::Diagonal, SIZE);
        // x + y = 8 is a line (-256 + 11 * 24)
        assert!(gray(&image, 4, 3) < 255);
        // x + y = 20 is half-way between lines
        assert_eq!(gray(&image, 10, 9), 255);
    }

    #[test]
    fn test_dots_at_grid_centers() {
        let image = render_pattern(PatternKind::Dots, SIZE);
        assert!(gray(&image, 12, 12) < 255);
        assert!(gray(&image, 44, 76) < 255);
        assert_eq!(gray(&image, 28, 28), 255);
        // Dot alpha is 0.1 over white
        assert!((229..=230).contains(&gray(&image, 12, 12)));
    }

    #[test]
    fn test_gradient_darkens_toward_bottom_right() {
        let image = render_pattern(PatternKind::Gradient, SIZE);
        let top_left = gray(&image, 0, 0);
        let center = gray(&image, 128, 128);
        let bottom_right = gray(&image, 255, 255);
        assert!(top_left >= 254);
        assert!(top_left > center && center > bottom_right);
        assert!((215..=218).contains(&bottom_right));
    }

    #[test]
    fn test_alpha_channel_opaque() {
        for kind in [
            PatternKind::Grid,
            PatternKind::Diagonal,
            PatternKind::Dots,
            PatternKind::Gradient,
        ] {
            let image = render_pattern(kind, 64);
            assert!(image.pixels().all(|p| p.0[3] == 255));
        }
    }

    #[test]
    fn test_sampler_repeat() {
        assert_eq!(sampler_for(PatternKind::Grid).repeat, [4.0, 4.0]);
        assert_eq!(sampler_for(PatternKind::Gradient).repeat, [1.5, 1.5]);
        assert_eq!(sampler_for(PatternKind::Dots).anisotropy, 8);
    }

    #[test]
    fn test_cache_creates_once() {
        let mut cache = FabricTextureCache::new();
        let mut created = 0;
        let first = cache.get_or_create("lawn", || {
            created += 1;
            TextureId(1)
        });
        let second = cache.get_or_create("lawn", || {
            created += 1;
            TextureId(2)
        });
        assert_eq!(first, second);
        assert_eq!(created, 1);
        assert_eq!(cache.drain(), vec![TextureId(1)]);
        assert!(cache.is_empty());
    }
}
