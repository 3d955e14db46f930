//! Pointer gestures that move and resize the selected decal.
//!
//! A drag maps the pointer delta, normalized by the viewport size, onto the
//! full offset range of each axis: dragging across the whole viewport moves
//! the decal from one bound to the other. Screen Y grows downward, so the
//! vertical offset moves opposite to the pointer delta.

use drape_config::TransformBounds;
use glam::Vec2;

use crate::scene_graph::PatchKey;
use crate::transform::clamp_range;

/// An in-progress drag captured on pointer down
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub pointer_id: u64,
    /// Decal being dragged
    pub target: PatchKey,
    /// Pointer position at drag start, in pixels
    pub origin: Vec2,
    /// Viewport size in pixels
    pub viewport: Vec2,
    /// Decal X/Y offset at drag start
    pub start_offset: Vec2,
}

impl DragState {
    /// Start a drag. Returns `None` for an empty viewport.
    pub fn begin(
        pointer_id: u64,
        target: PatchKey,
        origin: Vec2,
        viewport: Vec2,
        start_offset: Vec2,
    ) -> Option<Self> {
        if viewport.min_element() <= 0.0 || !viewport.is_finite() {
            return None;
        }
        Some(Self {
            pointer_id,
            target,
            origin,
            viewport,
            start_offset,
        })
    }

    /// Offset X/Y for the pointer at `position`, clamped to `bounds`.
    pub fn offset_at(&self, position: Vec2, bounds: &TransformBounds) -> Vec2 {
        let delta = (position - self.origin) / self.viewport;
        Vec2::new(
            clamp_range(
                self.start_offset.x + delta.x * bounds.offset_span(0),
                bounds.offset_x,
            ),
            clamp_range(
                self.start_offset.y - delta.y * bounds.offset_span(1),
                bounds.offset_y,
            ),
        )
    }
}

/// Scale after a wheel event: `scale * (1 - delta_y * sensitivity)`, clamped.
///
/// Scrolling up (negative `delta_y`) grows the decal.
pub fn wheel_scale(scale: f32, delta_y: f32, sensitivity: f32, bounds: &TransformBounds) -> f32 {
    clamp_range(scale * (1.0 - delta_y * sensitivity), bounds.scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DecalId, RegionId};

    fn key() -> PatchKey {
        PatchKey::new(RegionId::from("front"), DecalId::from("decal-1"))
    }

    #[test]
    fn test_drag_maps_viewport_to_offset_range() {
        let bounds = TransformBounds::default();
        let drag = DragState::begin(
            1,
            key(),
            Vec2::new(100.0, 100.0),
            Vec2::new(1000.0, 500.0),
            Vec2::new(0.0, 0.25),
        )
        .unwrap();

        // Normalized delta (0.1, -0.1)
        let offset = drag.offset_at(Vec2::new(200.0, 50.0), &bounds);
        assert!((offset.x - 0.14).abs() < 1e-5);
        assert!((offset.y - 0.41).abs() < 1e-5);
    }

    #[test]
    fn test_drag_clamps_to_bounds() {
        let bounds = TransformBounds::default();
        let drag = DragState::begin(1, key(), Vec2::ZERO, Vec2::new(100.0, 100.0), Vec2::ZERO).unwrap();
        let offset = drag.offset_at(Vec2::new(1000.0, 1000.0), &bounds);
        assert_eq!(offset, Vec2::new(0.7, -0.8));
    }

    #[test]
    fn test_empty_viewport_rejected() {
        assert!(DragState::begin(1, key(), Vec2::ZERO, Vec2::new(0.0, 100.0), Vec2::ZERO).is_none());
    }

    #[test]
    fn test_wheel_scales_and_clamps() {
        let bounds = TransformBounds::default();
        // Scroll up 100px grows by 15%
        assert!((wheel_scale(0.5, -100.0, 0.0015, &bounds) - 0.575).abs() < 1e-6);
        assert!((wheel_scale(0.5, 100.0, 0.0015, &bounds) - 0.425).abs() < 1e-6);
        assert_eq!(wheel_scale(1.4, -1000.0, 0.0015, &bounds), 1.5);
        assert_eq!(wheel_scale(0.2, 1000.0, 0.0015, &bounds), 0.15);
    }
}
