//! Pointer drag and wheel input over the viewport.

use serde::{Deserialize, Serialize};

/// Continuous pointer input targeting the selected decal.
///
/// Positions are in viewport pixels with the origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerCommand {
    DragBegin {
        pointer_id: u64,
        position: [f32; 2],
        /// Viewport size in pixels, used to normalize the drag delta
        viewport: [f32; 2],
    },
    DragMove { pointer_id: u64, position: [f32; 2] },
    DragEnd { pointer_id: u64 },
    /// Wheel delta in pixels; positive scrolls down and shrinks the decal
    Wheel { delta_y: f32 },
}
