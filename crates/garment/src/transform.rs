//! Decal transforms and clamping to the configured bounds.

use drape_config::{TransformBounds, TransformConfig};
use drape_ipc::TransformView;
use glam::Vec3;

/// Placement of a decal relative to its region anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecalTransform {
    /// Offset from the region anchor in world units
    pub offset: Vec3,
    /// Euler angles in radians, applied in XYZ order
    pub rotation: Vec3,
    /// Uniform projector size in world units
    pub scale: f32,
}

impl From<TransformConfig> for DecalTransform {
    fn from(config: TransformConfig) -> Self {
        Self {
            offset: Vec3::from_array(config.offset),
            rotation: Vec3::from_array(config.rotation),
            scale: config.scale,
        }
    }
}

impl DecalTransform {
    /// Clamp every component into `bounds`.
    ///
    /// Clamping is idempotent: `t.clamped(b).clamped(b) == t.clamped(b)`.
    pub fn clamped(self, bounds: &TransformBounds) -> Self {
        let [rot_min, rot_max] = bounds.rotation_degrees.map(f32::to_radians);
        Self {
            offset: Vec3::new(
                clamp_range(self.offset.x, bounds.offset_x),
                clamp_range(self.offset.y, bounds.offset_y),
                clamp_range(self.offset.z, bounds.offset_z),
            ),
            rotation: self.rotation.clamp(Vec3::splat(rot_min), Vec3::splat(rot_max)),
            scale: clamp_range(self.scale, bounds.scale),
        }
    }

    /// Check whether every component lies inside `bounds`
    pub fn is_within(&self, bounds: &TransformBounds) -> bool {
        *self == self.clamped(bounds)
    }

    pub fn to_view(&self) -> TransformView {
        TransformView {
            offset: self.offset.to_array(),
            rotation: self.rotation.to_array(),
            scale: self.scale,
        }
    }
}

/// Clamp into an inclusive `[min, max]` range. NaN collapses to `min`.
pub fn clamp_range(value: f32, [min, max]: [f32; 2]) -> f32 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_offsets_clamped_per_axis() {
        let bounds = TransformBounds::default();
        let t = DecalTransform {
            offset: Vec3::new(2.0, -5.0, 0.3),
            rotation: Vec3::ZERO,
            scale: 0.5,
        }
        .clamped(&bounds);

        assert!((t.offset - Vec3::new(0.7, -0.8, 0.25)).length() < 1e-6);
        assert_eq!(t.scale, 0.5);
    }

    #[test]
    fn test_scale_and_rotation_clamped() {
        let bounds = TransformBounds::default();
        let t = DecalTransform {
            offset: Vec3::ZERO,
            rotation: Vec3::new(4.0, -4.0, 1.0),
            scale: 9.0,
        }
        .clamped(&bounds);

        assert!((t.rotation.x - PI).abs() < 1e-5);
        assert!((t.rotation.y + PI).abs() < 1e-5);
        assert_eq!(t.rotation.z, 1.0);
        assert_eq!(t.scale, 1.5);

        let tiny = DecalTransform { scale: 0.01, ..t }.clamped(&bounds);
        assert_eq!(tiny.scale, 0.15);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let bounds = TransformBounds::default();
        let samples = [
            DecalTransform {
                offset: Vec3::new(-3.0, 0.9, -1.0),
                rotation: Vec3::new(7.0, 0.0, -7.0),
                scale: 0.0,
            },
            DecalTransform::from(TransformConfig::default()),
        ];
        for t in samples {
            let once = t.clamped(&bounds);
            assert_eq!(once, once.clamped(&bounds));
            assert!(once.is_within(&bounds));
        }
    }

    #[test]
    fn test_nan_collapses_to_min() {
        assert_eq!(clamp_range(f32::NAN, [0.15, 1.5]), 0.15);
    }
}
