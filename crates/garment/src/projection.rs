//! Decal projection onto garment geometry.
//!
//! A decal is an oriented box (the projector). Every triangle of the target
//! primitive is moved into projector space, clipped against the six faces of
//! the box, and the surviving polygons are triangulated and moved back to
//! world space. Texture coordinates come from the projector-space X/Y
//! position, so the image is stretched across the box face.

use glam::{EulerRot, Mat3, Mat4, Quat, Vec2, Vec3};

use crate::constants::GEOMETRY_EPSILON;
use crate::error::ProjectionError;
use crate::mesh::MeshPrimitive;
use crate::transform::DecalTransform;

/// Oriented projection box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    /// World-space center of the box
    pub position: Vec3,
    pub orientation: Quat,
    /// Full box extents
    pub size: Vec3,
}

impl Projector {
    /// Projector for a decal placed relative to a region anchor.
    ///
    /// # Arguments
    /// * `anchor` - World-space anchor of the region (bounding-box center)
    /// * `transform` - Decal offset, XYZ Euler rotation and uniform scale
    pub fn from_decal(anchor: Vec3, transform: &DecalTransform) -> Self {
        let r = transform.rotation;
        Self {
            position: anchor + transform.offset,
            orientation: Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            size: Vec3::splat(transform.scale),
        }
    }

    /// Projector-to-world matrix (rotation and translation, no scale)
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    fn validate(&self) -> Result<(), ProjectionError> {
        let smallest = self.size.min_element();
        if !self.size.is_finite() || smallest <= GEOMETRY_EPSILON {
            return Err(ProjectionError::DegenerateProjector(smallest));
        }
        Ok(())
    }
}

/// Triangle-list geometry of a decal patch in world space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchGeometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
}

impl PatchGeometry {
    /// Get the number of triangles (vertices are not shared)
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// True when the projector missed the surface entirely
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct ClipVertex {
    /// Projector-space position
    position: Vec3,
    /// World-space normal
    normal: Vec3,
}

impl ClipVertex {
    fn lerp(self, other: ClipVertex, t: f32) -> ClipVertex {
        ClipVertex {
            position: self.position.lerp(other.position, t),
            normal: self.normal.lerp(other.normal, t),
        }
    }
}

/// Build the patch geometry for a projector over a primitive.
///
/// # Arguments
/// * `primitive` - Target primitive in model space
/// * `model_matrix` - Model-to-world transform of the garment
/// * `projector` - The decal box in world space
///
/// # Returns
/// World-space patch geometry; empty when the box misses the primitive.
pub fn project_decal(
    primitive: &MeshPrimitive,
    model_matrix: Mat4,
    projector: &Projector,
) -> Result<PatchGeometry, ProjectionError> {
    projector.validate()?;

    let projector_matrix = projector.matrix();
    let to_projector = projector_matrix.inverse() * model_matrix;
    let normal_matrix = Mat3::from_mat4(model_matrix).inverse().transpose();
    let half = projector.size * 0.5;

    let mut geometry = PatchGeometry::default();
    let mut polygon = Vec::with_capacity(9);

    for [a, b, c] in primitive.triangles() {
        polygon.clear();
        for i in [a, b, c] {
            let (Some(&p), Some(&n)) = (primitive.positions.get(i), primitive.normals.get(i)) else {
                return Err(ProjectionError::IndexOutOfRange {
                    index: i as u32,
                    vertex_count: primitive.positions.len(),
                });
            };
            polygon.push(ClipVertex {
                position: to_projector.transform_point3(p),
                normal: normal_matrix * n,
            });
        }

        for axis in 0..3 {
            for sign in [1.0, -1.0] {
                polygon = clip_against_plane(&polygon, axis, sign, half[axis]);
                if polygon.len() < 3 {
                    break;
                }
            }
            if polygon.len() < 3 {
                break;
            }
        }
        if polygon.len() < 3 {
            continue;
        }

        // Fan triangulation of the convex clipped polygon
        for i in 1..polygon.len() - 1 {
            for v in [polygon[0], polygon[i], polygon[i + 1]] {
                geometry.positions.push(projector_matrix.transform_point3(v.position));
                geometry.normals.push(v.normal.normalize_or(Vec3::Z));
                geometry.uvs.push(Vec2::new(
                    0.5 + v.position.x / projector.size.x,
                    0.5 + v.position.y / projector.size.y,
                ));
            }
        }
    }

    Ok(geometry)
}

/// Sutherland-Hodgman clip of a convex polygon against `sign * p[axis] <= limit`.
fn clip_against_plane(input: &[ClipVertex], axis: usize, sign: f32, limit: f32) -> Vec<ClipVertex> {
    let mut output = Vec::with_capacity(input.len() + 1);
    let Some(&last) = input.last() else {
        return output;
    };

    let distance = |v: &ClipVertex| sign * v.position[axis] - limit;
    let mut prev = last;
    let mut prev_d = distance(&prev);

    for &current in input {
        let d = distance(&current);
        let current_inside = d <= 0.0;
        let prev_inside = prev_d <= 0.0;

        if current_inside != prev_inside {
            let t = prev_d / (prev_d - d);
            output.push(prev.lerp(current, t));
        }
        if current_inside {
            output.push(current);
        }

        prev = current;
        prev_d = d;
    }

    output
}
