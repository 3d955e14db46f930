//! Garment geometry as imported from a GLB file.
//!
//! Node transforms are baked into the vertex data at import time, so every
//! [`MeshPrimitive`] lives in model space. The model root transform (fit
//! scale and vertical offset) is applied separately by the engine.

use glam::{Mat4, Vec2, Vec3};

use crate::constants::GEOMETRY_EPSILON;
use crate::error::ProjectionError;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Bounds of a point set, `None` when empty
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Bounds of this box after transformation (all eight corners)
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        // Corner 0 is `self.min`
        let first = matrix.transform_point3(self.min);
        let (min, max) = (1..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { self.min.x } else { self.max.x },
                    if i & 2 == 0 { self.min.y } else { self.max.y },
                    if i & 4 == 0 { self.min.z } else { self.max.z },
                )
            })
            .map(|c| matrix.transform_point3(c))
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Self { min, max }
    }
}

/// One drawable primitive of the garment.
#[derive(Debug, Clone)]
pub struct MeshPrimitive {
    /// Name used for region classification
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Texture coordinates (empty when the source had none)
    pub uvs: Vec<Vec2>,
    /// Triangle list indices
    pub indices: Vec<u32>,
}

impl MeshPrimitive {
    /// Build a primitive, generating normals when `normals` is empty.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        normals: Vec<Vec3>,
        uvs: Vec<Vec2>,
        indices: Vec<u32>,
    ) -> Result<Self, ProjectionError> {
        let name = name.into();
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(ProjectionError::IndexOutOfRange {
                index,
                vertex_count: positions.len(),
            });
        }
        if indices.len() % 3 != 0
            || (!normals.is_empty() && normals.len() != positions.len())
            || (!uvs.is_empty() && uvs.len() != positions.len())
        {
            return Err(ProjectionError::AttributeMismatch(name));
        }

        let normals = if normals.is_empty() {
            compute_vertex_normals(&positions, &indices)
        } else {
            normals
        };

        Ok(Self {
            name,
            positions,
            normals,
            uvs,
            indices,
        })
    }

    /// Get the number of triangles in the primitive
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Model-space bounds, `None` for an empty primitive
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Iterate triangles as vertex index triples
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }
}

/// Area-weighted vertex normals from triangle faces.
///
/// Vertices not referenced by any non-degenerate triangle get +Y.
pub fn compute_vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(&p0), Some(&p1), Some(&p2)) = (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        // Cross product length is twice the area, which gives the weighting
        let face = (p1 - p0).cross(p2 - p0);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| {
            if n.length_squared() > GEOMETRY_EPSILON * GEOMETRY_EPSILON {
                n.normalize()
            } else {
                Vec3::Y
            }
        })
        .collect()
}

/// An imported garment: primitives in scene traversal order.
#[derive(Debug, Clone, Default)]
pub struct GarmentModel {
    pub primitives: Vec<MeshPrimitive>,
}

impl GarmentModel {
    pub fn new(primitives: Vec<MeshPrimitive>) -> Self {
        Self { primitives }
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(MeshPrimitive::triangle_count).sum()
    }

    /// Model-space bounds of every primitive
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(
            self.primitives
                .iter()
                .flat_map(|p| p.positions.iter().copied()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> (Vec<Vec3>, Vec<u32>) {
        (
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn test_generated_normals_face_plus_z() {
        let (positions, indices) = quad();
        let prim = MeshPrimitive::new("front", positions, vec![], vec![], indices).unwrap();
        assert_eq!(prim.normals.len(), 4);
        for n in &prim.normals {
            assert!((*n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_index_out_of_range_rejected() {
        let (positions, _) = quad();
        let result = MeshPrimitive::new("bad", positions, vec![], vec![], vec![0, 1, 9]);
        assert!(matches!(
            result,
            Err(ProjectionError::IndexOutOfRange { index: 9, vertex_count: 4 })
        ));
    }

    #[test]
    fn test_attribute_mismatch_rejected() {
        let (positions, indices) = quad();
        let result = MeshPrimitive::new("bad", positions, vec![Vec3::Z], vec![], indices);
        assert!(matches!(result, Err(ProjectionError::AttributeMismatch(_))));
    }

    #[test]
    fn test_transformed_bounds() {
        let (positions, indices) = quad();
        let prim = MeshPrimitive::new("front", positions, vec![], vec![], indices).unwrap();
        let bounds = prim.bounds().unwrap();
        assert!(bounds.center().length() < 1e-6);

        let matrix = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            glam::Quat::IDENTITY,
            Vec3::new(0.0, 1.0, 0.0),
        );
        let world = bounds.transformed(&matrix);
        assert!((world.center() - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-6);
        assert!((world.size() - Vec3::new(4.0, 4.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_empty_bounds() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }
}
