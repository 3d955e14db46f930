//! glTF/GLB garment import.

use std::path::Path;

use garment::{GarmentModel, MeshPrimitive};
use glam::{Mat3, Mat4, Vec2, Vec3};
use tracing::{debug, info, warn};

use crate::LoadError;

/// Read and import a garment model from disk
pub async fn load_model_file(path: impl AsRef<Path>) -> Result<GarmentModel, LoadError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    // External buffers resolve relative to the model file
    let base = path.parent().map(Path::to_path_buf);
    tokio::task::spawn_blocking(move || import_model(&bytes, base.as_deref()))
        .await
        .map_err(|e| LoadError::Task(e.to_string()))?
}

/// Import every triangle primitive of the default scene.
///
/// Node transforms are baked into the vertex data. Primitives are named
/// after their node, falling back to the mesh name and then
/// `primitive_<n>`; meshes with several primitives append `_<i>`.
///
/// `base` is the directory used for buffers referenced by relative URI;
/// without it only embedded and `data:` buffers load.
pub fn import_model(bytes: &[u8], base: Option<&Path>) -> Result<GarmentModel, LoadError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, base, blob)?;

    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        return Err(LoadError::EmptyModel);
    };

    let mut primitives = Vec::new();
    for node in scene.nodes() {
        visit_node(&node, Mat4::IDENTITY, &buffers, &mut primitives)?;
    }
    if primitives.is_empty() {
        return Err(LoadError::EmptyModel);
    }

    let model = GarmentModel::new(primitives);
    info!(
        "Imported garment: {} primitives, {} triangles",
        model.primitives.len(),
        model.triangle_count()
    );
    Ok(model)
}

fn visit_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<MeshPrimitive>,
) -> Result<(), LoadError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let count = mesh.primitives().len();
        for (i, primitive) in mesh.primitives().enumerate() {
            let base = node
                .name()
                .or(mesh.name())
                .map(str::to_string)
                .unwrap_or_else(|| format!("primitive_{}", out.len()));
            let name = if count > 1 { format!("{base}_{i}") } else { base };

            if primitive.mode() != gltf::mesh::Mode::Triangles {
                warn!("Skipping {}: {:?} primitives are not supported", name, primitive.mode());
                continue;
            }
            if let Some(converted) = convert_primitive(&primitive, &name, world, buffers)? {
                out.push(converted);
            }
        }
    }

    for child in node.children() {
        visit_node(&child, world, buffers, out)?;
    }
    Ok(())
}

fn convert_primitive(
    primitive: &gltf::Primitive,
    name: &str,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Result<Option<MeshPrimitive>, LoadError> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let Some(positions) = reader.read_positions() else {
        warn!("Skipping {}: no positions", name);
        return Ok(None);
    };
    let positions: Vec<Vec3> = positions
        .map(|p| world.transform_point3(Vec3::from_array(p)))
        .collect();

    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let normals: Vec<Vec3> = reader
        .read_normals()
        .map(|normals| {
            normals
                .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or(Vec3::Y))
                .collect()
        })
        .unwrap_or_default();

    let uvs: Vec<Vec2> = reader
        .read_tex_coords(0)
        .map(|uvs| uvs.into_f32().map(Vec2::from_array).collect())
        .unwrap_or_default();

    let mut indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    if world.determinant() < 0.0 {
        // Mirrored node: restore counter-clockwise winding
        for triangle in indices.chunks_exact_mut(3) {
            triangle.swap(1, 2);
        }
    }

    Ok(Some(MeshPrimitive::new(name, positions, normals, uvs, indices)?))
}
