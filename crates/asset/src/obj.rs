//! OBJ mesh loading.
//!
//! Parsing is delegated to `tobj` (triangulation on, separate index
//! streams per attribute); this module deduplicates the face corners into
//! an indexed [`MeshData`], collapsing corners that reference the same
//! (position, texcoord, normal) triple.

use std::{
    collections::HashMap,
    io::{self, BufRead},
    path::Path,
};

use anyhow::{Context, Result, anyhow};

use crate::mesh::{MeshData, MeshVertex};

fn load_options() -> tobj::LoadOptions {
    let mut options = tobj::LoadOptions::default();
    options.triangulate = true;
    options.ignore_points = true;
    options.ignore_lines = true;
    // single_index stays off: corners keep separate v/vt/vn indices.
    options.single_index = false;
    options
}

/// Load an OBJ mesh from a file path. Material libraries referenced by the
/// file are resolved relative to it and reported diagnostically only.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(path, &load_options())
        .with_context(|| format!("Failed to parse OBJ file: {}", path.display()))?;

    match materials {
        Ok(materials) => {
            if let Some(first) = materials.first() {
                log::debug!(
                    "{}: {} material(s), first '{}'",
                    path.display(),
                    materials.len(),
                    first.name
                );
            }
        }
        Err(err) => log::warn!("Ignoring material library for {}: {err}", path.display()),
    }

    let mesh = merge_models(&models)
        .with_context(|| format!("No usable geometry in OBJ file: {}", path.display()))?;
    log::info!(
        "Loaded OBJ {}: {} vertices, {} indices, {} shape(s)",
        path.display(),
        mesh.vertices.len(),
        mesh.indices.len(),
        models.len()
    );
    Ok(mesh)
}

/// Load an OBJ mesh from a [`BufRead`] implementation. Material libraries
/// are not resolved in this mode.
pub fn load_obj_from_reader<R: BufRead>(mut reader: R) -> Result<MeshData> {
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
        Ok(Default::default())
    })
    .context("Failed to parse OBJ stream")?;
    merge_models(&models)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<MeshData> {
    load_obj_from_reader(io::Cursor::new(contents))
}

fn merge_models(models: &[tobj::Model]) -> Result<MeshData> {
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    struct Key {
        shape: usize,
        position: u32,
        texcoord: Option<u32>,
        normal: Option<u32>,
    }

    let mut unique: HashMap<Key, u32> = HashMap::new();
    let mut vertices: Vec<MeshVertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for (shape, model) in models.iter().enumerate() {
        let mesh = &model.mesh;
        for corner in 0..mesh.indices.len() {
            let position_idx = mesh.indices[corner];
            let texcoord_idx = mesh.texcoord_indices.get(corner).copied();
            let normal_idx = mesh.normal_indices.get(corner).copied();

            let key = Key {
                shape,
                position: position_idx,
                texcoord: texcoord_idx,
                normal: normal_idx,
            };
            let index = match unique.get(&key) {
                Some(&idx) => idx,
                None => {
                    let position = read_vec3(&mesh.positions, position_idx).ok_or_else(|| {
                        anyhow!(
                            "Position index {} out of bounds in shape '{}'",
                            position_idx,
                            model.name
                        )
                    })?;
                    let normal = normal_idx
                        .and_then(|i| read_vec3(&mesh.normals, i))
                        .unwrap_or([0.0, 0.0, 1.0]);
                    let uv = texcoord_idx
                        .and_then(|i| read_vec2(&mesh.texcoords, i))
                        .unwrap_or([0.0, 0.0]);

                    let idx = u32::try_from(vertices.len())
                        .map_err(|_| anyhow!("Too many vertices in OBJ (>{})", u32::MAX))?;
                    vertices.push(MeshVertex::new(position, normal, uv));
                    unique.insert(key, idx);
                    idx
                }
            };
            indices.push(index);
        }
    }

    if vertices.is_empty() || indices.is_empty() {
        anyhow::bail!("OBJ contained no vertices");
    }

    Ok(MeshData::new(vertices, indices))
}

fn read_vec3(data: &[f32], index: u32) -> Option<[f32; 3]> {
    let base = (index as usize).checked_mul(3)?;
    let chunk = data.get(base..base + 3)?;
    Some([chunk[0], chunk[1], chunk[2]])
}

fn read_vec2(data: &[f32], index: u32) -> Option<[f32; 2]> {
    let base = (index as usize).checked_mul(2)?;
    let chunk = data.get(base..base + 2)?;
    Some([chunk[0], chunk[1]])
}
