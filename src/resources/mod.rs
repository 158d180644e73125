use std::io::{BufReader, Cursor};

use anyhow::{Context as _, bail};
use cgmath::Matrix4;

use crate::data_structures::{
    mesh::{MeshData, merge_meshes},
    model::ModelVertex,
};

/**
 * This module contains all logic for loading meshes and textures from external files.
 */
pub mod texture;

pub use texture::load_binary;

/// Loads every mesh primitive of a glTF/GLB file, with node transforms baked
/// in, as one mesh. Each primitive becomes one sub-mesh.
///
/// glTF is right-handed; the result is mirrored on X to face the same way in
/// the left-handed scenes.
pub async fn load_gltf_meshes(file_name: &str) -> anyhow::Result<MeshData> {
    let gltf_bytes = load_binary(file_name).await?;
    let gltf_reader = BufReader::new(Cursor::new(gltf_bytes));
    let gltf = gltf::Gltf::from_reader(gltf_reader)
        .with_context(|| format!("cannot parse glTF {file_name}"))?;

    let mut buffer_data: Vec<Vec<u8>> = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .with_context(|| format!("{file_name} references a missing binary chunk"))?;
                buffer_data.push(blob.into());
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri).await?;
                buffer_data.push(bin);
            }
        }
    }

    let root = Matrix4::from_nonuniform_scale(-1.0, 1.0, 1.0);
    let mut parts = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            collect_node(&node, root, &buffer_data, &mut parts)?;
        }
    }

    match merge_meshes(&parts) {
        Some(mesh) => {
            log::info!(
                "Loaded {} with {} primitives and {} vertices",
                file_name,
                parts.len(),
                mesh.vertices.len()
            );
            Ok(mesh)
        }
        None => bail!("{file_name} contains no meshes"),
    }
}

fn collect_node(
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffer_data: &[Vec<u8>],
    parts: &mut Vec<MeshData>,
) -> anyhow::Result<()> {
    let world = parent * Matrix4::from(node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            let data = read_primitive(&primitive, buffer_data).with_context(|| {
                format!(
                    "mesh {} primitive {}",
                    mesh.name().unwrap_or("<unnamed>"),
                    primitive.index()
                )
            })?;
            parts.push(data.transformed(world));
        }
    }
    for child in node.children() {
        collect_node(&child, world, buffer_data, parts)?;
    }
    Ok(())
}

fn read_primitive(primitive: &gltf::Primitive, buffer_data: &[Vec<u8>]) -> anyhow::Result<MeshData> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        bail!("only triangle lists are supported, got {:?}", primitive.mode());
    }
    let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));
    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .context("primitive has no positions")?
        .collect();

    let mut vertices: Vec<ModelVertex> = positions
        .iter()
        .map(|&position| ModelVertex {
            position,
            ..Default::default()
        })
        .collect();
    let has_normals = match reader.read_normals() {
        Some(normals) => {
            vertices
                .iter_mut()
                .zip(normals)
                .for_each(|(v, n)| v.normal = n);
            true
        }
        None => false,
    };
    if let Some(tex_coords) = reader.read_tex_coords(0) {
        vertices
            .iter_mut()
            .zip(tex_coords.into_f32())
            .for_each(|(v, uv)| v.tex_coords = uv);
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };
    if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        bail!("index {} out of range for {} vertices", bad, vertices.len());
    }

    let data = MeshData::new(vertices, indices);
    Ok(if has_normals {
        data
    } else {
        data.compute_normals()
    })
}
