//! GPU vertex layout and uploaded meshes.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::data_structures::mesh::MeshData;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// One vertex as stored in GPU memory.
///
/// Every shader sees the same layout; programs that ignore the normal or the
/// uv simply don't declare those locations.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Mesh geometry uploaded to the GPU.
///
/// `submeshes` keeps the index ranges of the pieces a merged mesh was built
/// from, so each piece can still be drawn with its own material.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub submeshes: Vec<Range<u32>>,
}

impl Mesh {
    pub fn from_data(device: &wgpu::Device, name: &str, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: data.indices.len() as u32,
            submeshes: data.submeshes.clone(),
        }
    }

    /// Index range covering the whole mesh.
    pub fn all(&self) -> Range<u32> {
        0..self.num_elements
    }

    /// Index range of the `idx`-th merged piece, or the whole mesh if there
    /// is no such piece.
    pub fn submesh(&self, idx: usize) -> Range<u32> {
        match self.submeshes.get(idx) {
            Some(range) => range.clone(),
            None => {
                log::warn!(
                    "Mesh {} has no submesh {}, drawing all {} indices instead.",
                    self.name,
                    idx,
                    self.num_elements
                );
                self.all()
            }
        }
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh_range(&mut self, mesh: &'a Mesh, indices: Range<u32>);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_range(&mut self, mesh: &'b Mesh, indices: Range<u32>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(indices, 0, 0..1);
    }
}
