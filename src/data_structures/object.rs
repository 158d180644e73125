//! Placed meshes and their per-object uniforms.

use cgmath::{Matrix3, Matrix4};
use wgpu::util::DeviceExt;

use crate::transform::{Transform, normal_matrix};

/**
 * The raw object data as stored on the GPU (bind group 1)
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    world: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
}

impl ObjectUniform {
    pub fn from_world(world: Matrix4<f32>) -> Self {
        let normal: Matrix4<f32> = Matrix4::from(normal_matrix(world));
        Self {
            world: world.into(),
            normal: normal.into(),
        }
    }
}

/// A mesh placement: a [`Transform`] plus the uniform buffer the vertex
/// programs read `world` and the normal matrix from.
///
/// The world matrix normally comes from `transform`. Labs that compose their
/// own matrices (the transformations lab) hand one in with
/// [`set_world`](Self::set_world), which takes precedence until cleared.
#[derive(Debug)]
pub struct Object {
    pub name: String,
    pub transform: Transform,
    world_override: Option<Matrix4<f32>>,
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl Object {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        name: &str,
        transform: Transform,
    ) -> Self {
        let uniform = ObjectUniform::from_world(transform.to_matrix());
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Object Buffer")),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(&format!("{name} Object Bind Group")),
        });
        Self {
            name: name.to_string(),
            transform,
            world_override: None,
            buffer,
            bind_group,
        }
    }

    pub fn desc(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("object_bind_group_layout"),
        })
    }

    pub fn world(&self) -> Matrix4<f32> {
        self.world_override
            .unwrap_or_else(|| self.transform.to_matrix())
    }

    pub fn normal_matrix(&self) -> Matrix3<f32> {
        normal_matrix(self.world())
    }

    pub fn set_world(&mut self, world: Matrix4<f32>) {
        self.world_override = Some(world);
    }

    pub fn clear_world(&mut self) {
        self.world_override = None;
    }

    /// Upload the current world and normal matrices.
    pub fn write_to_buffer(&self, queue: &wgpu::Queue) {
        let uniform = ObjectUniform::from_world(self.world());
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{SquareMatrix, Vector3};

    use super::*;

    #[test]
    fn uniform_carries_world_and_inverse_transpose() {
        let world = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0))
            * Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let raw = ObjectUniform::from_world(world);
        let expected_world: [[f32; 4]; 4] = world.into();
        assert_eq!(raw.world, expected_world);
        // x is halved by the inverse transpose of a 2x stretch, translation dropped
        assert_relative_eq!(raw.normal[0][0], 0.5);
        assert_relative_eq!(raw.normal[3][0], 0.0);
        assert_relative_eq!(raw.normal[3][3], 1.0);
    }

    #[test]
    fn identity_uniform() {
        let raw = ObjectUniform::from_world(Matrix4::identity());
        let id: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        assert_eq!(raw.world, id);
        assert_eq!(raw.normal, id);
    }
}
