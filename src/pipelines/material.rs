//! Shader materials: a compiled program plus its uniform block and samplers.

use std::marker::PhantomData;

use wgpu::util::DeviceExt;

use crate::{
    context::InitContext,
    data_structures::{
        model::{ModelVertex, Vertex},
        texture::{CubeTexture, Texture, create_default_sampler},
    },
    pipelines::basic::{RasterOptions, mk_pipeline_layout, mk_render_pipeline},
};

/// Anything a draw can be shaded with.
pub trait Material {
    fn pipeline(&self) -> &wgpu::RenderPipeline;
    fn bind_group(&self) -> &wgpu::BindGroup;
}

/// The texture a material samples from, if any.
#[derive(Clone, Copy, Debug, Default)]
pub enum SamplerSlot<'a> {
    #[default]
    None,
    Texture(&'a Texture),
    Cube(&'a CubeTexture),
}

#[derive(Clone, Copy, Debug)]
pub struct MaterialDescriptor<'a> {
    pub label: &'a str,
    /// Full WGSL source with `vs_main` and `fs_main` entry points.
    pub source: &'a str,
    pub sampler: SamplerSlot<'a>,
    pub back_face_culling: bool,
    pub depth_write: bool,
    pub depth_compare: wgpu::CompareFunction,
}

impl<'a> MaterialDescriptor<'a> {
    pub fn new(label: &'a str, source: &'a str) -> Self {
        let raster = RasterOptions::default();
        Self {
            label,
            source,
            sampler: SamplerSlot::None,
            back_face_culling: raster.back_face_culling,
            depth_write: raster.depth_write,
            depth_compare: raster.depth_compare,
        }
    }

    pub fn with_texture(mut self, texture: &'a Texture) -> Self {
        self.sampler = SamplerSlot::Texture(texture);
        self
    }

    pub fn with_cube(mut self, cube: &'a CubeTexture) -> Self {
        self.sampler = SamplerSlot::Cube(cube);
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.back_face_culling = false;
        self
    }

    /// Drawn behind everything else: no depth writes, passes at the far plane.
    pub fn background(mut self) -> Self {
        self.depth_write = false;
        self.depth_compare = wgpu::CompareFunction::LessEqual;
        self
    }

    fn raster(&self) -> RasterOptions {
        RasterOptions {
            back_face_culling: self.back_face_culling,
            depth_write: self.depth_write,
            depth_compare: self.depth_compare,
        }
    }
}

/// A custom shader program with a typed uniform block `U`.
///
/// `U` must mirror the program's `@group(2) @binding(0)` struct. Values are
/// pushed with [`set_uniforms`](Self::set_uniforms) and take effect on the
/// next submitted frame.
#[derive(Debug)]
pub struct ShaderMaterial<U> {
    pub label: String,
    pipeline: wgpu::RenderPipeline,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    _uniform: PhantomData<U>,
}

impl<U: bytemuck::Pod> ShaderMaterial<U> {
    pub fn new(ctx: &InitContext, desc: MaterialDescriptor<'_>, initial: &U) -> Self {
        let device = &ctx.device;
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Uniform Buffer", desc.label)),
            contents: bytemuck::cast_slice(std::slice::from_ref(initial)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layout = material_layout(device, desc.label, &desc.sampler);
        let fallback_sampler;
        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }];
        match desc.sampler {
            SamplerSlot::None => {}
            SamplerSlot::Texture(texture) => {
                let sampler = match &texture.sampler {
                    Some(sampler) => sampler,
                    None => {
                        fallback_sampler = create_default_sampler(device);
                        &fallback_sampler
                    }
                };
                entries.push(wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                });
                entries.push(wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                });
            }
            SamplerSlot::Cube(cube) => {
                entries.push(wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&cube.view),
                });
                entries.push(wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&cube.sampler),
                });
            }
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &entries,
            label: Some(&format!("{} Material Bind Group", desc.label)),
        });

        let pipeline_layout = mk_pipeline_layout(
            device,
            desc.label,
            &ctx.scene_bind_group_layout,
            &ctx.object_bind_group_layout,
            &layout,
        );
        let shader = wgpu::ShaderModuleDescriptor {
            label: Some(desc.label),
            source: wgpu::ShaderSource::Wgsl(desc.source.into()),
        };
        let pipeline = mk_render_pipeline(
            device,
            &pipeline_layout,
            ctx.format,
            Some(wgpu::BlendState {
                alpha: wgpu::BlendComponent::REPLACE,
                color: wgpu::BlendComponent::REPLACE,
            }),
            Some(Texture::DEPTH_FORMAT),
            &[ModelVertex::desc()],
            shader,
            desc.raster(),
        );
        log::debug!("Compiled material {}", desc.label);

        Self {
            label: desc.label.to_string(),
            pipeline,
            buffer,
            bind_group,
            _uniform: PhantomData,
        }
    }

    pub fn set_uniforms(&self, queue: &wgpu::Queue, uniforms: &U) {
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(std::slice::from_ref(uniforms)),
        );
    }
}

impl<U> Material for ShaderMaterial<U> {
    fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

fn material_layout(
    device: &wgpu::Device,
    label: &str,
    sampler: &SamplerSlot<'_>,
) -> wgpu::BindGroupLayout {
    let mut entries = vec![wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }];
    let view_dimension = match sampler {
        SamplerSlot::None => None,
        SamplerSlot::Texture(_) => Some(wgpu::TextureViewDimension::D2),
        SamplerSlot::Cube(_) => Some(wgpu::TextureViewDimension::Cube),
    };
    if let Some(view_dimension) = view_dimension {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        });
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
    }
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &entries,
        label: Some(&format!("{label} Material Layout")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_defaults_cull_and_write_depth() {
        let desc = MaterialDescriptor::new("box", "");
        assert!(desc.back_face_culling);
        assert!(desc.depth_write);
        assert_eq!(desc.depth_compare, wgpu::CompareFunction::Less);
        assert!(matches!(desc.sampler, SamplerSlot::None));
    }

    #[test]
    fn background_materials_sit_at_the_far_plane() {
        let desc = MaterialDescriptor::new("sky", "").double_sided().background();
        assert!(!desc.back_face_culling);
        assert!(!desc.depth_write);
        assert_eq!(desc.raster().depth_compare, wgpu::CompareFunction::LessEqual);
    }
}
