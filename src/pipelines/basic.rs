/// Per-material switches that end up in the pipeline state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterOptions {
    pub back_face_culling: bool,
    pub depth_write: bool,
    pub depth_compare: wgpu::CompareFunction,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            back_face_culling: true,
            depth_write: true,
            depth_compare: wgpu::CompareFunction::Less,
        }
    }
}

/// Pipeline layout for the three bind groups every lab program declares:
/// scene (0), object (1) and material (2).
pub fn mk_pipeline_layout(
    device: &wgpu::Device,
    label: &str,
    scene_bind_group_layout: &wgpu::BindGroupLayout,
    object_bind_group_layout: &wgpu::BindGroupLayout,
    material_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} Pipeline Layout")),
        bind_group_layouts: &[
            scene_bind_group_layout,
            object_bind_group_layout,
            material_bind_group_layout,
        ],
        push_constant_ranges: &[],
    })
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
    raster: RasterOptions,
) -> wgpu::RenderPipeline {
    let label = shader.label.map(|l| format!("{l} Render Pipeline"));
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: label.as_deref().or(Some("Render Pipeline")),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            // meshes are wound for a left-handed world
            front_face: wgpu::FrontFace::Cw,
            cull_mode: raster.back_face_culling.then_some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: raster.depth_write,
            depth_compare: raster.depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
