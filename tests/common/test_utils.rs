#[cfg(feature = "integration-tests")]
use shader_labs::{
    context::Context,
    data_structures::{model::Mesh, object::Object},
    flow::{GraphicsFlow, ImageTestResult, Out},
    pipelines::material::Material,
    render::{Draw, Render},
};

#[derive(Default)]
pub(crate) struct FrameCounter(pub(crate) u32);

impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) type Validate = Box<
    dyn Fn(
        &Context,
        &mut FrameCounter,
        &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error>,
>;

/// A one-object scene that hands every rendered frame to `validate`.
#[cfg(feature = "integration-tests")]
pub(crate) struct TestScene {
    pub(crate) drawable: Option<(Mesh, Object, Box<dyn Material>)>,
    pub(crate) setup: Box<dyn Fn(&mut Context)>,
    pub(crate) validate: Validate,
}

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<FrameCounter> for TestScene {
    fn on_init(&mut self, ctx: &mut Context, _: &mut FrameCounter) -> Out<FrameCounter> {
        (self.setup)(ctx);
        Out::Empty
    }

    fn on_update(
        &mut self,
        _: &Context,
        state: &mut FrameCounter,
        _: std::time::Duration,
    ) -> Out<FrameCounter> {
        state.progress();
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        match &self.drawable {
            Some((mesh, object, material)) => {
                Render::Opaque(Draw::new(mesh, object, material.as_ref()))
            }
            None => Render::None,
        }
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut FrameCounter,
        texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        (self.validate)(ctx, state, texture)
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) fn to_pixel(colour: wgpu::Color) -> image::Rgba<u8> {
    let f_to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    image::Rgba([
        f_to_u8(colour.r),
        f_to_u8(colour.g),
        f_to_u8(colour.b),
        f_to_u8(colour.a),
    ])
}

#[macro_export]
macro_rules! golden_image_test {
    ($build:expr) => {{
        use crate::common::test_utils::{FrameCounter, TestScene};
        use shader_labs::context::InitContext;
        use shader_labs::flow::{FlowConstructor, GraphicsFlow};
        let constructor: FlowConstructor<FrameCounter> = Box::new(|ctx: InitContext| {
            Box::pin(async move {
                let scene: TestScene = ($build)(ctx)?;
                let g_flow: Box<dyn GraphicsFlow<FrameCounter>> = Box::new(scene);
                Ok(g_flow)
            })
        });

        shader_labs::flow::run(vec![constructor])
            .expect("Failed to run flow for integration test.");
    }};
}

/// Byte a linear channel value ends up as in a target of `format`.
#[cfg(feature = "integration-tests")]
pub(crate) fn channel_byte(linear: f32, format: wgpu::TextureFormat) -> u8 {
    let c = linear.clamp(0.0, 1.0);
    let encoded = if !format.is_srgb() {
        c
    } else if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (encoded * 255.0).round() as u8
}

/// Pixel of the `width` x `height` target that `point` is drawn at by the
/// current camera and projection.
#[cfg(feature = "integration-tests")]
pub(crate) fn pixel_of(
    ctx: &Context,
    point: cgmath::Point3<f32>,
    width: u32,
    height: u32,
) -> (u32, u32) {
    use cgmath::EuclideanSpace;
    let view_proj = ctx.projection.calc_matrix() * ctx.camera.camera.calc_matrix();
    let clip = view_proj * point.to_homogeneous();
    let (x, y) = (clip.x / clip.w, clip.y / clip.w);
    let px = ((x + 1.0) / 2.0 * width as f32) as u32;
    let py = ((1.0 - y) / 2.0 * height as f32) as u32;
    (px.min(width - 1), py.min(height - 1))
}
