//! lab09: a mirror sphere reflecting a cube map, and the same cube map
//! drawn as the sky behind it.

use std::f32::consts::FRAC_PI_2;

use cgmath::{EuclideanSpace, Point3};
use instant::Duration;

use crate::{
    camera::Camera,
    context::{Context, InitContext},
    data_structures::mesh::{create_box, create_sphere},
    flow::{GraphicsFlow, Out},
    labs::Placed,
    pipelines::material::{MaterialDescriptor, ShaderMaterial},
    render::{Draw, Render},
    resources::texture::load_cube_or_fallback,
    shaders::{self, Reflection, Skybox},
    transform::Transform,
};

pub struct Reflections {
    sphere: Placed,
    mirror: ShaderMaterial<Reflection>,
    skybox: Placed,
    sky: ShaderMaterial<Skybox>,
}

fn reflection_block(eye: Point3<f32>) -> Reflection {
    Reflection {
        view_position: eye.into(),
        _padding: 0.0,
    }
}

impl Reflections {
    pub async fn new(ctx: InitContext) -> anyhow::Result<Self> {
        let cube = load_cube_or_fallback("skybox", "jpg", &ctx.device, &ctx.queue).await?;

        let sphere = Placed::new(&ctx, "sphere", &create_sphere(1.0, 32), Transform::at(0.0, 1.0, 0.0));
        let mirror = ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("mirror", shaders::REFLECTION).with_cube(&cube),
            &reflection_block(Point3::origin()),
        );

        // seen from the inside
        let sky_box = create_box(4.0, 4.0, 4.0).flip_faces();
        let skybox = Placed::new(&ctx, "skybox", &sky_box, Transform::new());
        let sky = ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("skybox", shaders::SKYBOX)
                .with_cube(&cube)
                .background(),
            &Skybox::default(),
        );

        Ok(Self {
            sphere,
            mirror,
            skybox,
            sky,
        })
    }
}

impl GraphicsFlow<()> for Reflections {
    fn on_init(&mut self, ctx: &mut Context, _: &mut ()) -> Out<()> {
        ctx.set_camera(Camera::arc_rotate(-FRAC_PI_2, 1.0, 10.0, Point3::origin()));
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: &mut (), _: Duration) -> Out<()> {
        let eye = ctx.camera.camera.position();
        self.mirror.set_uniforms(&ctx.queue, &reflection_block(eye));
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::Composed(vec![
            Draw::new(&self.sphere.mesh, &self.sphere.object, &self.mirror).into(),
            Render::Background(Draw::new(&self.skybox.mesh, &self.skybox.object, &self.sky)),
        ])
    }
}
