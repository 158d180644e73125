//! lab04: first custom programs. A flat yellow box, plus a plane and a
//! sphere whose vertices the programs move over time.

use cgmath::{EuclideanSpace, Point3, Vector3};
use instant::Duration;

use crate::{
    camera::Camera,
    context::{Context, InitContext},
    data_structures::mesh::{create_box, create_ground, create_sphere},
    flow::{GraphicsFlow, Out},
    labs::Placed,
    pipelines::{
        light::Light,
        material::{MaterialDescriptor, ShaderMaterial},
        standard::{StandardMaterial, StandardOptions},
    },
    render::{Draw, Render},
    shaders::{self, Crazy, FlatColor, Wave},
    transform::Transform,
};

const WAVE_AMPLITUDE: f32 = 0.25;
const WAVE_FREQUENCY: f32 = 3.0;
const CRAZY_AMPLITUDE: f32 = 0.15;

pub struct ShaderProgramming {
    ground: Placed,
    ground_material: StandardMaterial,
    box_: Placed,
    yellow: ShaderMaterial<FlatColor>,
    plane: Placed,
    wave: ShaderMaterial<Wave>,
    sphere: Placed,
    crazy: ShaderMaterial<Crazy>,
}

fn wave_at(time: f32) -> Wave {
    Wave {
        time,
        amplitude: WAVE_AMPLITUDE,
        frequency: WAVE_FREQUENCY,
        _padding: 0.0,
    }
}

fn crazy_at(time: f32) -> Crazy {
    Crazy {
        time,
        amplitude: CRAZY_AMPLITUDE,
        _padding: [0.0; 2],
    }
}

impl ShaderProgramming {
    pub async fn new(ctx: InitContext) -> anyhow::Result<Self> {
        let ground = Placed::new(&ctx, "ground", &create_ground(6.0, 6.0, 2), Transform::new());
        let ground_material = StandardMaterial::new(&ctx, "ground", StandardOptions::default());

        let box_ = Placed::new(&ctx, "box", &create_box(2.0, 2.0, 2.0), Transform::at(0.0, 1.0, 0.0));
        let yellow = ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("yellow", shaders::FLAT_COLOR),
            &FlatColor {
                color: [1.0, 1.0, 0.0, 1.0],
            },
        );

        let plane = Placed::new(
            &ctx,
            "wave plane",
            &create_ground(2.5, 2.5, 32),
            Transform::at(3.5, 0.5, 2.0),
        );
        let wave = ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("wave", shaders::WAVE).double_sided(),
            &wave_at(0.0),
        );

        let sphere = Placed::new(
            &ctx,
            "crazy sphere",
            &create_sphere(1.5, 48),
            Transform::at(-3.0, 1.2, 1.0),
        );
        let crazy = ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("crazy", shaders::CRAZY),
            &crazy_at(0.0),
        );

        Ok(Self {
            ground,
            ground_material,
            box_,
            yellow,
            plane,
            wave,
            sphere,
            crazy,
        })
    }
}

impl GraphicsFlow<()> for ShaderProgramming {
    fn on_init(&mut self, ctx: &mut Context, _: &mut ()) -> Out<()> {
        ctx.set_camera(Camera::free_looking_at(
            Point3::new(0.0, 5.0, -10.0),
            Point3::origin(),
        ));
        ctx.set_light(Light::hemispheric(Vector3::unit_y()).with_intensity(0.7));
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: &mut (), _: Duration) -> Out<()> {
        let time = ctx.elapsed.as_secs_f32();
        self.wave.set_uniforms(&ctx.queue, &wave_at(time));
        self.crazy.set_uniforms(&ctx.queue, &crazy_at(time));
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::Opaques(vec![
            Draw::new(&self.ground.mesh, &self.ground.object, &self.ground_material),
            Draw::new(&self.box_.mesh, &self.box_.object, &self.yellow),
            Draw::new(&self.plane.mesh, &self.plane.object, &self.wave),
            Draw::new(&self.sphere.mesh, &self.sphere.object, &self.crazy),
        ])
    }
}
