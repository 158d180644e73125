//! lab05: world matrices composed by hand on the CPU.
//!
//! Both boxes ignore their object transform. The program reads `my_world`
//! from the material block, filled every frame from [`BoxAnimation`] and
//! the parent/child product.

use std::f32::consts::PI;

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};
use instant::Duration;

use crate::{
    camera::Camera,
    context::{Context, InitContext},
    data_structures::mesh::{create_box, create_ground},
    flow::{GraphicsFlow, Out},
    labs::Placed,
    pipelines::{
        light::Light,
        material::{MaterialDescriptor, ShaderMaterial},
        standard::{StandardMaterial, StandardOptions},
    },
    render::{Draw, Render},
    shaders::{self, CustomWorld},
    transform::{BoxAnimation, EulerTransform, Transform, apply_parent_matrix},
};

const BOX_COLOR: [f32; 3] = [100.0 / 255.0, 180.0 / 255.0, 220.0 / 255.0];
const CHILD_COLOR: [f32; 3] = [1.0, 0.0, 0.0];

pub struct Transformations {
    ground: Placed,
    ground_material: StandardMaterial,
    parent: Placed,
    parent_material: ShaderMaterial<CustomWorld>,
    child: Placed,
    child_material: ShaderMaterial<CustomWorld>,
    animation: BoxAnimation,
    child_local: EulerTransform,
}

/// The matrices of both boxes at time `t`.
fn box_matrices(animation: &BoxAnimation, child_local: &EulerTransform, t: f32) -> (Matrix4<f32>, Matrix4<f32>) {
    let parent = animation.at(t).to_matrix();
    let child = apply_parent_matrix(parent, child_local.to_matrix());
    (parent, child)
}

fn custom_world(world: Matrix4<f32>, color: [f32; 3], time: f32) -> CustomWorld {
    CustomWorld {
        my_world: world.into(),
        color,
        time,
    }
}

impl Transformations {
    pub async fn new(ctx: InitContext) -> anyhow::Result<Self> {
        let ground = Placed::new(&ctx, "ground", &create_ground(10.0, 10.0, 1), Transform::new());
        let ground_material = StandardMaterial::new(
            &ctx,
            "ground",
            StandardOptions::default().double_sided(),
        );

        let animation = BoxAnimation;
        // The classroom version leaves the child at the identity, inside the
        // parent. Lifting it by 4 keeps it visible.
        let child_local = EulerTransform {
            translation: Vector3::new(0.0, 4.0, 0.0),
            ..EulerTransform::identity()
        };
        let (parent_world, child_world) = box_matrices(&animation, &child_local, 0.0);

        let parent = Placed::new(&ctx, "box", &create_box(5.0, 5.0, 5.0), Transform::new());
        let parent_material = ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("box", shaders::CUSTOM_WORLD).double_sided(),
            &custom_world(parent_world, BOX_COLOR, 0.0),
        );
        let child = Placed::new(&ctx, "child box", &create_box(2.0, 2.0, 2.0), Transform::new());
        let child_material = ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("child box", shaders::CUSTOM_WORLD).double_sided(),
            &custom_world(child_world, CHILD_COLOR, 0.0),
        );

        Ok(Self {
            ground,
            ground_material,
            parent,
            parent_material,
            child,
            child_material,
            animation,
            child_local,
        })
    }
}

impl GraphicsFlow<()> for Transformations {
    fn on_init(&mut self, ctx: &mut Context, _: &mut ()) -> Out<()> {
        ctx.set_camera(Camera::arc_rotate(-PI / 2.0, PI / 2.0, 20.0, Point3::origin()));
        ctx.set_light(Light::hemispheric(Vector3::unit_y()).with_intensity(0.7));
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: &mut (), _: Duration) -> Out<()> {
        let time = ctx.elapsed.as_secs_f32();
        let (parent, child) = box_matrices(&self.animation, &self.child_local, time);
        self.parent_material
            .set_uniforms(&ctx.queue, &custom_world(parent, BOX_COLOR, time));
        self.child_material
            .set_uniforms(&ctx.queue, &custom_world(child, CHILD_COLOR, time));
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::Opaques(vec![
            Draw::new(&self.ground.mesh, &self.ground.object, &self.ground_material),
            Draw::new(&self.parent.mesh, &self.parent.object, &self.parent_material),
            Draw::new(&self.child.mesh, &self.child.object, &self.child_material),
        ])
    }
}
