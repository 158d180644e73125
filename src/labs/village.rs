//! lab03: a tiny village built from hand-made and merged meshes.

use std::f32::consts::PI;

use anyhow::Context as _;
use cgmath::{EuclideanSpace, Point3, Vector3};
use instant::Duration;

use crate::{
    camera::Camera,
    context::{Context, InitContext},
    data_structures::mesh::{
        MeshData, create_box, create_circle, create_cylinder, create_ground, create_sphere,
        merge_meshes,
    },
    flow::{GraphicsFlow, Out},
    labs::Placed,
    pipelines::{
        light::Light,
        standard::{StandardMaterial, StandardOptions},
    },
    render::{Draw, Render},
    resources::texture::load_texture_or_fallback,
    transform::Transform,
};

pub struct Village {
    circle: Placed,
    circle_material: StandardMaterial,
    ground: Placed,
    ground_material: StandardMaterial,
    snowman: Placed,
    snowman_material: StandardMaterial,
    house: Placed,
    floor_material: StandardMaterial,
    roof_material: StandardMaterial,
}

/// Teal, full green and blue.
fn snowman_options() -> StandardOptions<'static> {
    StandardOptions::colored(Vector3::new(0.0, 1.0, 1.0))
}

impl Village {
    pub async fn new(ctx: InitContext) -> anyhow::Result<Self> {
        let normal_map = load_texture_or_fallback("normalMap.jpg", &ctx.device, &ctx.queue).await;
        let floor = load_texture_or_fallback("floor.png", &ctx.device, &ctx.queue).await;
        let roof = load_texture_or_fallback("roof.jpg", &ctx.device, &ctx.queue).await;

        let circle = Placed::new(&ctx, "circle", &create_circle(10, 8.0), Transform::new());
        let circle_material = StandardMaterial::new(
            &ctx,
            "circle",
            StandardOptions::textured(&normal_map).double_sided(),
        );

        let ground = Placed::new(&ctx, "ground", &create_ground(10.0, 10.0, 1), Transform::new());
        let ground_material = StandardMaterial::new(
            &ctx,
            "ground",
            StandardOptions::colored(Vector3::new(0.0, 1.0, 0.0)),
        );

        let snowman = merge_meshes(&[
            create_sphere(3.0, 32).translated(0.0, 1.5, 0.0),
            create_sphere(2.0, 32).translated(0.0, 3.5, 0.0),
            create_sphere(1.0, 32).translated(0.0, 4.75, 0.0),
        ])
        .context("failed to merge the snowman")?;
        let snowman = Placed::new(&ctx, "snowman", &snowman, Transform::new());
        let snowman_material = StandardMaterial::new(&ctx, "snowman", snowman_options());

        let house = build_house(2.0, 3.0).context("failed to merge the house")?;
        let house = Placed::new(&ctx, "house", &house, Transform::new());
        let floor_material = StandardMaterial::new(&ctx, "floor", StandardOptions::textured(&floor));
        let roof_material = StandardMaterial::new(&ctx, "roof", StandardOptions::textured(&roof));

        Ok(Self {
            circle,
            circle_material,
            ground,
            ground_material,
            snowman,
            snowman_material,
            house,
            floor_material,
            roof_material,
        })
    }
}

/// Box walls with a triangular prism roof on top. Sub-mesh 0 is the box,
/// sub-mesh 1 the roof.
fn build_house(width: f32, pos_x: f32) -> Option<MeshData> {
    let walls = create_box(width, 1.0, 1.0).translated(pos_x, 0.5, 0.0);
    let roof_transform = Transform {
        position: Vector3::new(pos_x, 1.22, 0.0),
        rotation: Vector3::new(0.0, 0.0, PI / 2.0),
        scaling: Vector3::new(0.75, width, 1.0),
    };
    let roof = create_cylinder(1.3, 1.2, 3).transformed(roof_transform.to_matrix());
    merge_meshes(&[walls, roof])
}

impl GraphicsFlow<()> for Village {
    fn on_init(&mut self, ctx: &mut Context, _: &mut ()) -> Out<()> {
        ctx.set_camera(Camera::arc_rotate(-PI / 2.0, PI / 2.5, 10.0, Point3::origin()));
        ctx.set_light(Light::hemispheric(Vector3::new(1.0, 1.0, 0.0)));
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, _: &mut (), _: Duration) -> Out<()> {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::Opaques(vec![
            Draw::new(&self.ground.mesh, &self.ground.object, &self.ground_material),
            Draw::new(&self.circle.mesh, &self.circle.object, &self.circle_material),
            Draw::new(&self.snowman.mesh, &self.snowman.object, &self.snowman_material),
            Draw::submesh(&self.house.mesh, 0, &self.house.object, &self.floor_material),
            Draw::submesh(&self.house.mesh, 1, &self.house.object, &self.roof_material),
        ])
    }
}
