//! lab08: sampling 2D textures on a box, a hand-made pyramid and an
//! imported glTF fish.

use std::f32::consts::FRAC_PI_2;

use cgmath::{EuclideanSpace, Point3, Vector3};
use instant::Duration;

use crate::{
    camera::Camera,
    context::{Context, InitContext},
    data_structures::mesh::{create_box, create_pyramid},
    flow::{GraphicsFlow, Out},
    labs::Placed,
    pipelines::{
        light::Light,
        material::{MaterialDescriptor, ShaderMaterial},
    },
    render::{Draw, Render},
    resources::{load_gltf_meshes, texture::load_texture_or_fallback},
    shaders::{self, Textured},
    transform::Transform,
};

pub struct Textures {
    box_: Placed,
    pyramid: Placed,
    wood: ShaderMaterial<Textured>,
    fish: Option<Placed>,
    fish_material: ShaderMaterial<Textured>,
}

impl Textures {
    pub async fn new(ctx: InitContext) -> anyhow::Result<Self> {
        let wood_texture = load_texture_or_fallback("wood.jpg", &ctx.device, &ctx.queue).await;
        let fish_texture = load_texture_or_fallback("fishtexture.png", &ctx.device, &ctx.queue).await;

        let box_ = Placed::new(&ctx, "box", &create_box(1.0, 1.0, 1.0), Transform::at(1.5, 1.0, 0.0));
        let pyramid = Placed::new(&ctx, "pyramid", &create_pyramid(), Transform::at(-1.0, 1.0, 0.0));
        // box and pyramid share one material, so both are drawn double sided
        let wood = ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("wood", shaders::TEXTURED)
                .with_texture(&wood_texture)
                .double_sided(),
            &Textured::default(),
        );

        let fish = match load_gltf_meshes("fish.glb").await {
            Ok(data) => Some(Placed::new(&ctx, "fish", &data, Transform::at(-1.5, 2.0, 0.0))),
            Err(e) => {
                log::warn!("Leaving out the fish: {:#}", e);
                None
            }
        };
        let fish_material = ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("fish", shaders::TEXTURED)
                .with_texture(&fish_texture)
                .double_sided(),
            &Textured::default(),
        );

        Ok(Self {
            box_,
            pyramid,
            wood,
            fish,
            fish_material,
        })
    }
}

impl GraphicsFlow<()> for Textures {
    fn on_init(&mut self, ctx: &mut Context, _: &mut ()) -> Out<()> {
        ctx.set_camera(Camera::arc_rotate(-FRAC_PI_2, 1.0, 10.0, Point3::origin()));
        ctx.set_light(Light::directional(Vector3::new(-0.5, -1.0, 0.7)));
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, _: &mut (), _: Duration) -> Out<()> {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        let mut draws = vec![
            Draw::new(&self.box_.mesh, &self.box_.object, &self.wood),
            Draw::new(&self.pyramid.mesh, &self.pyramid.object, &self.wood),
        ];
        // every primitive of the fish uses the same texture
        if let Some(fish) = &self.fish {
            draws.push(Draw::new(&fish.mesh, &fish.object, &self.fish_material));
        }
        Render::Opaques(draws)
    }
}
