//! lab07: Lambert and Blinn-Phong spheres next to a red reference sphere.
//!
//! Press space to start or stop the light turning around the scene.

use cgmath::{EuclideanSpace, Matrix3, Point3, Rad, Vector3};
use instant::Duration;
use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    camera::Camera,
    context::{Context, InitContext},
    data_structures::mesh::{create_ground, create_sphere},
    flow::{GraphicsFlow, Out},
    labs::Placed,
    pipelines::{
        light::Light,
        material::{MaterialDescriptor, ShaderMaterial},
        standard::{StandardMaterial, StandardOptions},
    },
    render::{Draw, Render},
    shaders::{self, BlinnPhong, Lambert},
    transform::{Transform, to_padded_mat3},
};

const SURFACE_COLOR: [f32; 3] = [1.0, 0.0, 0.0];
const AMBIENT: f32 = 0.1;
const SHININESS: f32 = 32.0;
/// Radians per second while the light turns.
const LIGHT_SPEED: f32 = 0.5;

pub struct Lighting {
    ground: Placed,
    ground_material: StandardMaterial,
    lambert_sphere: Placed,
    lambert: ShaderMaterial<Lambert>,
    control_sphere: Placed,
    control: StandardMaterial,
    phong_sphere: Placed,
    blinn_phong: ShaderMaterial<BlinnPhong>,
    rotating: bool,
}

fn lambert_block(normal: Matrix3<f32>, light: &Light) -> Lambert {
    Lambert {
        inverse_transpose: to_padded_mat3(normal),
        surface_color: SURFACE_COLOR,
        light_intensity: light.intensity(),
        light_direction: light.direction().into(),
        ambient: AMBIENT,
    }
}

fn blinn_phong_block(normal: Matrix3<f32>, light: &Light, eye: Point3<f32>) -> BlinnPhong {
    BlinnPhong {
        inverse_transpose: to_padded_mat3(normal),
        surface_color: SURFACE_COLOR,
        light_intensity: light.intensity(),
        light_direction: light.direction().into(),
        ambient: AMBIENT,
        specular_color: [1.0, 1.0, 1.0],
        shininess: SHININESS,
        view_position: eye.into(),
        _padding: 0.0,
    }
}

/// `light` turned about the Y axis by `angle`.
fn turned(mut light: Light, angle: Rad<f32>) -> Light {
    let rotation = Matrix3::from_angle_y(angle);
    light.set_direction(rotation * light.direction());
    light
}

fn scene_light() -> Light {
    Light::directional(Vector3::new(-0.5, -1.0, 0.7))
}

impl Lighting {
    pub async fn new(ctx: InitContext) -> anyhow::Result<Self> {
        let ground = Placed::new(&ctx, "ground", &create_ground(6.0, 6.0, 1), Transform::new());
        let ground_material = StandardMaterial::new(&ctx, "ground", StandardOptions::default());

        let sphere = create_sphere(2.0, 32);
        let light = scene_light();

        let lambert_sphere = Placed::new(&ctx, "lambert sphere", &sphere, Transform::at(1.5, 1.0, 0.0));
        let lambert = ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("lambert", shaders::LAMBERT),
            &lambert_block(lambert_sphere.object.normal_matrix(), &light),
        );

        let control_sphere = Placed::new(&ctx, "control sphere", &sphere, Transform::at(-1.5, 1.0, 0.0));
        let control = StandardMaterial::new(
            &ctx,
            "control",
            StandardOptions::colored(Vector3::new(1.0, 0.0, 0.0)),
        );

        let phong_sphere = Placed::new(&ctx, "phong sphere", &sphere, Transform::at(0.0, 1.0, 1.5));
        let blinn_phong = ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("blinn phong", shaders::BLINN_PHONG),
            &blinn_phong_block(phong_sphere.object.normal_matrix(), &light, Point3::origin()),
        );

        Ok(Self {
            ground,
            ground_material,
            lambert_sphere,
            lambert,
            control_sphere,
            control,
            phong_sphere,
            blinn_phong,
            rotating: false,
        })
    }
}

impl GraphicsFlow<()> for Lighting {
    fn on_init(&mut self, ctx: &mut Context, _: &mut ()) -> Out<()> {
        ctx.set_camera(Camera::arc_rotate(-std::f32::consts::FRAC_PI_2, 1.0, 10.0, Point3::origin()));
        ctx.set_light(scene_light());
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: &mut (), dt: Duration) -> Out<()> {
        let light = ctx.light();
        let eye = ctx.camera.camera.position();
        self.lambert.set_uniforms(
            &ctx.queue,
            &lambert_block(self.lambert_sphere.object.normal_matrix(), light),
        );
        self.blinn_phong.set_uniforms(
            &ctx.queue,
            &blinn_phong_block(self.phong_sphere.object.normal_matrix(), light, eye),
        );

        if self.rotating {
            let angle = Rad(LIGHT_SPEED * dt.as_secs_f32());
            let next = turned(*light, angle);
            Out::Configure(Box::new(move |ctx: &mut Context| ctx.set_light(next)))
        } else {
            Out::Empty
        }
    }

    fn on_window_events(&mut self, _: &Context, _: &mut (), event: &WindowEvent) -> Out<()> {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(KeyCode::Space),
                    state: ElementState::Pressed,
                    repeat: false,
                    ..
                },
            ..
        } = event
        {
            self.rotating = !self.rotating;
            log::info!("Light rotation {}", if self.rotating { "on" } else { "off" });
        }
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::Opaques(vec![
            Draw::new(&self.ground.mesh, &self.ground.object, &self.ground_material),
            Draw::new(&self.lambert_sphere.mesh, &self.lambert_sphere.object, &self.lambert),
            Draw::new(&self.control_sphere.mesh, &self.control_sphere.object, &self.control),
            Draw::new(&self.phong_sphere.mesh, &self.phong_sphere.object, &self.blinn_phong),
        ])
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{InnerSpace, SquareMatrix};

    use super::*;

    #[test]
    fn turning_keeps_height_and_length() {
        let light = scene_light();
        let next = turned(light, Rad(1.0));
        assert_relative_eq!(next.direction().y, light.direction().y, epsilon = 1e-6);
        assert_relative_eq!(
            next.direction().magnitude(),
            light.direction().magnitude(),
            epsilon = 1e-6
        );
        assert_relative_eq!(next.intensity(), light.intensity());
    }

    #[test]
    fn blocks_carry_light_and_eye() {
        let light = scene_light().with_intensity(0.5);
        let block = blinn_phong_block(Matrix3::identity(), &light, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(block.light_direction, [-0.5, -1.0, 0.7]);
        assert_eq!(block.light_intensity, 0.5);
        assert_eq!(block.view_position, [1.0, 2.0, 3.0]);
        assert_eq!(block.inverse_transpose[1], [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(lambert_block(Matrix3::identity(), &light).surface_color, SURFACE_COLOR);
    }
}
