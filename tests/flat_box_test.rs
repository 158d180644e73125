#[cfg(feature = "integration-tests")]
mod common;

/// A white flat-colour box in front of the default camera covers the centre
/// of the frame and nothing at the corners.
#[test]
#[cfg(feature = "integration-tests")]
fn should_render_flat_colour_box() {
    use crate::common::test_utils::{FrameCounter, TestScene, to_pixel};
    use shader_labs::{
        context::{Context, InitContext},
        data_structures::{mesh::create_box, model::Mesh, object::Object},
        flow::ImageTestResult,
        pipelines::material::{Material, MaterialDescriptor, ShaderMaterial},
        shaders::{self, FlatColor},
        transform::Transform,
    };
    use wgpu::Color;

    golden_image_test!(|ctx: InitContext| -> anyhow::Result<TestScene> {
        let mesh = Mesh::from_data(&ctx.device, "box", &create_box(2.0, 2.0, 2.0));
        let object = Object::new(&ctx.device, &ctx.object_bind_group_layout, "box", Transform::new());
        let material: Box<dyn Material> = Box::new(ShaderMaterial::new(
            &ctx,
            MaterialDescriptor::new("white", shaders::FLAT_COLOR),
            &FlatColor { color: [1.0; 4] },
        ));
        Ok(TestScene {
            drawable: Some((mesh, object, material)),
            setup: Box::new(|ctx: &mut Context| ctx.clear_colour = Color::BLACK),
            validate: Box::new(
                |_: &Context,
                 state: &mut FrameCounter,
                 texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>| {
                if state.frame() == 0 {
                    return Ok(ImageTestResult::Waiting);
                }
                let (width, height) = texture.dimensions();
                assert_eq!(*texture.get_pixel(width / 2, height / 2), to_pixel(Color::WHITE));
                assert_eq!(*texture.get_pixel(0, 0), to_pixel(Color::BLACK));
                assert_eq!(*texture.get_pixel(0, height - 1), to_pixel(Color::BLACK));
                Ok(ImageTestResult::Passed)
            }),
        })
    });
}
