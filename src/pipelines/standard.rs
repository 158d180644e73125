//! Built-in lit material for reference geometry (grounds, control spheres,
//! the village meshes).

use cgmath::Vector3;

use crate::{
    context::InitContext,
    data_structures::texture::Texture,
    pipelines::material::{Material, MaterialDescriptor, ShaderMaterial},
    shaders::{self, Standard},
};

/// Colour and texture settings of a [`StandardMaterial`].
#[derive(Clone, Copy, Debug)]
pub struct StandardOptions<'a> {
    pub diffuse_color: Vector3<f32>,
    pub diffuse_texture: Option<&'a Texture>,
    pub specular_color: Vector3<f32>,
    pub specular_power: f32,
    pub ambient: Vector3<f32>,
    pub alpha: f32,
    pub back_face_culling: bool,
}

impl Default for StandardOptions<'_> {
    fn default() -> Self {
        Self {
            diffuse_color: Vector3::new(1.0, 1.0, 1.0),
            diffuse_texture: None,
            specular_color: Vector3::new(1.0, 1.0, 1.0),
            specular_power: 64.0,
            ambient: Vector3::new(0.0, 0.0, 0.0),
            alpha: 1.0,
            back_face_culling: true,
        }
    }
}

impl<'a> StandardOptions<'a> {
    pub fn colored(diffuse_color: Vector3<f32>) -> Self {
        Self {
            diffuse_color,
            ..Default::default()
        }
    }

    pub fn textured(texture: &'a Texture) -> Self {
        Self {
            diffuse_texture: Some(texture),
            ..Default::default()
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.back_face_culling = false;
        self
    }

    pub(crate) fn uniform(&self) -> Standard {
        Standard {
            diffuse_color: self.diffuse_color.extend(self.alpha).into(),
            specular_color: self.specular_color.into(),
            specular_power: self.specular_power,
            ambient: self.ambient.into(),
            use_texture: self.diffuse_texture.is_some() as u32,
        }
    }
}

/// A material lit by the scene light, with a diffuse colour, an optional
/// diffuse texture and a specular highlight.
///
/// A texture is always bound. Without a diffuse texture a 1x1 white one
/// stands in and the shader ignores it.
#[derive(Debug)]
pub struct StandardMaterial {
    inner: ShaderMaterial<Standard>,
    _white: Texture,
}

impl StandardMaterial {
    pub fn new(ctx: &InitContext, label: &str, options: StandardOptions<'_>) -> Self {
        let white = Texture::from_color(&ctx.device, &ctx.queue, [255, 255, 255, 255], "white");
        let texture = options.diffuse_texture.unwrap_or(&white);
        let mut desc = MaterialDescriptor::new(label, shaders::STANDARD).with_texture(texture);
        desc.back_face_culling = options.back_face_culling;

        let inner = ShaderMaterial::new(ctx, desc, &options.uniform());
        Self {
            inner,
            _white: white,
        }
    }
}

impl Material for StandardMaterial {
    fn pipeline(&self) -> &wgpu::RenderPipeline {
        self.inner.pipeline()
    }

    fn bind_group(&self) -> &wgpu::BindGroup {
        self.inner.bind_group()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untextured_options_disable_sampling() {
        let uniform = StandardOptions::colored(Vector3::new(1.0, 0.0, 0.0)).uniform();
        assert_eq!(uniform.diffuse_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniform.use_texture, 0);
        assert_eq!(uniform.specular_power, 64.0);
    }

    #[test]
    fn double_sided_turns_off_culling() {
        let options = StandardOptions::default().double_sided();
        assert!(!options.back_face_culling);
    }
}
