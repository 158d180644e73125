//! The scene light shared by every program through bind group 0.

use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

/// The one light of a lab scene.
///
/// `direction` is the direction the light travels for a directional light
/// and the "sky" direction for a hemispheric one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Hemispheric {
        direction: Vector3<f32>,
        intensity: f32,
        diffuse: Vector3<f32>,
        ground: Vector3<f32>,
    },
    Directional {
        direction: Vector3<f32>,
        intensity: f32,
        diffuse: Vector3<f32>,
    },
}

impl Light {
    /// White sky light with a black ground colour, intensity 1.
    pub fn hemispheric(direction: Vector3<f32>) -> Self {
        Light::Hemispheric {
            direction,
            intensity: 1.0,
            diffuse: Vector3::new(1.0, 1.0, 1.0),
            ground: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    /// White directional light, intensity 1.
    pub fn directional(direction: Vector3<f32>) -> Self {
        Light::Directional {
            direction,
            intensity: 1.0,
            diffuse: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn with_intensity(mut self, value: f32) -> Self {
        match &mut self {
            Light::Hemispheric { intensity, .. } | Light::Directional { intensity, .. } => {
                *intensity = value
            }
        }
        self
    }

    pub fn direction(&self) -> Vector3<f32> {
        match self {
            Light::Hemispheric { direction, .. } | Light::Directional { direction, .. } => {
                *direction
            }
        }
    }

    pub fn set_direction(&mut self, value: Vector3<f32>) {
        match self {
            Light::Hemispheric { direction, .. } | Light::Directional { direction, .. } => {
                *direction = value
            }
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Light::Hemispheric { intensity, .. } | Light::Directional { intensity, .. } => {
                *intensity
            }
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Light::hemispheric(Vector3::unit_y())
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    direction: [f32; 3],
    intensity: f32,
    diffuse: [f32; 3],
    kind: u32,
    ground: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
}

impl LightUniform {
    pub const HEMISPHERIC: u32 = 0;
    pub const DIRECTIONAL: u32 = 1;
}

impl From<&Light> for LightUniform {
    fn from(light: &Light) -> Self {
        let normalized = |v: Vector3<f32>| -> [f32; 3] {
            if v.magnitude2() > 0.0 {
                v.normalize().into()
            } else {
                v.into()
            }
        };
        match *light {
            Light::Hemispheric {
                direction,
                intensity,
                diffuse,
                ground,
            } => LightUniform {
                direction: normalized(direction),
                intensity,
                diffuse: diffuse.into(),
                kind: Self::HEMISPHERIC,
                ground: ground.into(),
                _padding: 0,
            },
            Light::Directional {
                direction,
                intensity,
                diffuse,
            } => LightUniform {
                direction: normalized(direction),
                intensity,
                diffuse: diffuse.into(),
                kind: Self::DIRECTIONAL,
                ground: [0.0; 3],
                _padding: 0,
            },
        }
    }
}

#[derive(Debug)]
pub struct LightResources {
    pub light: Light,
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
}

impl LightResources {
    pub fn new(light: Light, device: &wgpu::Device) -> Self {
        let uniform = LightUniform::from(&light);
        let buffer = mk_buffer(device, uniform);
        Self {
            light,
            uniform,
            buffer,
        }
    }

    pub fn set(&mut self, light: Light) {
        self.light = light;
    }

    /// Upload the light if it changed since the last frame.
    pub fn write_to_buffer(&mut self, queue: &wgpu::Queue) {
        let uniform = LightUniform::from(&self.light);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}
