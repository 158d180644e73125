//! WGSL programs of the labs and the uniform blocks they read.
//!
//! Every program is prefixed with `common.wgsl`, which declares the built-in
//! camera, light and object uniforms and the vertex attributes. The structs
//! below mirror each program's material block (bind group 2, binding 0)
//! byte for byte.

macro_rules! program {
    ($file:literal) => {
        concat!(include_str!("common.wgsl"), include_str!($file))
    };
}

pub const FLAT_COLOR: &str = program!("flat_color.wgsl");
pub const WAVE: &str = program!("wave.wgsl");
pub const CRAZY: &str = program!("crazy.wgsl");
pub const CUSTOM_WORLD: &str = program!("custom_world.wgsl");
pub const LAMBERT: &str = program!("lambert.wgsl");
pub const BLINN_PHONG: &str = program!("blinn_phong.wgsl");
pub const TEXTURED: &str = program!("textured.wgsl");
pub const REFLECTION: &str = program!("reflection.wgsl");
pub const SKYBOX: &str = program!("skybox.wgsl");
pub const STANDARD: &str = program!("standard.wgsl");

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FlatColor {
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Wave {
    pub time: f32,
    pub amplitude: f32,
    pub frequency: f32,
    pub _padding: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Crazy {
    pub time: f32,
    pub amplitude: f32,
    pub _padding: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CustomWorld {
    pub my_world: [[f32; 4]; 4],
    pub color: [f32; 3],
    pub time: f32,
}

/// Lambert inputs. `inverse_transpose` is a `mat3x3<f32>`, whose columns
/// are padded to 16 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Lambert {
    pub inverse_transpose: [[f32; 4]; 3],
    pub surface_color: [f32; 3],
    pub light_intensity: f32,
    pub light_direction: [f32; 3],
    pub ambient: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlinnPhong {
    pub inverse_transpose: [[f32; 4]; 3],
    pub surface_color: [f32; 3],
    pub light_intensity: f32,
    pub light_direction: [f32; 3],
    pub ambient: f32,
    pub specular_color: [f32; 3],
    pub shininess: f32,
    pub view_position: [f32; 3],
    pub _padding: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Textured {
    pub tint: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Reflection {
    pub view_position: [f32; 3],
    pub _padding: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Skybox {
    pub tint: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Standard {
    pub diffuse_color: [f32; 4],
    pub specular_color: [f32; 3],
    pub specular_power: f32,
    pub ambient: [f32; 3],
    pub use_texture: u32,
}

impl Default for Textured {
    fn default() -> Self {
        Self { tint: [1.0; 4] }
    }
}

impl Default for Skybox {
    fn default() -> Self {
        Self { tint: [1.0; 4] }
    }
}

#[cfg(test)]
mod tests {
    use std::mem::size_of;

    use naga::{
        Module, TypeInner,
        valid::{Capabilities, ValidationFlags, Validator},
    };

    use super::*;
    use crate::{
        camera::CameraUniform, data_structures::object::ObjectUniform,
        pipelines::light::LightUniform,
    };

    const PROGRAMS: [(&str, &str); 10] = [
        ("flat_color", FLAT_COLOR),
        ("wave", WAVE),
        ("crazy", CRAZY),
        ("custom_world", CUSTOM_WORLD),
        ("lambert", LAMBERT),
        ("blinn_phong", BLINN_PHONG),
        ("textured", TEXTURED),
        ("reflection", REFLECTION),
        ("skybox", SKYBOX),
        ("standard", STANDARD),
    ];

    fn parse(name: &str, source: &str) -> Module {
        naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{name}: {}", e.emit_to_string(source)))
    }

    fn struct_span(module: &Module, name: &str) -> u32 {
        module
            .types
            .iter()
            .find_map(|(_, ty)| match (&ty.name, &ty.inner) {
                (Some(n), TypeInner::Struct { span, .. }) if n == name => Some(*span),
                _ => None,
            })
            .unwrap_or_else(|| panic!("struct {name} not declared"))
    }

    #[test]
    fn programs_parse_and_validate() {
        for (name, source) in PROGRAMS {
            let module = parse(name, source);
            Validator::new(ValidationFlags::all(), Capabilities::all())
                .validate(&module)
                .unwrap_or_else(|e| panic!("{name}: {e:?}"));
            for entry in ["vs_main", "fs_main"] {
                assert!(
                    module.entry_points.iter().any(|ep| ep.name == entry),
                    "{name} has no {entry}"
                );
            }
        }
    }

    #[test]
    fn builtin_blocks_match_host_layout() {
        let module = parse("common", FLAT_COLOR);
        assert_eq!(struct_span(&module, "Camera") as usize, size_of::<CameraUniform>());
        assert_eq!(struct_span(&module, "Light") as usize, size_of::<LightUniform>());
        assert_eq!(struct_span(&module, "Object") as usize, size_of::<ObjectUniform>());
    }

    #[test]
    fn material_blocks_match_host_layout() {
        let cases = [
            (FLAT_COLOR, "FlatColor", size_of::<FlatColor>()),
            (WAVE, "Wave", size_of::<Wave>()),
            (CRAZY, "Crazy", size_of::<Crazy>()),
            (CUSTOM_WORLD, "CustomWorld", size_of::<CustomWorld>()),
            (LAMBERT, "Lambert", size_of::<Lambert>()),
            (BLINN_PHONG, "BlinnPhong", size_of::<BlinnPhong>()),
            (TEXTURED, "Textured", size_of::<Textured>()),
            (REFLECTION, "Reflection", size_of::<Reflection>()),
            (SKYBOX, "Skybox", size_of::<Skybox>()),
            (STANDARD, "Standard", size_of::<Standard>()),
        ];
        for (source, name, host_size) in cases {
            let module = parse(name, source);
            assert_eq!(struct_span(&module, name) as usize, host_size, "{name}");
        }
    }

    #[test]
    fn sampled_programs_declare_texture_and_sampler() {
        for source in [TEXTURED, REFLECTION, SKYBOX, STANDARD] {
            let module = parse("sampled", source);
            let bindings: Vec<(u32, u32)> = module
                .global_variables
                .iter()
                .filter_map(|(_, var)| var.binding.as_ref().map(|b| (b.group, b.binding)))
                .collect();
            assert!(bindings.contains(&(2, 1)));
            assert!(bindings.contains(&(2, 2)));
        }
    }
}
