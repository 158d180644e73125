//! Host-side versions of the lighting kernels in `shaders/`.
//!
//! The tests use them to pin down what the shader programs compute per
//! fragment.

use cgmath::{InnerSpace, Matrix4, Vector3, Vector4};

/// Mirror `d` about the plane with unit normal `n`.
pub fn reflect(d: Vector3<f32>, n: Vector3<f32>) -> Vector3<f32> {
    d - n * (2.0 * d.dot(n))
}

/// Surface and light inputs shared by the diffuse and specular kernels.
#[derive(Clone, Copy, Debug)]
pub struct Surface {
    pub normal: Vector3<f32>,
    pub color: Vector3<f32>,
    pub light_direction: Vector3<f32>,
    pub light_intensity: f32,
    pub ambient: f32,
}

/// `color * intensity * max(dot(N, -L), 0) + color * ambient`
pub fn lambert(surface: &Surface) -> Vector3<f32> {
    let n = surface.normal.normalize();
    let l = surface.light_direction.normalize();
    let diffuse = n.dot(-l).max(0.0);
    surface.color * surface.light_intensity * diffuse + surface.color * surface.ambient
}

#[derive(Clone, Copy, Debug)]
pub struct Specular {
    pub color: Vector3<f32>,
    pub shininess: f32,
    pub view_position: Vector3<f32>,
    pub world_position: Vector3<f32>,
}

/// Lambert plus `specular_color * cos_alpha^shininess`, where `cos_alpha` is
/// taken against the half vector between the view and light directions.
///
/// Faces turned away from the light get no highlight.
pub fn blinn_phong(surface: &Surface, specular: &Specular) -> Vector3<f32> {
    let n = surface.normal.normalize();
    let l = surface.light_direction.normalize();
    let v = (specular.view_position - specular.world_position).normalize();
    let h = (-l + v).normalize();
    let cos_alpha = n.dot(h).max(0.0);
    let highlight = if n.dot(-l) > 0.0 {
        cos_alpha.powf(specular.shininess)
    } else {
        0.0
    };
    lambert(surface) + specular.color * highlight
}

/// View matrix with its translation removed, so a skybox stays centred on
/// the eye.
pub fn strip_translation(view: Matrix4<f32>) -> Matrix4<f32> {
    let mut sky_view = view;
    sky_view.w = Vector4::new(0.0, 0.0, 0.0, 1.0);
    sky_view
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::Zero;

    use super::*;

    fn red_surface(normal: Vector3<f32>, light: Vector3<f32>) -> Surface {
        Surface {
            normal,
            color: Vector3::new(1.0, 0.0, 0.0),
            light_direction: light,
            light_intensity: 1.0,
            ambient: 0.1,
        }
    }

    #[test]
    fn reflect_matches_formula() {
        let n = Vector3::new(0.0, 1.0, 0.0);
        let d = Vector3::new(1.0, -1.0, 0.0);
        assert_relative_eq!(reflect(d, n), Vector3::new(1.0, 1.0, 0.0));

        let n = Vector3::new(1.0, 2.0, -0.5).normalize();
        let d = Vector3::new(-0.3, 0.8, 2.0);
        assert_relative_eq!(reflect(d, n), d - 2.0 * d.dot(n) * n, epsilon = 1e-6);
    }

    #[test]
    fn reflect_keeps_length_and_flips_normal_component() {
        let n = Vector3::new(0.0, 0.0, -1.0);
        let d = Vector3::new(0.2, 0.4, 0.9);
        let r = reflect(d, n);
        assert_relative_eq!(r.magnitude(), d.magnitude(), epsilon = 1e-6);
        assert_relative_eq!(r.dot(n), -d.dot(n), epsilon = 1e-6);
    }

    #[test]
    fn lambert_is_brightest_facing_the_light() {
        // light travels straight down onto an upward facing surface
        let lit = lambert(&red_surface(Vector3::unit_y(), -Vector3::unit_y()));
        assert_relative_eq!(lit, Vector3::new(1.1, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn lambert_back_faces_only_get_ambient() {
        let unlit = lambert(&red_surface(-Vector3::unit_y(), -Vector3::unit_y()));
        assert_relative_eq!(unlit, Vector3::new(0.1, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn lambert_follows_cosine_law() {
        let light = Vector3::new(-1.0, -1.0, 0.0);
        let shaded = lambert(&Surface {
            ambient: 0.0,
            ..red_surface(Vector3::unit_y(), light)
        });
        assert_relative_eq!(shaded.x, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-6);
    }

    #[test]
    fn blinn_phong_peaks_at_mirror_direction() {
        let surface = Surface {
            ambient: 0.0,
            ..red_surface(Vector3::unit_y(), Vector3::new(1.0, -1.0, 0.0))
        };
        let specular = Specular {
            color: Vector3::new(1.0, 1.0, 1.0),
            shininess: 32.0,
            view_position: Vector3::new(1.0, 1.0, 0.0),
            world_position: Vector3::zero(),
        };
        let mirrored = blinn_phong(&surface, &specular);
        let diffuse = lambert(&surface);
        assert_relative_eq!(mirrored - diffuse, Vector3::new(1.0, 1.0, 1.0), epsilon = 1e-5);

        let off_axis = blinn_phong(
            &surface,
            &Specular {
                view_position: Vector3::new(-1.0, 0.2, 0.0),
                ..specular
            },
        );
        assert!((off_axis - diffuse).y < 0.01);
    }

    #[test]
    fn blinn_phong_has_no_highlight_on_back_faces() {
        let surface = red_surface(-Vector3::unit_y(), -Vector3::unit_y());
        let specular = Specular {
            color: Vector3::new(1.0, 1.0, 1.0),
            shininess: 8.0,
            view_position: Vector3::new(0.0, -3.0, 0.0),
            world_position: Vector3::zero(),
        };
        assert_relative_eq!(blinn_phong(&surface, &specular), lambert(&surface));
    }

    #[test]
    fn stripped_view_keeps_rotation() {
        let view = Matrix4::look_at_lh(
            cgmath::Point3::new(3.0, 2.0, -5.0),
            cgmath::Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        );
        let sky = strip_translation(view);
        assert_relative_eq!(sky.x, view.x);
        assert_relative_eq!(sky.y, view.y);
        assert_relative_eq!(sky.z, view.z);
        assert_relative_eq!(sky * Vector4::new(0.0, 0.0, 0.0, 1.0), Vector4::new(0.0, 0.0, 0.0, 1.0));
    }
}
