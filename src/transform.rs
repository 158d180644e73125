//! Hand-built homogeneous transforms.
//!
//! The matrices are laid out exactly like the 16-float arrays of the
//! transformations lab. Those arrays are written row-major for row vectors
//! (`v * M`), which is the same memory as cgmath's column-major matrices used
//! with column vectors (`M * v`). A lab product `a * b` therefore becomes
//! `b * a` here.
//!
//! The rotation builders keep the lab's sign convention: `make_rotate_x(a)`
//! equals `Matrix4::from_angle_x(Rad(-a))`, and likewise for Y and Z.

use cgmath::{Matrix, Matrix3, Matrix4, Rad, SquareMatrix, Vector3};

pub fn make_translation(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0, 0.0, 0.0, 0.0, // <- i
        0.0, 1.0, 0.0, 0.0, // <- j
        0.0, 0.0, 1.0, 0.0, // <- k
        x,   y,   z,   1.0, // <- t
    );
    m
}

pub fn make_scale(x: f32, y: f32, z: f32) -> Matrix4<f32> {
    #[rustfmt::skip]
    let m = Matrix4::new(
        x,   0.0, 0.0, 0.0,
        0.0, y,   0.0, 0.0,
        0.0, 0.0, z,   0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

pub fn make_rotate_x(a: f32) -> Matrix4<f32> {
    let (s, c) = a.sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, c,   -s,  0.0,
        0.0, s,   c,   0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

pub fn make_rotate_y(a: f32) -> Matrix4<f32> {
    let (s, c) = a.sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
        c,   0.0, s,   0.0,
        0.0, 1.0, 0.0, 0.0,
        -s,  0.0, c,   0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

pub fn make_rotate_z(a: f32) -> Matrix4<f32> {
    let (s, c) = a.sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
        c,   -s,  0.0, 0.0,
        s,   c,   0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Composes a world matrix from its factors.
///
/// In the lab's row-vector notation this is
/// `scaling * rotation_z * rotation_x * rotation_y * translate`: a vertex is
/// scaled first, rotated about Z, then X, then Y, and translated last.
pub fn compose_world_matrix(
    scaling: Matrix4<f32>,
    rotation_x: Matrix4<f32>,
    rotation_y: Matrix4<f32>,
    rotation_z: Matrix4<f32>,
    translate: Matrix4<f32>,
) -> Matrix4<f32> {
    let world = translate * rotation_y;
    let world = world * rotation_x;
    let world = world * rotation_z;
    world * scaling
}

/// World matrix of a child placed relative to `parent`.
pub fn apply_parent_matrix(parent: Matrix4<f32>, child: Matrix4<f32>) -> Matrix4<f32> {
    parent * child
}

/// Inverse transpose of the upper 3x3 block, used to carry normals into
/// world space under non-uniform scaling.
///
/// Singular matrices (a zero scale axis) fall back to the plain 3x3 block.
pub fn normal_matrix(world: Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::from_cols(
        world.x.truncate(),
        world.y.truncate(),
        world.z.truncate(),
    );
    match upper.invert() {
        Some(inverse) => inverse.transpose(),
        None => upper,
    }
}

/// Pads a 3x3 matrix into the `mat3x3<f32>` uniform layout (16-byte columns).
pub fn to_padded_mat3(m: Matrix3<f32>) -> [[f32; 4]; 3] {
    [
        [m.x.x, m.x.y, m.x.z, 0.0],
        [m.y.x, m.y.y, m.y.z, 0.0],
        [m.z.x, m.z.y, m.z.z, 0.0],
    ]
}

/// The five factors of [`compose_world_matrix`] as plain numbers.
///
/// Rotation angles are radians and use the lab's sign convention.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EulerTransform {
    pub translation: Vector3<f32>,
    pub scale: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

impl EulerTransform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        compose_world_matrix(
            make_scale(self.scale.x, self.scale.y, self.scale.z),
            make_rotate_x(self.rotation.x),
            make_rotate_y(self.rotation.y),
            make_rotate_z(self.rotation.z),
            make_translation(self.translation.x, self.translation.y, self.translation.z),
        )
    }
}

impl Default for EulerTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// The animated parent box of the transformations lab.
///
/// Every factor is a function of the time `t` in seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoxAnimation;

impl BoxAnimation {
    pub fn at(&self, t: f32) -> EulerTransform {
        EulerTransform {
            translation: Vector3::new(5.0 * t.sin(), 3.0, 0.0),
            scale: Vector3::new(0.5 + t.sin(), 0.5 - t.cos(), 0.5),
            rotation: Vector3::new(30.0 + 0.1 * t, 30.0 - 0.1 * t, 3.0 * t),
        }
    }
}

/// Placement of a mesh in the scene: position, Euler rotation and scaling.
///
/// Unlike the lab builders above, `rotation` follows the usual positive
/// sense of `Matrix4::from_angle_*`, matching how meshes are positioned in
/// the scenes. The composition order is the same as [`compose_world_matrix`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scaling: Vector3<f32>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scaling: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::new()
        }
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        compose_world_matrix(
            make_scale(self.scaling.x, self.scaling.y, self.scaling.z),
            Matrix4::from_angle_x(Rad(self.rotation.x)),
            Matrix4::from_angle_y(Rad(self.rotation.y)),
            Matrix4::from_angle_z(Rad(self.rotation.z)),
            make_translation(self.position.x, self.position.y, self.position.z),
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use approx::assert_relative_eq;
    use cgmath::{InnerSpace, Vector4};

    use super::*;

    fn point(x: f32, y: f32, z: f32) -> Vector4<f32> {
        Vector4::new(x, y, z, 1.0)
    }

    #[test]
    fn translation_moves_points_by_offset() {
        for (t, v) in [
            ([1.0, 2.0, 3.0], [0.0, 0.0, 0.0]),
            ([-4.5, 0.25, 7.0], [1.0, -1.0, 2.0]),
            ([0.0, 0.0, 0.0], [3.0, 3.0, 3.0]),
        ] {
            let moved = make_translation(t[0], t[1], t[2]) * point(v[0], v[1], v[2]);
            assert_relative_eq!(moved, point(v[0] + t[0], v[1] + t[1], v[2] + t[2]));
        }
    }

    #[test]
    fn translation_leaves_directions_alone() {
        let dir = make_translation(5.0, 6.0, 7.0) * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(dir, Vector4::new(1.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn rotations_are_orthonormal() {
        for a in [0.0_f32, 0.3, 1.0, FRAC_PI_2, 2.5, -1.7, 30.0] {
            for m in [make_rotate_x(a), make_rotate_y(a), make_rotate_z(a)] {
                assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-5);
                let inverse = m.invert().expect("rotation is invertible");
                assert_relative_eq!(inverse, m.transpose(), epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn rotations_use_lab_sign_convention() {
        let a = 0.7;
        assert_relative_eq!(make_rotate_x(a), Matrix4::from_angle_x(Rad(-a)), epsilon = 1e-6);
        assert_relative_eq!(make_rotate_y(a), Matrix4::from_angle_y(Rad(-a)), epsilon = 1e-6);
        assert_relative_eq!(make_rotate_z(a), Matrix4::from_angle_z(Rad(-a)), epsilon = 1e-6);
    }

    #[test]
    fn compose_scales_then_rotates_then_translates() {
        let world = compose_world_matrix(
            make_scale(2.0, 1.0, 1.0),
            make_rotate_x(0.0),
            make_rotate_y(0.0),
            make_rotate_z(FRAC_PI_2),
            make_translation(1.0, 2.0, 3.0),
        );
        // (1,0,0) -> scale (2,0,0) -> rotate z (0,-2,0) -> translate (1,0,3)
        assert_relative_eq!(world * point(1.0, 0.0, 0.0), point(1.0, 0.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn compose_applies_x_before_y() {
        let world = compose_world_matrix(
            make_scale(1.0, 1.0, 1.0),
            make_rotate_x(FRAC_PI_2),
            make_rotate_y(FRAC_PI_2),
            make_rotate_z(0.0),
            make_translation(0.0, 0.0, 0.0),
        );
        // x: (0,1,0) -> (0,0,-1), then y: (0,0,-1) -> (1,0,0)
        assert_relative_eq!(world * point(0.0, 1.0, 0.0), point(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn rotation_order_is_not_commutative() {
        let rx = make_rotate_x(FRAC_PI_2);
        let ry = make_rotate_y(FRAC_PI_2);
        let v = point(0.0, 1.0, 0.0);
        let x_then_y = ry * rx * v;
        let y_then_x = rx * ry * v;
        assert_relative_eq!(x_then_y, point(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(y_then_x, point(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn composition_is_associative() {
        let a = make_rotate_x(0.4);
        let b = make_scale(1.0, 2.0, 3.0);
        let c = make_translation(-1.0, 0.5, 2.0);
        assert_relative_eq!((a * b) * c, a * (b * c), epsilon = 1e-5);
    }

    #[test]
    fn child_follows_parent() {
        let parent = make_translation(0.0, 3.0, 0.0) * make_scale(2.0, 2.0, 2.0);
        let child = make_translation(1.0, 0.0, 0.0);
        let world = apply_parent_matrix(parent, child);
        // child origin sits one parent-unit along x, which the parent scales to 2
        assert_relative_eq!(world * point(0.0, 0.0, 0.0), point(2.0, 3.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn identity_child_inherits_parent() {
        let parent = BoxAnimation.at(1.0).to_matrix();
        let child = EulerTransform::identity().to_matrix();
        assert_relative_eq!(apply_parent_matrix(parent, child), parent, epsilon = 1e-6);
    }

    #[test]
    fn box_animation_at_one_second() {
        let t = 1.0_f32;
        let frame = BoxAnimation.at(t);
        assert_relative_eq!(frame.translation, Vector3::new(5.0 * t.sin(), 3.0, 0.0));
        assert_relative_eq!(frame.scale, Vector3::new(0.5 + t.sin(), 0.5 - t.cos(), 0.5));
        assert_relative_eq!(frame.rotation, Vector3::new(30.1, 29.9, 3.0), epsilon = 1e-5);
        let origin = frame.to_matrix() * point(0.0, 0.0, 0.0);
        assert_relative_eq!(origin, point(5.0 * t.sin(), 3.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular() {
        let world = make_scale(4.0, 1.0, 1.0) * Matrix4::from_angle_z(Rad(0.3));
        // a surface spanned by these tangents, with normal (1,1,0)/sqrt2 before scaling
        let tangent = cgmath::Vector3::new(1.0, -1.0, 0.0);
        let normal = cgmath::Vector3::new(1.0, 1.0, 0.0).normalize();
        let world_tangent = (world * tangent.extend(0.0)).truncate();
        let world_normal = normal_matrix(world) * normal;
        assert_relative_eq!(world_tangent.dot(world_normal), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn normal_matrix_of_singular_world_falls_back() {
        let world = make_scale(1.0, 0.0, 1.0);
        let m = normal_matrix(world);
        assert_relative_eq!(m.y.y, 0.0);
        assert_relative_eq!(m.x.x, 1.0);
    }

    #[test]
    fn mesh_transform_rotates_counter_clockwise() {
        let t = Transform {
            rotation: Vector3::new(0.0, 0.0, FRAC_PI_2),
            ..Transform::at(0.0, 1.0, 0.0)
        };
        assert_relative_eq!(t.to_matrix() * point(1.0, 0.0, 0.0), point(0.0, 2.0, 0.0), epsilon = 1e-5);
    }
}
