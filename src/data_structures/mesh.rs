//! CPU-side mesh data and the primitive builders the labs draw with.
//!
//! All builders emit triangles whose `(p1 - p0) x (p2 - p0)` points out of
//! the surface, which is the front face for the left-handed, clockwise
//! pipelines in `pipelines::basic`.

use std::f32::consts::PI;
use std::ops::Range;

use cgmath::{
    ElementWise, InnerSpace, Matrix4, Point3, SquareMatrix, Transform as _, Vector3, Zero,
};

use crate::data_structures::model::ModelVertex;
use crate::transform::normal_matrix;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    /// Index ranges of the meshes this one was merged from.
    pub submeshes: Vec<Range<u32>>,
}

impl MeshData {
    pub fn new(vertices: Vec<ModelVertex>, indices: Vec<u32>) -> Self {
        let submeshes = vec![0..indices.len() as u32];
        Self {
            vertices,
            indices,
            submeshes,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bakes `matrix` into positions and normals. A mirroring matrix also
    /// reverses the winding so front faces stay front faces.
    pub fn transformed(mut self, matrix: Matrix4<f32>) -> Self {
        if matrix.determinant() < 0.0 {
            for tri in self.indices.chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
        }
        let normals = normal_matrix(matrix);
        for v in &mut self.vertices {
            let p = matrix.transform_point(Point3::from(v.position));
            v.position = p.into();
            let n = normals * Vector3::from(v.normal);
            if !n.is_zero() {
                v.normal = n.normalize().into();
            }
        }
        self
    }

    pub fn translated(self, x: f32, y: f32, z: f32) -> Self {
        self.transformed(Matrix4::from_translation(Vector3::new(x, y, z)))
    }

    /// Turns the mesh inside out so it can be seen from within.
    pub fn flip_faces(mut self) -> Self {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        for v in &mut self.vertices {
            v.normal = (-Vector3::from(v.normal)).into();
        }
        self
    }

    /// Smooth per-vertex normals from the triangle list, for meshes given
    /// only as positions and indices.
    pub fn compute_normals(mut self) -> Self {
        let mut sums = vec![Vector3::zero(); self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = Vector3::from(self.vertices[a].position);
            let p1 = Vector3::from(self.vertices[b].position);
            let p2 = Vector3::from(self.vertices[c].position);
            let face = (p1 - p0).cross(p2 - p0);
            for i in [a, b, c] {
                sums[i] += face;
            }
        }
        for (v, n) in self.vertices.iter_mut().zip(sums) {
            v.normal = if n.is_zero() { n.into() } else { n.normalize().into() };
        }
        self
    }
}

/// Concatenates `parts` into one mesh with one sub-mesh range per part.
///
/// Returns `None` when there is nothing to merge.
pub fn merge_meshes(parts: &[MeshData]) -> Option<MeshData> {
    if parts.is_empty() {
        return None;
    }
    let mut merged = MeshData::default();
    for part in parts {
        let base = merged.vertices.len() as u32;
        let start = merged.indices.len() as u32;
        merged.vertices.extend_from_slice(&part.vertices);
        merged.indices.extend(part.indices.iter().map(|i| i + base));
        merged.submeshes.push(start..merged.indices.len() as u32);
    }
    Some(merged)
}

fn vertex(position: Vector3<f32>, normal: Vector3<f32>, tex_coords: [f32; 2]) -> ModelVertex {
    ModelVertex {
        position: position.into(),
        normal: normal.into(),
        tex_coords,
    }
}

/// Axis aligned box centred on the origin, four vertices per face.
pub fn create_box(width: f32, height: f32, depth: f32) -> MeshData {
    let half = Vector3::new(width, height, depth) * 0.5;
    // (normal, u, v) with u x v == normal
    let faces = [
        (Vector3::unit_x(), -Vector3::unit_z(), Vector3::unit_y()),
        (-Vector3::unit_x(), Vector3::unit_z(), Vector3::unit_y()),
        (Vector3::unit_z(), Vector3::unit_x(), Vector3::unit_y()),
        (-Vector3::unit_z(), -Vector3::unit_x(), Vector3::unit_y()),
        (Vector3::unit_y(), Vector3::unit_x(), -Vector3::unit_z()),
        (-Vector3::unit_y(), Vector3::unit_x(), Vector3::unit_z()),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner = (normal + u * su + v * sv).mul_element_wise(half);
            vertices.push(vertex(corner, normal, [(su + 1.0) * 0.5, (1.0 - sv) * 0.5]));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    MeshData::new(vertices, indices)
}

/// UV sphere with `segments` rings and twice as many slices.
pub fn create_sphere(diameter: f32, segments: u32) -> MeshData {
    let rings = segments.max(2);
    let slices = rings * 2;
    let radius = diameter * 0.5;

    let mut vertices = Vec::with_capacity(((rings + 1) * (slices + 1)) as usize);
    for i in 0..=rings {
        let theta = PI * i as f32 / rings as f32;
        for j in 0..=slices {
            let phi = 2.0 * PI * j as f32 / slices as f32;
            let normal = Vector3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            vertices.push(vertex(
                normal * radius,
                normal,
                [j as f32 / slices as f32, i as f32 / rings as f32],
            ));
        }
    }

    let mut indices = Vec::with_capacity((rings * slices * 6) as usize);
    for i in 0..rings {
        for j in 0..slices {
            let a = i * (slices + 1) + j;
            let b = a + slices + 1;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }
    MeshData::new(vertices, indices)
}

/// Flat grid in the XZ plane facing +Y.
pub fn create_ground(width: f32, depth: f32, subdivisions: u32) -> MeshData {
    let n = subdivisions.max(1);
    let mut vertices = Vec::with_capacity(((n + 1) * (n + 1)) as usize);
    for row in 0..=n {
        for col in 0..=n {
            let (s, t) = (col as f32 / n as f32, row as f32 / n as f32);
            vertices.push(vertex(
                Vector3::new((s - 0.5) * width, 0.0, (t - 0.5) * depth),
                Vector3::unit_y(),
                [s, 1.0 - t],
            ));
        }
    }

    let mut indices = Vec::with_capacity((n * n * 6) as usize);
    for row in 0..n {
        for col in 0..n {
            let a = row * (n + 1) + col;
            let b = a + 1;
            let c = a + n + 1;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    MeshData::new(vertices, indices)
}

/// Capped cylinder along Y with flat shaded sides. Three sides give a
/// triangular prism.
pub fn create_cylinder(diameter: f32, height: f32, tessellation: u32) -> MeshData {
    let sides = tessellation.max(3);
    let radius = diameter * 0.5;
    let half = height * 0.5;
    let rim = |k: u32| {
        let angle = 2.0 * PI * k as f32 / sides as f32;
        (angle.cos(), angle.sin())
    };

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for k in 0..sides {
        let (c0, s0) = rim(k);
        let (c1, s1) = rim(k + 1);
        let normal = Vector3::new(c0 + c1, 0.0, s0 + s1).normalize();
        let (u0, u1) = (k as f32 / sides as f32, (k + 1) as f32 / sides as f32);
        let base = vertices.len() as u32;
        vertices.push(vertex(Vector3::new(c0 * radius, -half, s0 * radius), normal, [u0, 1.0]));
        vertices.push(vertex(Vector3::new(c0 * radius, half, s0 * radius), normal, [u0, 0.0]));
        vertices.push(vertex(Vector3::new(c1 * radius, -half, s1 * radius), normal, [u1, 1.0]));
        vertices.push(vertex(Vector3::new(c1 * radius, half, s1 * radius), normal, [u1, 0.0]));
        let (b0, t0, b1, t1) = (base, base + 1, base + 2, base + 3);
        indices.extend_from_slice(&[b0, t0, b1, b1, t0, t1]);
    }

    for (y, normal) in [(half, Vector3::unit_y()), (-half, -Vector3::unit_y())] {
        let centre = vertices.len() as u32;
        vertices.push(vertex(Vector3::new(0.0, y, 0.0), normal, [0.5, 0.5]));
        for k in 0..sides {
            let (c, s) = rim(k);
            vertices.push(vertex(
                Vector3::new(c * radius, y, s * radius),
                normal,
                [0.5 + 0.5 * c, 0.5 + 0.5 * s],
            ));
        }
        for k in 0..sides {
            let this = centre + 1 + k;
            let next = centre + 1 + (k + 1) % sides;
            if y > 0.0 {
                indices.extend_from_slice(&[centre, next, this]);
            } else {
                indices.extend_from_slice(&[centre, this, next]);
            }
        }
    }
    MeshData::new(vertices, indices)
}

/// Triangle fan: a centre vertex at the origin and `count` rim vertices on
/// the plane `z = 1`. Fewer than three rim vertices are raised to three.
pub fn create_circle(count: u32, radius: f32) -> MeshData {
    let count = count.max(3);
    let mut vertices = Vec::with_capacity(count as usize + 1);
    vertices.push(vertex(Vector3::zero(), Vector3::zero(), [0.5, 0.5]));
    let mut indices = Vec::with_capacity(count as usize * 3);
    for i in 0..count {
        let angle = (PI * 2.0 / count as f32) * i as f32;
        let (c, s) = (angle.cos(), angle.sin());
        vertices.push(vertex(
            Vector3::new(c * radius, s * radius, 1.0),
            Vector3::zero(),
            [0.5 + 0.5 * c, 0.5 - 0.5 * s],
        ));
        if i > 0 {
            indices.extend_from_slice(&[0, i, i + 1]);
        }
    }
    indices.extend_from_slice(&[0, count, 1]);
    MeshData::new(vertices, indices).compute_normals()
}

/// Square based pyramid with its apex at `y = 1`.
pub fn create_pyramid() -> MeshData {
    #[rustfmt::skip]
    let positions: [[f32; 3]; 5] = [
        [0.0, 1.0, 0.0],
        [1.0, 0.0, 1.0],
        [1.0, 0.0, -1.0],
        [-1.0, 0.0, -1.0],
        [-1.0, 0.0, 1.0],
    ];
    let uvs: [[f32; 2]; 5] = [[0.5, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
    #[rustfmt::skip]
    let indices = vec![
        0, 1, 2,
        0, 2, 3,
        0, 3, 4,
        0, 4, 1,
        1, 3, 2,
        1, 4, 3,
    ];

    let vertices = positions
        .iter()
        .zip(uvs)
        .map(|(&position, tex_coords)| ModelVertex {
            position,
            normal: [0.0; 3],
            tex_coords,
        })
        .collect();
    MeshData::new(vertices, indices).compute_normals()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{Deg, Matrix3};

    use super::*;

    fn outward_faces(mesh: &MeshData) -> bool {
        let centroid = mesh
            .vertices
            .iter()
            .fold(Vector3::zero(), |acc, v| acc + Vector3::from(v.position))
            / mesh.vertices.len() as f32;
        mesh.indices.chunks_exact(3).all(|tri| {
            let p: Vec<Vector3<f32>> = tri
                .iter()
                .map(|&i| Vector3::from(mesh.vertices[i as usize].position))
                .collect();
            let face = (p[1] - p[0]).cross(p[2] - p[0]);
            let mid = (p[0] + p[1] + p[2]) / 3.0;
            face.magnitude() < 1e-6 || face.dot(mid - centroid) > 0.0
        })
    }

    #[test]
    fn circle_is_a_closed_fan() {
        let circle = create_circle(10, 8.0);
        assert_eq!(circle.vertices.len(), 11);
        assert_eq!(circle.triangle_count(), 10);
        assert_eq!(&circle.indices[..6], &[0, 1, 2, 0, 2, 3]);
        assert_eq!(&circle.indices[27..], &[0, 10, 1]);
        assert_relative_eq!(Vector3::from(circle.vertices[1].position), Vector3::new(8.0, 0.0, 1.0));
        let quarter = Vector3::from(circle.vertices[1 + 10 / 4].position);
        assert_relative_eq!(quarter.magnitude(), (64.0_f32 + 1.0).sqrt(), epsilon = 1e-5);
        for v in &circle.vertices[1..] {
            assert_relative_eq!(v.position[2], 1.0);
        }
    }

    #[test]
    fn tiny_circles_still_close_the_fan() {
        for count in [0, 1, 2] {
            let circle = create_circle(count, 1.0);
            assert_eq!(circle.vertices.len(), 4);
            assert_eq!(circle.triangle_count(), 3);
            assert!(circle.indices.iter().all(|&i| (i as usize) < circle.vertices.len()));
        }
    }

    #[test]
    fn pyramid_layout() {
        let pyramid = create_pyramid();
        assert_eq!(pyramid.vertices.len(), 5);
        assert_eq!(pyramid.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4, 0, 4, 1, 1, 3, 2, 1, 4, 3]);
        assert_eq!(pyramid.vertices[0].position, [0.0, 1.0, 0.0]);
        assert_eq!(pyramid.vertices[0].tex_coords, [0.5, 0.0]);
        assert!(outward_faces(&pyramid));
        // the apex normal points straight up
        assert_relative_eq!(Vector3::from(pyramid.vertices[0].normal), Vector3::unit_y(), epsilon = 1e-6);
    }

    #[test]
    fn primitives_face_outwards() {
        assert!(outward_faces(&create_box(2.0, 1.0, 1.0)));
        assert!(outward_faces(&create_sphere(2.0, 16)));
        assert!(outward_faces(&create_cylinder(1.3, 1.2, 3)));
        assert!(outward_faces(&create_cylinder(1.0, 2.0, 24)));
    }

    #[test]
    fn box_extents_and_normals() {
        let mesh = create_box(2.0, 1.0, 4.0);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        for v in &mesh.vertices {
            assert_relative_eq!(v.position[0].abs(), 1.0);
            assert_relative_eq!(v.position[1].abs(), 0.5);
            assert_relative_eq!(v.position[2].abs(), 2.0);
            let n = Vector3::from(v.normal);
            let p = Vector3::from(v.position);
            assert!(n.dot(p) > 0.0);
        }
    }

    #[test]
    fn sphere_vertices_lie_on_the_surface() {
        let sphere = create_sphere(3.0, 12);
        for v in &sphere.vertices {
            assert_relative_eq!(Vector3::from(v.position).magnitude(), 1.5, epsilon = 1e-5);
            assert_relative_eq!(Vector3::from(v.normal).magnitude(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn ground_grid_faces_up() {
        let ground = create_ground(6.0, 6.0, 2);
        assert_eq!(ground.vertices.len(), 9);
        assert_eq!(ground.triangle_count(), 8);
        for tri in ground.indices.chunks_exact(3) {
            let p: Vec<Vector3<f32>> = tri
                .iter()
                .map(|&i| Vector3::from(ground.vertices[i as usize].position))
                .collect();
            assert!((p[1] - p[0]).cross(p[2] - p[0]).y > 0.0);
        }
        let xs: Vec<f32> = ground.vertices.iter().map(|v| v.position[0]).collect();
        assert_relative_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), -3.0);
        assert_relative_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 3.0);
    }

    #[test]
    fn prism_has_three_sides_and_two_caps() {
        let roof = create_cylinder(1.3, 1.2, 3);
        assert_eq!(roof.triangle_count(), 3 * 2 + 3 * 2);
    }

    #[test]
    fn merging_nothing_fails() {
        assert!(merge_meshes(&[]).is_none());
    }

    #[test]
    fn merge_records_one_range_per_part() {
        let a = create_box(1.0, 1.0, 1.0);
        let b = create_pyramid();
        let merged = merge_meshes(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(merged.vertices.len(), a.vertices.len() + b.vertices.len());
        assert_eq!(merged.submeshes, vec![0..36, 36..54]);
        // second part's indices are rebased past the first part's vertices
        assert_eq!(merged.indices[36], b.indices[0] + 24);
        assert_eq!(merged.indices.iter().copied().max(), Some(28));
    }

    #[test]
    fn flipping_reverses_winding_and_normals() {
        let ground = create_ground(1.0, 1.0, 1);
        let flipped = ground.clone().flip_faces();
        assert_eq!(&flipped.indices[..3], &[ground.indices[0], ground.indices[2], ground.indices[1]]);
        assert_eq!(flipped.vertices[0].normal, [0.0, -1.0, 0.0]);
    }

    #[test]
    fn transform_bakes_positions_and_normals() {
        let rotation = Matrix4::from(Matrix3::from_angle_z(Deg(90.0)));
        let moved = create_ground(2.0, 2.0, 1).transformed(Matrix4::from_translation(Vector3::new(0.0, 1.0, 0.0)) * rotation);
        for v in &moved.vertices {
            assert_relative_eq!(Vector3::from(v.normal), -Vector3::unit_x(), epsilon = 1e-6);
        }
        let mirrored = create_box(1.0, 1.0, 1.0).transformed(Matrix4::from_nonuniform_scale(-1.0, 1.0, 1.0));
        assert!(outward_faces(&mirrored));

        let raised = create_box(1.0, 1.0, 1.0).translated(0.0, 0.5, 0.0);
        let min_y = raised.vertices.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert_relative_eq!(min_y, 0.0, epsilon = 1e-6);
    }
}
