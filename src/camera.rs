//! Cameras, their input controller and the view/projection uniform.
//!
//! Scenes are set up in a left-handed, Y-up world: +X right, +Z into the
//! screen. View matrices use `look_at_lh` and [`Projection`] maps view depth
//! to wgpu's `0..1` clip range directly.

use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3, Vector4};
use instant::Duration;
use winit::{
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

const SAFE_BETA: f32 = 0.01;
const SAFE_PITCH: f32 = PI / 2.0 - 0.0001;
const MIN_RADIUS: f32 = 0.5;

/// Orbits `target` at `radius`; `alpha` is the longitude and `beta` the
/// angle from the +Y axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcRotateCamera {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: Point3<f32>,
}

impl ArcRotateCamera {
    pub fn new(alpha: f32, beta: f32, radius: f32, target: Point3<f32>) -> Self {
        let mut camera = Self {
            alpha,
            beta,
            radius,
            target,
        };
        camera.clamp();
        camera
    }

    pub fn position(&self) -> Point3<f32> {
        let (sin_a, cos_a) = self.alpha.sin_cos();
        let (sin_b, cos_b) = self.beta.sin_cos();
        self.target + Vector3::new(cos_a * sin_b, cos_b, sin_a * sin_b) * self.radius
    }

    fn clamp(&mut self) {
        self.beta = self.beta.clamp(SAFE_BETA, PI - SAFE_BETA);
        self.radius = self.radius.max(MIN_RADIUS);
    }
}

/// First person camera. With `yaw = 0` and `pitch = 0` it looks down +Z.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeCamera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl FreeCamera {
    pub fn new<V: Into<Point3<f32>>>(position: V) -> Self {
        Self {
            position: position.into(),
            yaw: Rad(0.0),
            pitch: Rad(0.0),
        }
    }

    /// Turn the camera towards `target`.
    pub fn looking_at(mut self, target: Point3<f32>) -> Self {
        let dir = target - self.position;
        if dir.magnitude2() > f32::EPSILON {
            let dir = dir.normalize();
            self.yaw = Rad(dir.x.atan2(dir.z));
            self.pitch = Rad(dir.y.asin().clamp(-SAFE_PITCH, SAFE_PITCH));
        }
        self
    }

    pub fn forward(&self) -> Vector3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        Vector3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw).normalize()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Camera {
    ArcRotate(ArcRotateCamera),
    Free(FreeCamera),
}

impl Camera {
    pub fn arc_rotate(alpha: f32, beta: f32, radius: f32, target: Point3<f32>) -> Self {
        Self::ArcRotate(ArcRotateCamera::new(alpha, beta, radius, target))
    }

    pub fn free_looking_at(position: Point3<f32>, target: Point3<f32>) -> Self {
        Self::Free(FreeCamera::new(position).looking_at(target))
    }

    pub fn position(&self) -> Point3<f32> {
        match self {
            Camera::ArcRotate(arc) => arc.position(),
            Camera::Free(free) => free.position,
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        match self {
            Camera::ArcRotate(arc) => {
                Matrix4::look_at_lh(arc.position(), arc.target, Vector3::unit_y())
            }
            Camera::Free(free) => Matrix4::look_at_lh(
                free.position,
                free.position + free.forward(),
                Vector3::unit_y(),
            ),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::arc_rotate(-PI / 2.0, PI / 2.5, 10.0, Point3::origin())
    }
}

/// Left-handed perspective projection onto wgpu's `0..1` depth range.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        let f = 1.0 / (self.fovy.0 / 2.0).tan();
        let depth = self.zfar / (self.zfar - self.znear);
        Matrix4::from_cols(
            Vector4::new(f / self.aspect, 0.0, 0.0, 0.0),
            Vector4::new(0.0, f, 0.0, 0.0),
            Vector4::new(0.0, 0.0, depth, 1.0),
            Vector4::new(0.0, 0.0, -self.znear * depth, 0.0),
        )
    }
}

/// The built-in `view`, `projection`, `view_proj` and eye position every
/// program can read from bind group 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        let identity: [[f32; 4]; 4] = Matrix4::identity().into();
        Self {
            view: identity,
            projection: identity,
            view_proj: identity,
            position: [0.0; 4],
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        let view = camera.calc_matrix();
        let proj = projection.calc_matrix();
        self.view = view.into();
        self.projection = proj.into();
        self.view_proj = (proj * view).into();
        self.position = camera.position().to_homogeneous().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
}

/// Turns mouse drags, the wheel and the keyboard into camera motion.
///
/// A left drag orbits an arc rotate camera or turns a free camera, the wheel
/// zooms, arrow keys orbit and WASD / Q / E move a free camera.
#[derive(Debug)]
pub struct CameraController {
    speed: f32,
    sensitivity: f32,
    dragging: bool,
    rotate_horizontal: f32,
    rotate_vertical: f32,
    scroll: f32,
    forward: f32,
    backward: f32,
    left: f32,
    right: f32,
    up: f32,
    down: f32,
}

impl CameraController {
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            dragging: false,
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            scroll: 0.0,
            forward: 0.0,
            backward: 0.0,
            left: 0.0,
            right: 0.0,
            up: 0.0,
            down: 0.0,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Returns whether the event was meant for the camera.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                ..
            } => self.handle_key(*key, *state),
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.dragging = state.is_pressed();
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll += match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
                };
                true
            }
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) -> bool {
        let amount = if state.is_pressed() { 1.0 } else { 0.0 };
        match key {
            KeyCode::KeyW => self.forward = amount,
            KeyCode::KeyS => self.backward = amount,
            KeyCode::KeyA | KeyCode::ArrowLeft => self.left = amount,
            KeyCode::KeyD | KeyCode::ArrowRight => self.right = amount,
            KeyCode::KeyE | KeyCode::ArrowUp => self.up = amount,
            KeyCode::KeyQ | KeyCode::ArrowDown => self.down = amount,
            _ => return false,
        }
        true
    }

    /// Raw mouse motion, only applied while dragging.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        if self.dragging {
            self.rotate_horizontal += dx as f32;
            self.rotate_vertical += dy as f32;
        }
    }

    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();
        match camera {
            Camera::ArcRotate(arc) => {
                arc.alpha -= (self.rotate_horizontal * self.sensitivity
                    + (self.right - self.left) * self.speed)
                    * dt;
                arc.beta -= (self.rotate_vertical * self.sensitivity
                    + (self.up - self.down) * self.speed)
                    * dt;
                arc.radius *= 1.0 - self.scroll * 0.1;
                arc.clamp();
            }
            Camera::Free(free) => {
                let forward = free.forward();
                let flat = Vector3::new(forward.x, 0.0, forward.z);
                let flat = if flat.magnitude2() > f32::EPSILON {
                    flat.normalize()
                } else {
                    Vector3::unit_z()
                };
                // left-handed: up x forward points right
                let right = Vector3::unit_y().cross(flat);
                free.position += flat * (self.forward - self.backward) * self.speed * 2.0 * dt;
                free.position += right * (self.right - self.left) * self.speed * 2.0 * dt;
                free.position += forward * self.scroll * self.speed * 0.5;
                free.position.y += (self.up - self.down) * self.speed * 2.0 * dt;

                free.yaw += Rad(self.rotate_horizontal * self.sensitivity * dt);
                free.pitch += Rad(-self.rotate_vertical * self.sensitivity * dt);
                free.pitch = Rad(free.pitch.0.clamp(-SAFE_PITCH, SAFE_PITCH));
            }
        }
        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
        self.scroll = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::Transform;

    use super::*;

    #[test]
    fn arc_camera_sits_in_front_of_the_target() {
        let arc = ArcRotateCamera::new(-PI / 2.0, PI / 2.0, 20.0, Point3::origin());
        assert_relative_eq!(arc.position(), Point3::new(0.0, 0.0, -20.0), epsilon = 1e-4);

        let raised = ArcRotateCamera::new(-PI / 2.0, PI / 2.5, 10.0, Point3::new(0.0, 1.0, 0.0));
        let p = raised.position();
        assert!(p.y > 1.0 && p.z < 0.0);
        assert_relative_eq!((p - raised.target).magnitude(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn arc_camera_clamps_beta_and_radius() {
        let arc = ArcRotateCamera::new(0.0, -1.0, 0.0, Point3::origin());
        assert!(arc.beta > 0.0);
        assert!(arc.radius >= MIN_RADIUS);
    }

    #[test]
    fn free_camera_looks_at_its_target() {
        let free = FreeCamera::new((0.0, 5.0, -10.0)).looking_at(Point3::origin());
        let expected = (Point3::origin() - free.position).normalize();
        assert_relative_eq!(free.forward(), expected, epsilon = 1e-5);
    }

    #[test]
    fn view_puts_the_target_on_the_positive_z_axis() {
        let camera = Camera::free_looking_at(Point3::new(0.0, 5.0, -10.0), Point3::origin());
        let in_view = camera.calc_matrix().transform_point(Point3::origin());
        assert_relative_eq!(in_view.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(in_view.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(in_view.z, 125.0_f32.sqrt(), epsilon = 1e-4);
    }

    #[test]
    fn projection_maps_near_and_far_to_unit_depth() {
        let projection = Projection::new(800, 600, Rad(0.8), 0.1, 100.0);
        let m = projection.calc_matrix();
        let near = m * Vector4::new(0.0, 0.0, 0.1, 1.0);
        let far = m * Vector4::new(0.0, 0.0, 100.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-6);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-6);
        // +X stays on the right of the screen
        let right = m * Vector4::new(1.0, 0.0, 5.0, 1.0);
        assert!(right.x / right.w > 0.0);
    }

    #[test]
    fn uniform_tracks_the_eye() {
        let camera = Camera::arc_rotate(-PI / 2.0, PI / 2.0, 10.0, Point3::origin());
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &Projection::new(1, 1, Rad(0.8), 0.1, 100.0));
        assert_relative_eq!(uniform.position[2], -10.0, epsilon = 1e-4);
        assert_relative_eq!(uniform.position[3], 1.0);
    }

    #[test]
    fn wheel_zooms_an_arc_camera() {
        let mut controller = CameraController::new(1.0, 0.4);
        let mut camera = Camera::arc_rotate(0.0, 1.0, 10.0, Point3::origin());
        controller.scroll = 1.0;
        controller.update(&mut camera, Duration::from_millis(16));
        match camera {
            Camera::ArcRotate(arc) => assert_relative_eq!(arc.radius, 9.0, epsilon = 1e-5),
            Camera::Free(_) => unreachable!(),
        }
        assert_eq!(controller.scroll, 0.0);
    }

    #[test]
    fn mouse_motion_is_ignored_unless_dragging() {
        let mut controller = CameraController::new(1.0, 0.4);
        controller.handle_mouse(10.0, 5.0);
        assert_eq!(controller.rotate_horizontal, 0.0);
        controller.dragging = true;
        controller.handle_mouse(10.0, 5.0);
        assert_eq!(controller.rotate_horizontal, 10.0);
    }
}
