//! Free-flying camera.
//!
//! Orientation is stored as yaw/pitch. Each [`Camera::update`] integrates the
//! mouse delta into the angles, rebuilds the forward/right/up basis from them,
//! moves the position with explicit Euler integration scaled by the frame time
//! and recomputes the view matrix. The projection is only recomputed when the
//! aspect ratio, window size or field of view changes.
//!
//! Matrices use the OpenGL clip convention (`z` in `-1..1`); the wgpu backend
//! converts on upload.

use std::f32::consts::{FRAC_PI_2, TAU};

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, Vector2, Vector3, Zero};
use instant::Duration;

use crate::{input::Motion, settings::CameraSettings};

/// Largest pitch magnitude the camera accepts, just short of straight up/down.
pub const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

pub const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
    fovy: Rad<f32>,
    aspect: f32,
    window_size: (u32, u32),
    znear: f32,
    zfar: f32,
    pub speed: f32,
    /// Radians per pixel of mouse motion.
    pub sensitivity: f32,
    forward: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
}

impl Camera {
    pub fn new(settings: &CameraSettings, window_size: (u32, u32)) -> Self {
        let mut camera = Self {
            position: settings.position.into(),
            yaw: settings.yaw.into(),
            pitch: Rad(0.0),
            fovy: settings.fovy.into(),
            aspect: 1.0,
            window_size,
            znear: settings.znear,
            zfar: settings.zfar,
            speed: settings.speed,
            sensitivity: Rad::from(Deg(settings.sensitivity)).0,
            forward: Vector3::zero(),
            right: Vector3::zero(),
            up: Vector3::zero(),
            view: Matrix4::zero(),
            projection: Matrix4::zero(),
        };
        camera.set_pitch(settings.pitch.into());
        if window_size.0 > 0 && window_size.1 > 0 {
            camera.aspect = window_size.0 as f32 / window_size.1 as f32;
        }
        camera.rebuild_basis();
        camera.rebuild_view();
        camera.rebuild_projection();
        camera
    }

    /// Integrates one frame of input.
    ///
    /// `mouse_delta` is in pixels, `motion` is the signed intent per axis and
    /// `dt` the time since the previous frame. No time, no movement.
    pub fn update(&mut self, mouse_delta: Vector2<f32>, motion: Motion, dt: Duration) {
        self.yaw = Rad((self.yaw.0 + mouse_delta.x * self.sensitivity) % TAU);
        self.set_pitch(Rad(self.pitch.0 + mouse_delta.y * self.sensitivity));
        self.rebuild_basis();

        let dt = dt.as_secs_f32();
        let step = self.forward * motion.forward + self.right * motion.right + self.up * motion.up;
        self.position += step * self.speed * dt;

        self.rebuild_view();
    }

    pub fn yaw(&self) -> Rad<f32> {
        self.yaw
    }

    pub fn pitch(&self) -> Rad<f32> {
        self.pitch
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.forward
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    /// Sets the aspect ratio and recomputes the projection. Non-positive or
    /// non-finite ratios (a minimized window) are ignored.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if !aspect.is_finite() || aspect <= 0.0 {
            log::debug!("Ignoring degenerate aspect ratio {}.", aspect);
            return;
        }
        self.aspect = aspect;
        self.rebuild_projection();
    }

    /// Records the new window size and derives the aspect ratio from it.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
        self.rebuild_projection();
    }

    pub fn set_fovy(&mut self, fovy: impl Into<Rad<f32>>) {
        self.fovy = fovy.into();
        self.rebuild_projection();
    }

    fn set_pitch(&mut self, pitch: Rad<f32>) {
        self.pitch = Rad(pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2));
    }

    fn rebuild_basis(&mut self) {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        self.forward =
            Vector3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch).normalize();
        self.right = self.forward.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.forward);
    }

    fn rebuild_view(&mut self) {
        self.view = Matrix4::look_to_rh(self.position, self.forward, self.up);
    }

    fn rebuild_projection(&mut self) {
        self.projection = cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar);
    }
}
