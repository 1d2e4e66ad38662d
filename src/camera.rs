//! First-person fly camera driven by WASD and mouse motion.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::input::{InputState, KeyCode};

const PITCH_LIMIT: f32 = 89.0;

/// Orientation is kept as yaw/pitch in degrees; the basis vectors are derived
/// from them after every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera {
    position: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    move_speed: f32,
    turn_speed: f32,
    #[serde(skip)]
    front: Vec3,
    #[serde(skip)]
    right: Vec3,
    #[serde(skip)]
    up: Vec3,
}

impl Camera {
    pub fn new(
        position: Vec3,
        world_up: Vec3,
        yaw: f32,
        pitch: f32,
        move_speed: f32,
        turn_speed: f32,
    ) -> Self {
        let mut camera = Self {
            position,
            world_up: world_up.normalize_or_zero(),
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            move_speed,
            turn_speed,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_basis();
        camera
    }

    /// Moves along the view plane for every held movement key.
    pub fn key_control(&mut self, input: &InputState, delta_seconds: f32) {
        let velocity = self.move_speed * delta_seconds;
        if input.is_key_down(KeyCode::W) {
            self.position += self.front * velocity;
        }
        if input.is_key_down(KeyCode::S) {
            self.position -= self.front * velocity;
        }
        if input.is_key_down(KeyCode::A) {
            self.position -= self.right * velocity;
        }
        if input.is_key_down(KeyCode::D) {
            self.position += self.right * velocity;
        }
    }

    /// Turns by a mouse delta where positive y looks up.
    pub fn mouse_control(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        self.yaw += delta.x * self.turn_speed;
        self.pitch = (self.pitch + delta.y * self.turn_speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_basis();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit vector the camera looks along.
    pub fn direction(&self) -> Vec3 {
        self.front
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    fn update_basis(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(self.world_up).normalize_or_zero();
        self.up = self.right.cross(self.front).normalize_or_zero();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.4, 2.5), Vec3::Y, -90.0, -12.0, 5.0, 0.2)
    }
}

/// Perspective projection parameters; the aspect ratio comes from the
/// framebuffer at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Projection {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.fov_degrees.to_radians(),
            aspect.max(0.01),
            self.near,
            self.far,
        )
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}
