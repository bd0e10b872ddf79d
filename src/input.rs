//! Platform-independent input state.
//!
//! Keys set a signed intent per motion axis, last key wins. The relative mouse
//! motion reported by the platform accumulates here and must be drained once
//! per frame through [`InputState::poll`], whether or not the camera uses it.

use cgmath::{Vector2, Zero};

/// The keys the viewer reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    E,
    Q,
}

/// Discrete events delivered by the platform layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Quit,
    Resize(u32, u32),
    KeyDown(Key),
    KeyUp(Key),
}

/// Signed unit intent along the camera's forward, right and up axes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motion {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
}

/// Input sampled for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    /// Mouse motion to apply to the camera, zero unless the primary button is held.
    pub mouse_delta: Vector2<f32>,
    pub motion: Motion,
}

#[derive(Clone, Debug)]
pub struct InputState {
    motion: Motion,
    primary_held: bool,
    pending_mouse: Vector2<f32>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            motion: Motion::default(),
            primary_held: false,
            pending_mouse: Vector2::zero(),
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::W => self.motion.forward = 1.0,
            Key::S => self.motion.forward = -1.0,
            Key::D => self.motion.right = 1.0,
            Key::A => self.motion.right = -1.0,
            Key::E => self.motion.up = 1.0,
            Key::Q => self.motion.up = -1.0,
        }
    }

    /// Releasing either key of an axis stops motion on that axis.
    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::W | Key::S => self.motion.forward = 0.0,
            Key::A | Key::D => self.motion.right = 0.0,
            Key::E | Key::Q => self.motion.up = 0.0,
        }
    }

    pub fn set_primary_button(&mut self, held: bool) {
        self.primary_held = held;
    }

    pub fn is_primary_held(&self) -> bool {
        self.primary_held
    }

    /// Adds relative mouse motion reported by the platform.
    pub fn accumulate_mouse(&mut self, dx: f32, dy: f32) {
        self.pending_mouse += Vector2::new(dx, dy);
    }

    pub fn pending_mouse(&self) -> Vector2<f32> {
        self.pending_mouse
    }

    pub fn motion(&self) -> Motion {
        self.motion
    }

    /// Drains the accumulated mouse motion and samples the motion intent.
    ///
    /// Call exactly once per frame. The delta is discarded while the primary
    /// button is up, so motion made during a release never lands on the
    /// frame the button goes down again.
    pub fn poll(&mut self) -> FrameInput {
        let drained = std::mem::replace(&mut self.pending_mouse, Vector2::zero());
        FrameInput {
            mouse_delta: if self.primary_held {
                drained
            } else {
                Vector2::zero()
            },
            motion: self.motion,
        }
    }
}
