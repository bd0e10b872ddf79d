//! GPU seams used by the scene while it draws.
//!
//! Rendering goes through two traits instead of touching global GPU state:
//!
//! - [`GpuDevice`] creates and releases resources (textures, programs, buffers)
//! - [`BindingContext`] is the per-frame pipeline binding state: active program,
//!   texture units, uniform values, and the indexed draw call itself
//!
//! The wgpu implementation lives in [`crate::gpu`]. Tests use a recording mock.

use crate::{data_structures::model::MeshData, error::Result, resources::shader::ShaderSource};

/// A value pushed into a named shader uniform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([[f32; 4]; 4]),
}

impl From<cgmath::Matrix4<f32>> for UniformValue {
    fn from(m: cgmath::Matrix4<f32>) -> Self {
        UniformValue::Mat4(m.into())
    }
}

/// Per-draw transforms handed to
/// [`Material::bind`](crate::data_structures::material::Material::bind).
///
/// These are transient: they are uploaded right before the draw and never
/// stored on the material, so one material can be shared by many meshes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transforms {
    pub model: cgmath::Matrix4<f32>,
    pub view: cgmath::Matrix4<f32>,
    pub projection: cgmath::Matrix4<f32>,
}

impl Transforms {
    pub const MODEL: &'static str = "model";
    pub const VIEW: &'static str = "view";
    pub const PROJECTION: &'static str = "projection";
}

/// Number of draws issued and skipped while drawing one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub submitted: usize,
    pub skipped: usize,
}

/// Creates and releases GPU resources.
///
/// The handles are opaque to the rest of the crate. The registry and the scene
/// own them and hand them back through the `release_*` calls on teardown or
/// when a name is re-registered.
pub trait GpuDevice {
    type Texture;
    type Program;
    type Buffers;

    fn create_texture(&mut self, label: &str, image: &image::RgbaImage) -> Self::Texture;

    fn compile_program(&mut self, label: &str, source: &ShaderSource) -> Result<Self::Program>;

    fn create_buffers(&mut self, label: &str, data: &MeshData) -> Self::Buffers;

    fn release_texture(&mut self, texture: Self::Texture) {
        drop(texture);
    }

    fn release_program(&mut self, program: Self::Program) {
        drop(program);
    }

    fn release_buffers(&mut self, buffers: Self::Buffers) {
        drop(buffers);
    }
}

/// Pipeline binding state for the frame being recorded.
///
/// Calls mutate shared binding state (active program, texture units, uniform
/// values) and are only valid from the render thread, in frame order.
pub trait BindingContext: GpuDevice {
    /// Starts a frame and clears the colour and depth targets.
    fn begin_frame(&mut self);

    fn use_program(&mut self, program: &Self::Program);

    /// Activates `texture` on texture unit `slot` and points the sampler
    /// uniform `uniform` at that unit.
    fn bind_texture(&mut self, uniform: &str, slot: u32, texture: &Self::Texture);

    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn draw_indexed(&mut self, buffers: &Self::Buffers, index_count: u32);

    /// Finishes the frame and hands it to the presentation engine.
    fn present(&mut self) -> anyhow::Result<()>;

    fn resize(&mut self, _width: u32, _height: u32) {}
}
