use std::path::Path;

use instant::Duration;

use crate::{
    camera::Camera,
    data_structures::{
        material::{Material, UniformSpec},
        mesh::Mesh,
        scene_graph::Scene,
    },
    error::Result,
    input::{InputEvent, InputState},
    render::{BindingContext, FrameStats},
    resources::{registry::Registry, shader::ShaderProgram, texture::Texture},
    settings::Settings,
};

/// What the event loop should do after an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Root owner of the GPU backend, the resource registry, the scene and the camera.
///
/// Created once at startup. On drop the scene is torn down first, then the
/// registry, so no buffer or material outlives the resources it points at.
pub struct Context<B: BindingContext> {
    pub camera: Camera,
    pub input: InputState,
    pub scene: Scene<B>,
    pub registry: Registry<B>,
    gpu: B,
}

impl<B: BindingContext> Context<B> {
    pub fn new(gpu: B, settings: &Settings) -> Self {
        Self {
            camera: Camera::new(&settings.camera, settings.window_size),
            input: InputState::new(),
            scene: Scene::new(),
            registry: Registry::new(),
            gpu,
        }
    }

    pub fn gpu(&self) -> &B {
        &self.gpu
    }

    pub fn gpu_mut(&mut self) -> &mut B {
        &mut self.gpu
    }

    pub fn load_texture(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Result<&Texture<B::Texture>> {
        self.registry.load_texture(&mut self.gpu, name, path)
    }

    pub fn load_shader(
        &mut self,
        name: &str,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<&mut ShaderProgram<B::Program>> {
        self.registry
            .load_shader(&mut self.gpu, name, vertex_path, fragment_path)
    }

    pub fn compile_shader(&mut self, name: &str) -> Result<()> {
        self.registry.get_shader_mut(name)?.compile(&mut self.gpu)
    }

    pub fn compile_shaders(&mut self) -> Result<()> {
        self.registry.compile_shaders(&mut self.gpu)
    }

    pub fn create_material(
        &mut self,
        name: &str,
        shader_name: &str,
        uniforms: UniformSpec,
    ) -> Result<&Material> {
        self.registry.create_material(name, shader_name, uniforms)
    }

    pub fn load_mesh(&mut self, path: impl AsRef<Path>) -> Result<&mut Mesh<B>> {
        self.scene.load_mesh(&mut self.gpu, path)
    }

    /// Applies a discrete platform event.
    pub fn handle_event(&mut self, event: InputEvent) -> Flow {
        match event {
            InputEvent::Quit => return Flow::Quit,
            InputEvent::Resize(width, height) => self.resize(width, height),
            InputEvent::KeyDown(key) => self.input.key_down(key),
            InputEvent::KeyUp(key) => self.input.key_up(key),
        }
        Flow::Continue
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_window_size(width, height);
        self.gpu.resize(width, height);
    }

    /// Drains this frame's input and moves the camera.
    pub fn update(&mut self, dt: Duration) {
        let input = self.input.poll();
        self.camera.update(input.mouse_delta, input.motion, dt);
    }

    /// Clears the targets, draws the scene in order and presents.
    pub fn draw(&mut self) -> anyhow::Result<FrameStats> {
        self.gpu.begin_frame();
        let stats = self.scene.draw(&self.registry, &self.camera, &mut self.gpu)?;
        self.gpu.present()?;
        Ok(stats)
    }

    /// One full frame: camera integration followed by drawing.
    pub fn frame(&mut self, dt: Duration) -> anyhow::Result<FrameStats> {
        self.update(dt);
        self.draw()
    }
}

impl<B: BindingContext> Drop for Context<B> {
    fn drop(&mut self) {
        self.scene.release_all(&mut self.gpu);
        self.registry.release_all(&mut self.gpu);
    }
}
