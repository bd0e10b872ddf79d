//! The registry owns every named GPU resource: textures, shader programs and
//! materials. Meshes and materials refer into it by name and resolve at draw
//! time, so a re-registered name is picked up on the next frame.

use std::{
    collections::{HashMap, hash_map::Entry},
    path::Path,
};

use crate::{
    data_structures::material::{Material, UniformSpec},
    error::{Error, ResourceKind, Result},
    render::GpuDevice,
    resources::{
        shader::{ShaderProgram, ShaderSource},
        texture::{Texture, decode_image},
    },
};

pub struct Registry<D: GpuDevice> {
    textures: HashMap<String, Texture<D::Texture>>,
    shaders: HashMap<String, ShaderProgram<D::Program>>,
    materials: HashMap<String, Material>,
}

impl<D: GpuDevice> Default for Registry<D> {
    fn default() -> Self {
        Self {
            textures: HashMap::new(),
            shaders: HashMap::new(),
            materials: HashMap::new(),
        }
    }
}

impl<D: GpuDevice> Registry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the image at `path` and uploads it under `name`.
    ///
    /// A texture already registered under `name` is released on the device.
    pub fn load_texture(
        &mut self,
        device: &mut D,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Result<&Texture<D::Texture>> {
        let path = path.as_ref();
        let image = decode_image(path)?;
        log::info!(
            "Loaded texture '{}' ({}x{}) from {}.",
            name,
            image.width(),
            image.height(),
            path.display()
        );
        Ok(self.insert_texture(device, name, &image))
    }

    /// Uploads an already decoded image under `name`.
    pub fn insert_texture(
        &mut self,
        device: &mut D,
        name: &str,
        image: &image::RgbaImage,
    ) -> &Texture<D::Texture> {
        let texture = Texture {
            handle: device.create_texture(name, image),
            width: image.width(),
            height: image.height(),
        };
        if let Some(old) = self.textures.insert(name.to_string(), texture) {
            log::debug!("Texture '{}' replaced, releasing the previous one.", name);
            device.release_texture(old.handle);
        }
        &self.textures[name]
    }

    /// Reads both shader stages and stores them uncompiled under `name`.
    ///
    /// Nothing reaches the GPU until [`ShaderProgram::compile`] or
    /// [`compile_shaders`](Self::compile_shaders) runs.
    pub fn load_shader(
        &mut self,
        device: &mut D,
        name: &str,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<&mut ShaderProgram<D::Program>> {
        let source = ShaderSource::load(vertex_path.as_ref(), fragment_path.as_ref())?;
        log::info!(
            "Loaded shader '{}' from {} and {}.",
            name,
            source.vertex_path.display(),
            source.fragment_path.display()
        );
        Ok(self.insert_shader(device, name, source))
    }

    pub fn insert_shader(
        &mut self,
        device: &mut D,
        name: &str,
        source: ShaderSource,
    ) -> &mut ShaderProgram<D::Program> {
        let program = ShaderProgram::new(name, source);
        match self.shaders.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                log::debug!("Shader '{}' replaced, releasing the previous one.", name);
                if let Some(old) = slot.insert(program).into_program() {
                    device.release_program(old);
                }
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(program),
        }
    }

    /// Compiles every registered program that is not compiled yet.
    pub fn compile_shaders(&mut self, device: &mut D) -> Result<()> {
        self.shaders
            .values_mut()
            .filter(|shader| !shader.is_compiled())
            .try_for_each(|shader| shader.compile(device))
    }

    /// Registers a material. `shader_name` must already be registered; the
    /// textures its uniforms name are resolved at draw time.
    ///
    /// Re-registering a name replaces the previous material.
    pub fn create_material(
        &mut self,
        name: &str,
        shader_name: &str,
        uniforms: UniformSpec,
    ) -> Result<&Material> {
        if !self.shaders.contains_key(shader_name) {
            return Err(Error::not_found(ResourceKind::Shader, shader_name));
        }
        let material = Material {
            name: name.to_string(),
            shader_name: shader_name.to_string(),
            uniforms,
        };
        if self.materials.insert(name.to_string(), material).is_some() {
            log::debug!("Material '{}' replaced.", name);
        }
        Ok(&self.materials[name])
    }

    pub fn get_texture(&self, name: &str) -> Result<&Texture<D::Texture>> {
        self.textures
            .get(name)
            .ok_or_else(|| Error::not_found(ResourceKind::Texture, name))
    }

    pub fn get_shader(&self, name: &str) -> Result<&ShaderProgram<D::Program>> {
        self.shaders
            .get(name)
            .ok_or_else(|| Error::not_found(ResourceKind::Shader, name))
    }

    pub fn get_shader_mut(&mut self, name: &str) -> Result<&mut ShaderProgram<D::Program>> {
        self.shaders
            .get_mut(name)
            .ok_or_else(|| Error::not_found(ResourceKind::Shader, name))
    }

    pub fn get_material(&self, name: &str) -> Result<&Material> {
        self.materials
            .get(name)
            .ok_or_else(|| Error::not_found(ResourceKind::Material, name))
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Releases everything in dependency order: materials first, then the
    /// shaders and textures they point at.
    pub fn release_all(&mut self, device: &mut D) {
        self.materials.clear();
        for (_, shader) in self.shaders.drain() {
            if let Some(program) = shader.into_program() {
                device.release_program(program);
            }
        }
        for (_, texture) in self.textures.drain() {
            device.release_texture(texture.handle);
        }
    }
}
