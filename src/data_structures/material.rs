//! Materials: a shader program plus an ordered set of named uniforms.
//!
//! A material refers to its shader and textures by registry name only. Every
//! bind re-resolves those names, so replacing a texture or shader in the
//! registry takes effect on the next frame.

use crate::{
    error::Result,
    render::{BindingContext, Transforms, UniformValue},
    resources::registry::Registry,
};

/// How a single uniform is fed at bind time.
#[derive(Clone, Debug, PartialEq)]
pub enum Uniform {
    /// Binds the named registry texture to texture unit `slot`.
    Texture { resource: String, slot: u32 },
    /// Pushes a literal value.
    Value(UniformValue),
}

/// Uniform name to [`Uniform`] mapping, kept in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformSpec {
    entries: Vec<(String, Uniform)>,
}

impl UniformSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture(self, uniform: &str, resource: &str, slot: u32) -> Self {
        self.with(
            uniform,
            Uniform::Texture {
                resource: resource.to_string(),
                slot,
            },
        )
    }

    pub fn value(self, uniform: &str, value: UniformValue) -> Self {
        self.with(uniform, Uniform::Value(value))
    }

    /// Adds `uniform`. A repeated name replaces the earlier entry in place.
    pub fn with(mut self, uniform: &str, entry: Uniform) -> Self {
        match self.entries.iter_mut().find(|(name, _)| name == uniform) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((uniform.to_string(), entry)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Uniform)> {
        self.entries.iter().map(|(name, u)| (name.as_str(), u))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub shader_name: String,
    pub uniforms: UniformSpec,
}

impl Material {
    /// Activates the shader and uploads every uniform for one draw.
    ///
    /// All names are resolved before any binding state changes, so a failed
    /// lookup leaves the pipeline as it was.
    pub fn bind<B: BindingContext>(
        &self,
        registry: &Registry<B>,
        pass: &mut B,
        transforms: &Transforms,
    ) -> Result<()> {
        let program = registry.get_shader(&self.shader_name)?.program()?;
        let mut textures = Vec::new();
        for (uniform, entry) in self.uniforms.iter() {
            if let Uniform::Texture { resource, slot } = entry {
                textures.push((uniform, *slot, registry.get_texture(resource)?));
            }
        }

        pass.use_program(program);
        pass.set_uniform(Transforms::MODEL, transforms.model.into());
        pass.set_uniform(Transforms::VIEW, transforms.view.into());
        pass.set_uniform(Transforms::PROJECTION, transforms.projection.into());

        let mut textures = textures.into_iter();
        for (uniform, entry) in self.uniforms.iter() {
            match entry {
                Uniform::Texture { .. } => {
                    if let Some((uniform, slot, texture)) = textures.next() {
                        pass.bind_texture(uniform, slot, &texture.handle);
                    }
                }
                Uniform::Value(value) => pass.set_uniform(uniform, *value),
            }
        }
        Ok(())
    }
}
