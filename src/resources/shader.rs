use std::path::{Path, PathBuf};

use crate::{
    error::{Error, Result},
    render::GpuDevice,
    resources::load_string,
};

/// Vertex and fragment stage source text, as read from disk.
#[derive(Clone, Debug, PartialEq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
    pub vertex_path: PathBuf,
    pub fragment_path: PathBuf,
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            vertex_path: PathBuf::new(),
            fragment_path: PathBuf::new(),
        }
    }

    pub fn load(vertex_path: &Path, fragment_path: &Path) -> Result<Self> {
        Ok(Self {
            vertex: load_string(vertex_path)?,
            fragment: load_string(fragment_path)?,
            vertex_path: vertex_path.to_path_buf(),
            fragment_path: fragment_path.to_path_buf(),
        })
    }
}

/// A shader program owned by the registry.
///
/// Programs start out as plain source text. [`compile`](Self::compile) hands
/// the source to the GPU exactly once; until then no draw may use the program.
#[derive(Debug)]
pub struct ShaderProgram<P> {
    name: String,
    source: ShaderSource,
    compiled: Option<P>,
}

impl<P> ShaderProgram<P> {
    pub fn new(name: &str, source: ShaderSource) -> Self {
        Self {
            name: name.to_string(),
            source,
            compiled: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.is_some()
    }

    /// Compiles and links the program. Calling it again after a success is a no-op.
    pub fn compile<D>(&mut self, device: &mut D) -> Result<()>
    where
        D: GpuDevice<Program = P>,
    {
        if self.compiled.is_some() {
            log::debug!("Shader program '{}' is already compiled.", self.name);
            return Ok(());
        }
        let program = device.compile_program(&self.name, &self.source)?;
        log::info!("Compiled shader program '{}'.", self.name);
        self.compiled = Some(program);
        Ok(())
    }

    /// The compiled GPU program. Fails if [`compile`](Self::compile) never succeeded.
    pub fn program(&self) -> Result<&P> {
        self.compiled
            .as_ref()
            .ok_or_else(|| Error::ShaderNotCompiled(self.name.clone()))
    }

    pub(crate) fn into_program(self) -> Option<P> {
        self.compiled
    }
}
