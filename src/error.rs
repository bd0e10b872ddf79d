//! Error taxonomy for asset loading, name resolution and shader state.
//!
//! - [`Error::AssetLoad`] is raised while loading files at startup and is fatal there
//! - [`Error::NotFound`] is raised by registry lookups; draw paths skip and carry on
//! - [`Error::ShaderNotCompiled`] means the bootstrap forgot a compile step

use std::{fmt, path::PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

/// The registry table a lookup was made against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Texture,
    Shader,
    Material,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::Texture => "texture",
            ResourceKind::Shader => "shader",
            ResourceKind::Material => "material",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load asset {}: {source}", path.display())]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("no {kind} named '{name}' is registered")]
    NotFound { kind: ResourceKind, name: String },

    #[error("shader program '{0}' was used before it was compiled")]
    ShaderNotCompiled(String),

    #[error("shader program '{name}' failed to compile: {reason}")]
    ShaderCompile { name: String, reason: String },
}

impl Error {
    pub(crate) fn asset_load(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Error::AssetLoad {
            path: path.into(),
            source: source.into(),
        }
    }

    pub(crate) fn not_found(kind: ResourceKind, name: &str) -> Self {
        Error::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    /// Whether a draw path may skip the offending draw and keep rendering.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
