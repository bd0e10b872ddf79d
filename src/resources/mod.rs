//! Loading of textures, shader sources and meshes from external files, and
//! the [`registry::Registry`] that owns the resulting GPU resources.

use std::path::Path;

use crate::error::{Error, Result};

pub mod mesh;
pub mod registry;
pub mod shader;
pub mod texture;

pub fn load_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::asset_load(path, e))
}

pub fn load_binary(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::asset_load(path, e))
}
