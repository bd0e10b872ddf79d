//! Engine data structures: geometry, materials, meshes, the scene and textures.
//!
//! - `model` holds the vertex layout and CPU-side mesh data
//! - `material` binds a shader to named uniform values
//! - `mesh` is one static object with its buffers and material name
//! - `scene_graph` is the ordered mesh collection drawn each frame
//! - `texture` wraps wgpu textures and render targets

pub mod material;
pub mod mesh;
pub mod model;
pub mod scene_graph;
pub mod texture;
