//! dorm-viewer
//!
//! A minimal interactive viewer that loads a fixed set of textured meshes,
//! compiles one shading program and renders the scene from a free-flying
//! camera driven by keyboard and mouse.
//!
//! High-level modules
//! - `camera`: yaw/pitch fly camera integrating per-frame input into view/projection
//! - `context`: root owner of registry, scene, camera and input; drives one frame
//! - `data_structures`: vertices, materials, meshes, the scene and GPU textures
//! - `error`: asset, lookup and shader-state errors
//! - `flow`: winit event loop, frame clock and pacing
//! - `gpu`: the wgpu implementation of the rendering seams
//! - `input`: motion intent and mouse delta bookkeeping
//! - `pipelines`: render pipeline construction for compiled programs
//! - `render`: the `GpuDevice` / `BindingContext` seams the scene draws through
//! - `resources`: file loading and the named resource registry
//! - `settings`: runtime configuration
//!

pub mod camera;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod gpu;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod settings;

pub use error::{Error, ResourceKind, Result};
