//! Render pipelines for the wgpu backend.
//!
//! - `basic` is the single depth-tested, textured pipeline every compiled
//!   shader program is built into

pub mod basic;
