//! The scene: an ordered list of meshes drawn front to back in insertion order.
//!
//! Depth testing resolves visibility, so no sorting happens here.

use std::path::Path;

use crate::{
    camera::Camera,
    data_structures::mesh::Mesh,
    error::Result,
    render::{BindingContext, FrameStats, GpuDevice},
    resources::registry::Registry,
};

pub struct Scene<D: GpuDevice> {
    meshes: Vec<Mesh<D>>,
}

impl<D: GpuDevice> Default for Scene<D> {
    fn default() -> Self {
        Self { meshes: Vec::new() }
    }
}

impl<D: GpuDevice> Scene<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a mesh and appends it. The returned reference lets the caller
    /// assign `material_name` before the first draw.
    pub fn load_mesh(&mut self, device: &mut D, path: impl AsRef<Path>) -> Result<&mut Mesh<D>> {
        let mesh = Mesh::load(device, path)?;
        Ok(self.add_mesh(mesh))
    }

    pub fn add_mesh(&mut self, mesh: Mesh<D>) -> &mut Mesh<D> {
        self.meshes.push(mesh);
        let last = self.meshes.len() - 1;
        &mut self.meshes[last]
    }

    pub fn meshes(&self) -> &[Mesh<D>] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh<D>] {
        &mut self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Releases mesh buffers, last loaded first.
    pub fn release_all(&mut self, device: &mut D) {
        while let Some(mesh) = self.meshes.pop() {
            device.release_buffers(mesh.into_buffers());
        }
    }
}

impl<B: BindingContext> Scene<B> {
    /// Draws every mesh with the camera's current view and projection.
    ///
    /// A mesh whose material, shader or texture cannot be resolved is skipped
    /// for this frame only. Any other error aborts the frame.
    pub fn draw(
        &self,
        registry: &Registry<B>,
        camera: &Camera,
        pass: &mut B,
    ) -> Result<FrameStats> {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        let mut stats = FrameStats::default();
        for mesh in &self.meshes {
            match mesh.draw(registry, view, projection, pass) {
                Ok(()) => stats.submitted += 1,
                Err(e) if e.is_recoverable() => {
                    log::warn!("Skipping mesh '{}': {}", mesh.name, e);
                    stats.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(stats)
    }
}
