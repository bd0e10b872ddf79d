//! A static mesh: uploaded buffers, a model transform and the name of the
//! material it is drawn with.

use std::path::Path;

use cgmath::SquareMatrix;

use crate::{
    error::Result,
    render::{BindingContext, GpuDevice, Transforms},
    resources::{mesh::load_obj, registry::Registry},
};

/// Material a freshly loaded mesh is drawn with until told otherwise.
pub const DEFAULT_MATERIAL: &str = "default_material";

pub struct Mesh<D: GpuDevice> {
    pub name: String,
    /// Looked up in the registry on every draw; never owned by the mesh.
    pub material_name: String,
    pub transform: cgmath::Matrix4<f32>,
    buffers: D::Buffers,
    index_count: u32,
    vertex_count: usize,
}

impl<D: GpuDevice> Mesh<D> {
    /// Parses the OBJ file at `path` and uploads its buffers.
    pub fn load(device: &mut D, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = load_obj(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        log::info!(
            "Loaded mesh '{}' ({} vertices, {} triangles) from {}.",
            name,
            data.vertices.len(),
            data.triangle_count(),
            path.display()
        );
        Ok(Self {
            buffers: device.create_buffers(&name, &data),
            index_count: data.index_count(),
            vertex_count: data.vertices.len(),
            material_name: DEFAULT_MATERIAL.to_string(),
            transform: cgmath::Matrix4::identity(),
            name,
        })
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn buffers(&self) -> &D::Buffers {
        &self.buffers
    }

    pub(crate) fn into_buffers(self) -> D::Buffers {
        self.buffers
    }
}

impl<B: BindingContext> Mesh<B> {
    /// Binds the mesh's material with its transforms and issues the indexed draw.
    ///
    /// An unknown material surfaces as
    /// [`Error::NotFound`](crate::error::Error::NotFound); nothing is bound then.
    pub fn draw(
        &self,
        registry: &Registry<B>,
        view: cgmath::Matrix4<f32>,
        projection: cgmath::Matrix4<f32>,
        pass: &mut B,
    ) -> Result<()> {
        let material = registry.get_material(&self.material_name)?;
        let transforms = Transforms {
            model: self.transform,
            view,
            projection,
        };
        material.bind(registry, pass, &transforms)?;
        pass.draw_indexed(&self.buffers, self.index_count);
        Ok(())
    }
}
