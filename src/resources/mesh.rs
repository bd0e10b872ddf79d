use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use cgmath::{InnerSpace, Vector3, Zero};

use crate::{
    data_structures::model::{MeshData, ModelVertex},
    error::{Error, Result},
    resources::load_string,
};

/// Parses a Wavefront OBJ file into one triangulated mesh.
///
/// All objects and groups in the file are merged. Material libraries are
/// ignored since materials are assigned through the registry.
pub fn load_obj(path: &Path) -> Result<MeshData> {
    let obj_text = load_string(path)?;
    parse_obj(&obj_text).map_err(|e| Error::asset_load(path, e))
}

pub fn parse_obj(obj_text: &str) -> std::result::Result<MeshData, String> {
    let mut obj_reader = BufReader::new(Cursor::new(obj_text));
    let (models, _) = tobj::load_obj_buf(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Ok(Default::default()),
    )
    .map_err(|e| e.to_string())?;

    let mut data = MeshData::default();
    let mut has_normals = true;
    for m in &models {
        let mesh = &m.mesh;
        if mesh.positions.len() % 3 != 0 {
            return Err(format!("object '{}' has a truncated position list", m.name));
        }
        let vertex_count = mesh.positions.len() / 3;
        has_normals &= mesh.normals.len() == mesh.positions.len();

        let base = data.vertices.len() as u32;
        data.vertices.extend((0..vertex_count).map(|i| ModelVertex {
            position: [
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            ],
            // OBJ puts the texture origin bottom-left, wgpu top-left
            tex_coords: [
                mesh.texcoords.get(i * 2).map_or(0.0, |f| *f),
                1.0 - mesh.texcoords.get(i * 2 + 1).map_or(0.0, |f| *f),
            ],
            normal: [
                mesh.normals.get(i * 3).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                mesh.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
            ],
        }));
        data.indices.extend(mesh.indices.iter().map(|i| i + base));
    }

    if data.indices.is_empty() {
        return Err("file contains no faces".to_string());
    }
    if data.indices.len() % 3 != 0 {
        return Err("face list is not triangulated".to_string());
    }
    if let Some(bad) = data.out_of_range_index() {
        return Err(format!(
            "a face references vertex {} but only {} vertices exist",
            bad + 1,
            data.vertices.len()
        ));
    }
    if !has_normals {
        compute_normals(&mut data);
    }
    Ok(data)
}

/// Replaces vertex normals with the area-weighted average of adjacent face normals.
pub fn compute_normals(data: &mut MeshData) {
    let mut sums = vec![Vector3::<f32>::zero(); data.vertices.len()];
    for c in data.indices.chunks(3) {
        let pos0: Vector3<f32> = data.vertices[c[0] as usize].position.into();
        let pos1: Vector3<f32> = data.vertices[c[1] as usize].position.into();
        let pos2: Vector3<f32> = data.vertices[c[2] as usize].position.into();
        // Unnormalized, so larger faces weigh more
        let face_normal = (pos1 - pos0).cross(pos2 - pos0);
        for &i in c {
            sums[i as usize] += face_normal;
        }
    }
    for (v, sum) in data.vertices.iter_mut().zip(sums) {
        v.normal = if sum.magnitude2() > f32::EPSILON {
            sum.normalize().into()
        } else {
            [0.0, 1.0, 0.0]
        };
    }
}
