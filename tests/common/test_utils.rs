#![allow(dead_code)]

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use dorm_viewer::{
    data_structures::model::MeshData,
    error::{Error, Result},
    render::{BindingContext, GpuDevice, UniformValue},
    resources::shader::ShaderSource,
};

/// Everything the recording GPU was asked to do, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateTexture { id: u32, label: String },
    CompileProgram { id: u32, label: String },
    CreateBuffers { id: u32, label: String, indices: u32 },
    ReleaseTexture(u32),
    ReleaseProgram(u32),
    ReleaseBuffers(u32),
    BeginFrame,
    UseProgram(u32),
    BindTexture { uniform: String, slot: u32, texture: u32 },
    SetUniform { name: String, value: UniformValue },
    DrawIndexed { buffers: u32, index_count: u32 },
    Present,
    Resize(u32, u32),
}

#[derive(Debug, PartialEq)]
pub struct MockHandle {
    pub id: u32,
    pub label: String,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// A GPU that records calls instead of rendering.
///
/// The call log is shared, so it stays readable after the owning context is dropped.
#[derive(Default)]
pub struct MockGpu {
    pub calls: CallLog,
    pub fail_compile: bool,
    next_id: u32,
}

impl MockGpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> CallLog {
        self.calls.clone()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn handle(&mut self, label: &str) -> MockHandle {
        self.next_id += 1;
        MockHandle {
            id: self.next_id,
            label: label.to_string(),
        }
    }
}

impl GpuDevice for MockGpu {
    type Texture = MockHandle;
    type Program = MockHandle;
    type Buffers = MockHandle;

    fn create_texture(&mut self, label: &str, _image: &image::RgbaImage) -> MockHandle {
        let handle = self.handle(label);
        self.record(Call::CreateTexture {
            id: handle.id,
            label: label.to_string(),
        });
        handle
    }

    fn compile_program(&mut self, label: &str, _source: &ShaderSource) -> Result<MockHandle> {
        if self.fail_compile {
            return Err(Error::ShaderCompile {
                name: label.to_string(),
                reason: "rejected by mock".to_string(),
            });
        }
        let handle = self.handle(label);
        self.record(Call::CompileProgram {
            id: handle.id,
            label: label.to_string(),
        });
        Ok(handle)
    }

    fn create_buffers(&mut self, label: &str, data: &MeshData) -> MockHandle {
        let handle = self.handle(label);
        self.record(Call::CreateBuffers {
            id: handle.id,
            label: label.to_string(),
            indices: data.index_count(),
        });
        handle
    }

    fn release_texture(&mut self, texture: MockHandle) {
        self.record(Call::ReleaseTexture(texture.id));
    }

    fn release_program(&mut self, program: MockHandle) {
        self.record(Call::ReleaseProgram(program.id));
    }

    fn release_buffers(&mut self, buffers: MockHandle) {
        self.record(Call::ReleaseBuffers(buffers.id));
    }
}

impl BindingContext for MockGpu {
    fn begin_frame(&mut self) {
        self.record(Call::BeginFrame);
    }

    fn use_program(&mut self, program: &MockHandle) {
        self.record(Call::UseProgram(program.id));
    }

    fn bind_texture(&mut self, uniform: &str, slot: u32, texture: &MockHandle) {
        self.record(Call::BindTexture {
            uniform: uniform.to_string(),
            slot,
            texture: texture.id,
        });
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.record(Call::SetUniform {
            name: name.to_string(),
            value,
        });
    }

    fn draw_indexed(&mut self, buffers: &MockHandle, index_count: u32) {
        self.record(Call::DrawIndexed {
            buffers: buffers.id,
            index_count,
        });
    }

    fn present(&mut self) -> anyhow::Result<()> {
        self.record(Call::Present);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.record(Call::Resize(width, height));
    }
}

pub fn count(log: &CallLog, pred: impl Fn(&Call) -> bool) -> usize {
    log.borrow().iter().filter(|c| pred(c)).count()
}

pub fn draws(log: &CallLog) -> Vec<(u32, u32)> {
    log.borrow()
        .iter()
        .filter_map(|c| match c {
            Call::DrawIndexed {
                buffers,
                index_count,
            } => Some((*buffers, *index_count)),
            _ => None,
        })
        .collect()
}

pub fn id_of_texture(log: &CallLog, name: &str) -> Option<u32> {
    log.borrow().iter().rev().find_map(|c| match c {
        Call::CreateTexture { id, label } if label == name => Some(*id),
        _ => None,
    })
}

pub fn id_of_program(log: &CallLog, name: &str) -> Option<u32> {
    log.borrow().iter().rev().find_map(|c| match c {
        Call::CompileProgram { id, label } if label == name => Some(*id),
        _ => None,
    })
}

pub const EPSILON: f32 = 1e-5;

pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON
}

pub const TRIANGLE_OBJ: &str = "\
o triangle
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";

pub const QUAD_OBJ_NO_NORMALS: &str = "\
v -1.0 0.0 -1.0
v 1.0 0.0 -1.0
v 1.0 0.0 1.0
v -1.0 0.0 1.0
f 4 3 2 1
";

pub const VERTEX_WGSL: &str = "\
@vertex
fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }
";
pub const FRAGMENT_WGSL: &str = "\
@fragment
fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }
";

/// A fresh fixture directory under cargo's per-target tmp dir.
pub fn fixture_dir(test_name: &str) -> PathBuf {
    let dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join(test_name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("fixture dir");
    dir
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("fixture write");
    path
}

pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbaImage::from_pixel(width, height, image::Rgba([200, 120, 40, 255]))
        .save(&path)
        .expect("fixture png");
    path
}

/// Writes both shader stages and returns their paths.
pub fn write_shaders(dir: &Path) -> (PathBuf, PathBuf) {
    (
        write_file(dir, "test.vert.wgsl", VERTEX_WGSL),
        write_file(dir, "test.frag.wgsl", FRAGMENT_WGSL),
    )
}
