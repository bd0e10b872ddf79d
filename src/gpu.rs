//! The wgpu backend.
//!
//! [`Gpu`] owns the surface, device and queue and implements both GPU traits.
//! Binding calls made while the scene draws are recorded into a draw list;
//! [`BindingContext::present`] uploads one transform block per draw into a
//! dynamic uniform buffer and replays the list into a single render pass.

use std::{collections::HashSet, iter, sync::Arc};

use anyhow::Context as _;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    data_structures::{
        model::MeshData,
        texture::{GpuTexture, create_render_target},
    },
    error::{Error, Result},
    pipelines::basic::{self, TransformUniform},
    render::{BindingContext, GpuDevice, Transforms, UniformValue},
    resources::shader::ShaderSource,
    settings::Settings,
};

/// Maps OpenGL clip space (`z` in `-1..1`) to wgpu's (`z` in `0..1`).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Vertex and index buffers of one uploaded mesh.
#[derive(Clone, Debug)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
}

struct DrawCommand {
    pipeline: wgpu::RenderPipeline,
    texture: wgpu::BindGroup,
    transforms: TransformUniform,
    mesh: GpuMesh,
    index_count: u32,
}

struct UniformArena {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
    stride: u64,
}

impl UniformArena {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: usize,
        stride: u64,
    ) -> Self {
        let capacity = capacity.max(1);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Transform Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<TransformUniform>() as u64),
                }),
            }],
            label: Some("transform_bind_group"),
        });
        Self {
            buffer,
            bind_group,
            capacity,
            stride,
        }
    }
}

#[derive(Debug)]
pub struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub clear_colour: wgpu::Color,
    sample_count: u32,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    transform_layout: wgpu::BindGroupLayout,
    diffuse_layout: wgpu::BindGroupLayout,
    fallback_texture: GpuTexture,
    uniforms: UniformArena,
    ignored_bindings: IgnoredBindings,
    // Binding state of the frame being recorded
    program: Option<wgpu::RenderPipeline>,
    texture: Option<wgpu::BindGroup>,
    transforms: TransformUniform,
    draws: Vec<DrawCommand>,
}

impl std::fmt::Debug for UniformArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniformArena")
            .field("capacity", &self.capacity)
            .field("stride", &self.stride)
            .finish()
    }
}

impl std::fmt::Debug for DrawCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawCommand")
            .field("index_count", &self.index_count)
            .finish()
    }
}

impl Gpu {
    pub async fn new(window: Arc<Window>, settings: &Settings) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::debug!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable graphics adapter")?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await
            .context("could not open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders output linear colour and rely on an sRGB surface
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no texture formats")?;
        let present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = supported_sample_count(settings.msaa_samples, |count| {
            [surface_format, GpuTexture::DEPTH_FORMAT].iter().all(|format| {
                adapter
                    .get_texture_format_features(*format)
                    .flags
                    .sample_count_supported(count)
            })
        });
        let transform_layout = basic::transform_layout(&device);
        let diffuse_layout = basic::diffuse_layout(&device);
        let fallback_texture = GpuTexture::white(&device, &queue, &diffuse_layout);
        let stride = uniform_stride(&device);
        let uniforms = UniformArena::new(&device, &transform_layout, 16, stride);

        let (depth_view, msaa_view) = create_targets(&device, &config, sample_count);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            clear_colour: settings.clear_colour,
            sample_count,
            depth_view,
            msaa_view,
            transform_layout,
            diffuse_layout,
            fallback_texture,
            uniforms,
            ignored_bindings: IgnoredBindings::default(),
            program: None,
            texture: None,
            transforms: TransformUniform::default(),
            draws: Vec::new(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn create_shader_module(
        &self,
        label: &str,
        stage: &str,
        source: &str,
    ) -> Result<wgpu::ShaderModule> {
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} {stage}")),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        let info = futures::executor::block_on(module.get_compilation_info());
        let errors: Vec<String> = info
            .messages
            .iter()
            .filter(|m| matches!(m.message_type, wgpu::CompilationMessageType::Error))
            .map(|m| match &m.location {
                Some(loc) => format!(
                    "{stage} {}:{}: {}",
                    loc.line_number, loc.line_position, m.message
                ),
                None => format!("{stage}: {}", m.message),
            })
            .collect();
        if errors.is_empty() {
            Ok(module)
        } else {
            Err(Error::ShaderCompile {
                name: label.to_string(),
                reason: errors.join("; "),
            })
        }
    }

    fn ensure_uniform_capacity(&mut self, draws: usize) {
        if draws <= self.uniforms.capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        log::debug!("Growing transform buffer to {} slots.", capacity);
        self.uniforms = UniformArena::new(
            &self.device,
            &self.transform_layout,
            capacity,
            self.uniforms.stride,
        );
    }
}

/// Picks the MSAA sample count to render with.
///
/// Falls back to 1 when `supported` rejects the requested count.
pub fn supported_sample_count(requested: u32, supported: impl Fn(u32) -> bool) -> u32 {
    let requested = requested.max(1);
    if requested == 1 || supported(requested) {
        return requested;
    }
    log::warn!(
        "{}x multisampling is not supported by this adapter, rendering without MSAA.",
        requested
    );
    1
}

/// Uniform and texture-unit names the default pipeline has no slot for.
/// Each one is reported once.
#[derive(Debug, Default)]
struct IgnoredBindings {
    seen: HashSet<String>,
}

impl IgnoredBindings {
    fn first_time(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string())
    }
}

fn uniform_stride(device: &wgpu::Device) -> u64 {
    let align = device.limits().min_uniform_buffer_offset_alignment as u64;
    let size = std::mem::size_of::<TransformUniform>() as u64;
    size.div_ceil(align) * align
}

fn create_targets(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    sample_count: u32,
) -> (wgpu::TextureView, Option<wgpu::TextureView>) {
    let size = [config.width, config.height];
    let depth = create_render_target(
        device,
        size,
        GpuTexture::DEPTH_FORMAT,
        sample_count,
        "depth_texture",
    );
    let msaa = (sample_count > 1).then(|| {
        create_render_target(device, size, config.format, sample_count, "msaa_colour_texture")
    });
    (depth, msaa)
}

impl GpuDevice for Gpu {
    type Texture = GpuTexture;
    type Program = wgpu::RenderPipeline;
    type Buffers = GpuMesh;

    fn create_texture(&mut self, label: &str, image: &image::RgbaImage) -> GpuTexture {
        GpuTexture::from_image(&self.device, &self.queue, &self.diffuse_layout, image, label)
    }

    fn compile_program(
        &mut self,
        label: &str,
        source: &ShaderSource,
    ) -> Result<wgpu::RenderPipeline> {
        let vertex = self.create_shader_module(label, "vertex", &source.vertex)?;
        let fragment = self.create_shader_module(label, "fragment", &source.fragment)?;
        Ok(basic::mk_basic_pipeline(
            &self.device,
            self.config.format,
            self.sample_count,
            &self.transform_layout,
            &self.diffuse_layout,
            &vertex,
            &fragment,
            label,
        ))
    }

    fn create_buffers(&mut self, label: &str, data: &MeshData) -> GpuMesh {
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", label)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        GpuMesh {
            vertex_buffer,
            index_buffer,
        }
    }

    fn release_texture(&mut self, texture: GpuTexture) {
        texture.texture.destroy();
    }

    fn release_buffers(&mut self, buffers: GpuMesh) {
        buffers.vertex_buffer.destroy();
        buffers.index_buffer.destroy();
    }
}

impl BindingContext for Gpu {
    fn begin_frame(&mut self) {
        self.draws.clear();
        self.program = None;
        self.texture = None;
        self.transforms = TransformUniform::default();
    }

    fn use_program(&mut self, program: &wgpu::RenderPipeline) {
        self.program = Some(program.clone());
        self.texture = None;
    }

    fn bind_texture(&mut self, uniform: &str, slot: u32, texture: &GpuTexture) {
        if slot == 0 {
            self.texture = Some(texture.bind_group.clone());
        } else if self.ignored_bindings.first_time(uniform) {
            log::warn!(
                "Texture uniform '{}' uses unit {}, the default pipeline only samples unit 0.",
                uniform,
                slot
            );
        }
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        match (name, value) {
            (Transforms::MODEL, UniformValue::Mat4(m)) => self.transforms.model = m,
            (Transforms::VIEW, UniformValue::Mat4(m)) => self.transforms.view = m,
            (Transforms::PROJECTION, UniformValue::Mat4(m)) => {
                let projection = OPENGL_TO_WGPU_MATRIX * cgmath::Matrix4::from(m);
                self.transforms.projection = projection.into();
            }
            _ => {
                if self.ignored_bindings.first_time(name) {
                    log::warn!("Uniform '{}' has no slot in the default pipeline.", name);
                }
            }
        }
    }

    fn draw_indexed(&mut self, buffers: &GpuMesh, index_count: u32) {
        let Some(pipeline) = self.program.clone() else {
            log::warn!("Draw call issued without an active program, ignoring it.");
            return;
        };
        let texture = self
            .texture
            .clone()
            .unwrap_or_else(|| self.fallback_texture.bind_group.clone());
        self.draws.push(DrawCommand {
            pipeline,
            texture,
            transforms: self.transforms,
            mesh: buffers.clone(),
            index_count,
        });
    }

    fn present(&mut self) -> anyhow::Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            // Reconfigure the surface if it's lost or outdated and skip this frame
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.window.inner_size();
                self.resize(size.width, size.height);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timed out, skipping frame.");
                return Ok(());
            }
            Err(e) => return Err(e).context("unable to acquire the next frame"),
        };
        let frame_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let draws = std::mem::take(&mut self.draws);
        self.ensure_uniform_capacity(draws.len());
        let stride = self.uniforms.stride as usize;
        let mut staging = vec![0u8; stride * draws.len().max(1)];
        for (i, draw) in draws.iter().enumerate() {
            let bytes = bytemuck::bytes_of(&draw.transforms);
            staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        self.queue.write_buffer(&self.uniforms.buffer, 0, &staging);

        let (view, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&frame_view)),
            None => (&frame_view, None),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for (i, draw) in draws.iter().enumerate() {
                let offset = (i * stride) as wgpu::DynamicOffset;
                render_pass.set_pipeline(&draw.pipeline);
                render_pass.set_bind_group(0, &self.uniforms.bind_group, &[offset]);
                render_pass.set_bind_group(1, &draw.texture, &[]);
                render_pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.queue.submit(iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        let (depth_view, msaa_view) = create_targets(&self.device, &self.config, self.sample_count);
        self.depth_view = depth_view;
        self.msaa_view = msaa_view;
    }
}
