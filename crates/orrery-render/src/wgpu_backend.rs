//! [`RenderBackend`] over wgpu.
//!
//! GL-style calls are validated against a [`BindingState`] as they arrive.
//! Accepted draws are kept as [`DrawSnapshot`]s and encoded into a single
//! render pass when the frame ends. Validation errors raised by wgpu itself
//! arrive through the device's uncaptured-error callback and join the same
//! error queue.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use winit::window::Window;

use crate::backend::{Capability, ClearMask, RenderBackend, ShaderService, TextureService};
use crate::buffer::{DrawUniforms, UniformRing, create_geometry_buffer};
use crate::depth::DepthBuffer;
use crate::error::ErrorCode;
use crate::gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
use crate::handle::{
    AttributeLocation, BufferHandle, BufferKind, ProgramHandle, TextureHandle, UniformLocation,
};
use crate::program::{FRAGMENT_ENTRY_POINT, SPHERE_INTERFACE, UniformValue, VERTEX_ENTRY_POINT};
use crate::shader::{ShaderError, ShaderStage, compile_wgsl_module};
use crate::state::{BindingState, DrawSnapshot};
use crate::texture::{GpuTexture, TextureError, TextureImage};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error(transparent)]
    Context(#[from] RenderContextError),
}

struct GpuProgram {
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramHandle,
    depth_test: bool,
    cull_face: bool,
}

/// Draws that differ only in buffers, texture or uniforms share a pipeline.
impl From<&DrawSnapshot> for PipelineKey {
    fn from(draw: &DrawSnapshot) -> Self {
        Self {
            program: draw.program,
            depth_test: draw.depth_test,
            cull_face: draw.cull_face,
        }
    }
}

pub struct WgpuBackend {
    context: RenderContext,
    state: BindingState,
    device_errors: Arc<Mutex<Vec<ErrorCode>>>,
    programs: HashMap<ProgramHandle, GpuProgram>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    buffers: HashMap<BufferHandle, wgpu::Buffer>,
    textures: HashMap<TextureHandle, GpuTexture>,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    uniforms: UniformRing,
    depth: DepthBuffer,
    draws: Vec<DrawSnapshot>,
}

impl WgpuBackend {
    /// Create a device and surface for `window`.
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self, BackendError> {
        let context = init_render_context_blocking(window, vsync)?;
        Ok(Self::from_context(context))
    }

    pub fn from_context(context: RenderContext) -> Self {
        let device_errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&device_errors);
        context
            .device
            .on_uncaptured_error(Arc::new(move |error: wgpu::Error| {
                log::error!("wgpu: {error}");
                sink.lock().push(ErrorCode::from(&error));
            }));

        let device = &context.device;
        let uniform_layout = UniformRing::bind_group_layout(device);
        let texture_layout = GpuTexture::bind_group_layout(device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sphere-pipeline-layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });
        let sampler = GpuTexture::create_sampler(device);
        let uniforms = UniformRing::new(device, &uniform_layout);
        let (width, height) = context.size();
        let depth = DepthBuffer::new(device, width, height);

        let mut state = BindingState::new();
        state.set_viewport(width, height);

        Self {
            context,
            state,
            device_errors,
            programs: HashMap::new(),
            pipelines: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            uniform_layout,
            texture_layout,
            pipeline_layout,
            sampler,
            uniforms,
            depth,
            draws: Vec::new(),
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    fn create_pipeline(&self, key: PipelineKey, program: &GpuProgram) -> wgpu::RenderPipeline {
        log::debug!(
            "Creating pipeline for {} (depth_test={}, cull_face={})",
            key.program,
            key.depth_test,
            key.cull_face
        );
        self.context
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("sphere-pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &program.vertex,
                    entry_point: Some(VERTEX_ENTRY_POINT),
                    buffers: &orrery_mesh::sphere_vertex_buffer_layouts(),
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: key.cull_face.then_some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(DepthBuffer::pipeline_state(key.depth_test)),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &program.fragment,
                    entry_point: Some(FRAGMENT_ENTRY_POINT),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.context.surface_format(),
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
    }

    fn ensure_pipelines(&mut self) {
        for draw in &self.draws {
            let key = PipelineKey::from(draw);
            if self.pipelines.contains_key(&key) {
                continue;
            }
            if let Some(program) = self.programs.get(&draw.program) {
                let pipeline = self.create_pipeline(key, program);
                self.pipelines.insert(key, pipeline);
            }
        }
    }

    fn encode_frame(&mut self, clear: ClearMask, target: &wgpu::TextureView) {
        self.ensure_pipelines();
        self.uniforms
            .reserve(&self.context.device, &self.uniform_layout, self.draws.len());
        for (slot, draw) in self.draws.iter().enumerate() {
            self.uniforms
                .write(&self.context.queue, slot, &DrawUniforms::from(&draw.uniforms));
        }

        let [r, g, b, a] = self.state.clear_color().map(f64::from);
        let color_load = if clear.color {
            wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a })
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if clear.depth {
            wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE)
        } else {
            wgpu::LoadOp::Load
        };

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame-encoder"),
                });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let (width, height) = self.state.viewport();
            let (surface_width, surface_height) = self.context.size();
            pass.set_viewport(
                0.0,
                0.0,
                width.clamp(1, surface_width) as f32,
                height.clamp(1, surface_height) as f32,
                0.0,
                1.0,
            );

            for (slot, draw) in self.draws.iter().enumerate() {
                let key = PipelineKey::from(draw);
                let (Some(pipeline), Some(texture), Some(index_buffer)) = (
                    self.pipelines.get(&key),
                    self.textures.get(&draw.texture),
                    self.buffers.get(&draw.index_buffer),
                ) else {
                    continue;
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, self.uniforms.bind_group(), &[self.uniforms.offset(slot)]);
                pass.set_bind_group(1, &texture.bind_group, &[]);
                for (location, buffer) in &draw.vertex_buffers {
                    if let Some(buffer) = self.buffers.get(buffer) {
                        pass.set_vertex_buffer(location.0, buffer.slice(..));
                    }
                }
                pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl ShaderService for WgpuBackend {
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, ShaderError> {
        let vertex = compile_wgsl_module(&self.context.device, ShaderStage::Vertex, vertex_source)?;
        let fragment =
            compile_wgsl_module(&self.context.device, ShaderStage::Fragment, fragment_source)?;
        let program = self.state.register_program(SPHERE_INTERFACE);
        self.programs.insert(program, GpuProgram { vertex, fragment });
        log::info!("Linked {program}");
        Ok(program)
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<AttributeLocation> {
        self.state
            .program_interface(program)?
            .attribute(name)
            .map(|a| a.location)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.state
            .program_interface(program)?
            .uniform(name)
            .map(|u| u.location)
    }
}

impl TextureService for WgpuBackend {
    fn load_texture(
        &mut self,
        label: &str,
        image: &TextureImage,
    ) -> Result<TextureHandle, TextureError> {
        let max = self.context.device.limits().max_texture_dimension_2d;
        let fitted = image.fit_within(max);
        let uploaded = GpuTexture::upload(
            &self.context.device,
            &self.context.queue,
            &self.texture_layout,
            &self.sampler,
            label,
            &fitted,
        )?;
        let (width, height) = uploaded.dimensions;
        let texture = self.state.register_texture(width, height);
        self.textures.insert(texture, uploaded);
        Ok(texture)
    }
}

impl RenderBackend for WgpuBackend {
    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.state.set_clear_color(color);
    }

    fn enable(&mut self, capability: Capability) {
        self.state.enable(capability);
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.state.set_viewport(width, height);
        self.context.resize(width, height);
        self.depth.resize(&self.context.device, width, height);
    }

    fn begin_frame(&mut self) {
        self.state.begin_frame();
        self.draws.clear();
    }

    fn clear(&mut self, mask: ClearMask) {
        self.state.clear(mask);
    }

    fn upload_buffer(&mut self, kind: BufferKind, label: &str, bytes: &[u8]) -> BufferHandle {
        let buffer = create_geometry_buffer(&self.context.device, kind, label, bytes);
        let handle = self.state.register_buffer(kind, bytes.len());
        self.buffers.insert(handle, buffer);
        log::debug!("Uploaded {label} as {handle} ({} bytes)", bytes.len());
        handle
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.state.use_program(program);
    }

    fn bind_vertex_buffer(&mut self, location: AttributeLocation, buffer: BufferHandle) {
        self.state.bind_vertex_buffer(location, buffer);
    }

    fn disable_vertex_attribute(&mut self, location: AttributeLocation) {
        self.state.disable_vertex_attribute(location);
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>) {
        self.state.bind_texture(unit, texture);
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.state.set_uniform(location, value);
    }

    fn draw_indexed_triangles(&mut self, index_buffer: BufferHandle, index_count: u32) {
        if let Some(snapshot) = self.state.prepare_draw(index_buffer, index_count) {
            self.draws.push(snapshot);
        }
    }

    fn drain_errors(&mut self) -> Vec<ErrorCode> {
        let mut errors = self.state.drain_errors();
        errors.append(&mut self.device_errors.lock());
        errors
    }

    fn end_frame(&mut self) {
        let clear = self.state.end_frame();
        let frame = match self.context.acquire_frame() {
            Ok(frame) => frame,
            Err(SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory acquiring frame");
                self.device_errors.lock().push(ErrorCode::OutOfMemory);
                self.draws.clear();
                return;
            }
            Err(e) => {
                log::warn!("Skipping frame: {e}");
                self.draws.clear();
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.encode_frame(clear, &view);
        frame.present();
        self.draws.clear();
    }
}
