//! Headless backend that records every call.
//!
//! [`RecordingBackend`] runs the same validation as the wgpu backend but keeps
//! the calls and the accepted draws in memory instead of touching a GPU. Scene
//! tests and dry runs render through it.

use crate::backend::{Capability, ClearMask, RenderBackend, ShaderService, TextureService};
use crate::error::ErrorCode;
use crate::handle::{
    AttributeLocation, BufferHandle, BufferKind, ProgramHandle, TextureHandle, UniformLocation,
};
use crate::program::{SPHERE_INTERFACE, UniformValue};
use crate::shader::{ShaderError, ShaderStage, validate_source};
use crate::state::{BindingState, DrawSnapshot};
use crate::texture::{TextureError, TextureImage};

/// One call made on a [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum BackendCall {
    CompileProgram(ProgramHandle),
    LoadTexture {
        label: String,
        texture: TextureHandle,
    },
    SetClearColor([f32; 4]),
    Enable(Capability),
    SetViewport {
        width: u32,
        height: u32,
    },
    BeginFrame,
    Clear(ClearMask),
    UploadBuffer {
        kind: BufferKind,
        label: String,
        buffer: BufferHandle,
        byte_len: usize,
    },
    UseProgram(Option<ProgramHandle>),
    BindVertexBuffer(AttributeLocation, BufferHandle),
    DisableVertexAttribute(AttributeLocation),
    BindTexture(u32, Option<TextureHandle>),
    SetUniform(UniformLocation, UniformValue),
    DrawIndexedTriangles {
        index_buffer: BufferHandle,
        index_count: u32,
    },
    EndFrame,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    state: BindingState,
    calls: Vec<BackendCall>,
    draws: Vec<DrawSnapshot>,
    buffers: Vec<(BufferHandle, Vec<u8>)>,
    frames: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Draws that passed validation, oldest first.
    pub fn draws(&self) -> &[DrawSnapshot] {
        &self.draws
    }

    /// Bytes uploaded for `buffer`.
    pub fn buffer_bytes(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers
            .iter()
            .find(|(handle, _)| *handle == buffer)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Number of completed frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn state(&self) -> &BindingState {
        &self.state
    }

    /// Forget recorded calls and draws, keeping resources and binding state.
    pub fn clear_log(&mut self) {
        self.calls.clear();
        self.draws.clear();
    }
}

impl ShaderService for RecordingBackend {
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, ShaderError> {
        validate_source(ShaderStage::Vertex, vertex_source)?;
        validate_source(ShaderStage::Fragment, fragment_source)?;
        let program = self.state.register_program(SPHERE_INTERFACE);
        self.calls.push(BackendCall::CompileProgram(program));
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

impl TextureService for RecordingBackend {
    fn load_texture(
        &mut self,
        label: &str,
        image: &TextureImage,
    ) -> Result<TextureHandle, TextureError> {
        let (width, height) = image.dimensions();
        let texture = self.state.register_texture(width, height);
        self.calls.push(BackendCall::LoadTexture {
            label: label.to_string(),
            texture,
        });
        Ok(texture)
    }
}

impl RenderBackend for RecordingBackend {
    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.state.set_clear_color(color);
        self.calls.push(BackendCall::SetClearColor(color));
    }

    fn enable(&mut self, capability: Capability) {
        self.state.enable(capability);
        self.calls.push(BackendCall::Enable(capability));
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.state.set_viewport(width, height);
        self.calls.push(BackendCall::SetViewport { width, height });
    }

    fn begin_frame(&mut self) {
        self.state.begin_frame();
        self.calls.push(BackendCall::BeginFrame);
    }

    fn clear(&mut self, mask: ClearMask) {
        self.state.clear(mask);
        self.calls.push(BackendCall::Clear(mask));
    }

    fn upload_buffer(&mut self, kind: BufferKind, label: &str, bytes: &[u8]) -> BufferHandle {
        let buffer = self.state.register_buffer(kind, bytes.len());
        self.buffers.push((buffer, bytes.to_vec()));
        self.calls.push(BackendCall::UploadBuffer {
            kind,
            label: label.to_string(),
            buffer,
            byte_len: bytes.len(),
        });
        buffer
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.state.use_program(program);
        self.calls.push(BackendCall::UseProgram(program));
    }

    fn bind_vertex_buffer(&mut self, location: AttributeLocation, buffer: BufferHandle) {
        self.state.bind_vertex_buffer(location, buffer);
        self.calls.push(BackendCall::BindVertexBuffer(location, buffer));
    }

    fn disable_vertex_attribute(&mut self, location: AttributeLocation) {
        self.state.disable_vertex_attribute(location);
        self.calls.push(BackendCall::DisableVertexAttribute(location));
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>) {
        self.state.bind_texture(unit, texture);
        self.calls.push(BackendCall::BindTexture(unit, texture));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.state.set_uniform(location, value);
        self.calls.push(BackendCall::SetUniform(location, value));
    }

    fn draw_indexed_triangles(&mut self, index_buffer: BufferHandle, index_count: u32) {
        if let Some(snapshot) = self.state.prepare_draw(index_buffer, index_count) {
            self.draws.push(snapshot);
        }
        self.calls.push(BackendCall::DrawIndexedTriangles {
            index_buffer,
            index_count,
        });
    }

    fn drain_errors(&mut self) -> Vec<ErrorCode> {
        self.state.drain_errors()
    }

    fn end_frame(&mut self) {
        self.state.end_frame();
        self.frames += 1;
        self.calls.push(BackendCall::EndFrame);
    }
}
