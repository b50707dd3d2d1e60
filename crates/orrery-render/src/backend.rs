//! Backend traits the scene renders through.
//!
//! The scene never talks to a GPU API directly. It compiles programs through a
//! [`ShaderService`], uploads textures through a [`TextureService`] and issues
//! state changes and draws through a [`RenderBackend`]. The calls follow GL
//! semantics: binding state persists until changed, and rejected calls queue an
//! [`ErrorCode`] instead of failing.

use crate::error::ErrorCode;
use crate::handle::{
    AttributeLocation, BufferHandle, BufferKind, ProgramHandle, TextureHandle, UniformLocation,
};
use crate::program::UniformValue;
use crate::shader::ShaderError;
use crate::texture::{TextureError, TextureImage};

/// Fixed-function state that can be switched on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    DepthTest,
    /// Cull back faces (counter-clockwise front faces).
    CullFace,
}

/// Which buffers a clear touches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR: ClearMask = ClearMask {
        color: true,
        depth: false,
    };
    pub const DEPTH: ClearMask = ClearMask {
        color: false,
        depth: true,
    };
    pub const ALL: ClearMask = ClearMask {
        color: true,
        depth: true,
    };

    pub fn union(self, other: ClearMask) -> ClearMask {
        ClearMask {
            color: self.color || other.color,
            depth: self.depth || other.depth,
        }
    }

    pub fn is_empty(self) -> bool {
        !self.color && !self.depth
    }
}

/// Compiles two-stage programs and answers interface queries.
pub trait ShaderService {
    /// Compile and link a program from a vertex and a fragment source.
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, ShaderError>;

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<AttributeLocation>;

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;
}

/// Uploads decoded images as sampled textures.
pub trait TextureService {
    fn load_texture(
        &mut self,
        label: &str,
        image: &TextureImage,
    ) -> Result<TextureHandle, TextureError>;
}

/// State and draw calls of a rasterizing backend.
pub trait RenderBackend {
    fn set_clear_color(&mut self, color: [f32; 4]);

    fn enable(&mut self, capability: Capability);

    /// Match the drawable area to the surface size in physical pixels.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Start recording a frame. Clears and draws outside a frame are rejected.
    fn begin_frame(&mut self);

    fn clear(&mut self, mask: ClearMask);

    /// Copy `bytes` into a new GPU buffer. The handle is valid for the
    /// lifetime of the backend.
    fn upload_buffer(&mut self, kind: BufferKind, label: &str, bytes: &[u8]) -> BufferHandle;

    /// Make `program` current, or unbind with `None`.
    fn use_program(&mut self, program: Option<ProgramHandle>);

    /// Point `location` at `buffer` and enable the attribute.
    fn bind_vertex_buffer(&mut self, location: AttributeLocation, buffer: BufferHandle);

    fn disable_vertex_attribute(&mut self, location: AttributeLocation);

    /// Bind `texture` to a texture unit, or unbind with `None`.
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>);

    /// Write a uniform of the current program.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Draw `index_count` 16-bit indices from `index_buffer` as a triangle list.
    fn draw_indexed_triangles(&mut self, index_buffer: BufferHandle, index_count: u32);

    /// Take every error queued since the last drain, oldest first.
    fn drain_errors(&mut self) -> Vec<ErrorCode>;

    /// Finish the frame and present it.
    fn end_frame(&mut self);
}
