//! Rendering backends: GL-style state and draw calls over wgpu, plus a
//! recording backend for headless runs and tests.

pub mod backend;
pub mod buffer;
pub mod camera;
pub mod depth;
pub mod error;
pub mod gpu;
pub mod handle;
pub mod program;
pub mod recording;
pub mod shader;
pub mod state;
pub mod texture;
pub mod wgpu_backend;

pub use backend::{Capability, ClearMask, RenderBackend, ShaderService, TextureService};
pub use buffer::{DrawUniforms, UniformRing, create_geometry_buffer};
pub use camera::Camera;
pub use depth::DepthBuffer;
pub use error::{ErrorCode, report_backend_errors};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use handle::{
    AttributeLocation, BufferHandle, BufferKind, ProgramHandle, TextureHandle, UniformLocation,
};
pub use program::{
    COLOR_UNIFORM, MAX_TEXTURE_UNITS, MVP_UNIFORM, POSITION_ATTRIBUTE, ProgramInterface,
    SPHERE_FRAGMENT_SHADER, SPHERE_INTERFACE, SPHERE_VERTEX_SHADER, TEX_COORD_ATTRIBUTE,
    TEXTURE_UNIT_UNIFORM, UniformKind, UniformValue,
};
pub use recording::{BackendCall, RecordingBackend};
pub use shader::{ShaderError, ShaderStage};
pub use state::{BindingState, DrawSnapshot, ProgramUniforms};
pub use texture::{GpuTexture, TextureError, TextureImage};
pub use wgpu_backend::{BackendError, WgpuBackend};
