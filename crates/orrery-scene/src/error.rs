use orrery_mesh::MeshError;
use orrery_render::{ProgramHandle, ShaderError, TextureError};
use thiserror::Error;

/// Errors raised while building the scene. Nothing in the per-frame path fails.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("sphere generation failed: {0}")]
    Mesh(#[from] MeshError),

    #[error("program compilation failed: {0}")]
    Shader(#[from] ShaderError),

    #[error("texture upload failed: {0}")]
    Texture(#[from] TextureError),

    #[error("{program} has no attribute `{name}`")]
    MissingAttribute {
        program: ProgramHandle,
        name: &'static str,
    },

    #[error("{program} has no uniform `{name}`")]
    MissingUniform {
        program: ProgramHandle,
        name: &'static str,
    },
}
