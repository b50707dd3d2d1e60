//! Shader source validation and WGSL module compilation.

use log::{debug, info};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

use crate::program::{FRAGMENT_ENTRY_POINT, VERTEX_ENTRY_POINT};

/// Pipeline stage a shader source belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => VERTEX_ENTRY_POINT,
            ShaderStage::Fragment => FRAGMENT_ENTRY_POINT,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// Error types for program compilation.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("{} shader source is empty", .stage.label())]
    EmptySource { stage: ShaderStage },

    #[error("{} shader has no `{entry_point}` entry point", .stage.label())]
    MissingEntryPoint {
        stage: ShaderStage,
        entry_point: &'static str,
    },

    #[error("{} shader failed to compile: {message}", .stage.label())]
    CompilationFailed { stage: ShaderStage, message: String },
}

/// Reject sources that cannot possibly link into a program.
pub fn validate_source(stage: ShaderStage, source: &str) -> Result<(), ShaderError> {
    if source.trim().is_empty() {
        return Err(ShaderError::EmptySource { stage });
    }
    let entry_point = stage.entry_point();
    if !source.contains(&format!("fn {entry_point}")) {
        return Err(ShaderError::MissingEntryPoint { stage, entry_point });
    }
    Ok(())
}

/// Compile one WGSL stage, turning compiler diagnostics into a [`ShaderError`].
pub fn compile_wgsl_module(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    validate_source(stage, source)?;
    debug!("Compiling {} shader", stage.label());

    let module = device.create_shader_module(ShaderModuleDescriptor {
        label: Some(stage.label()),
        source: ShaderSource::Wgsl(source.into()),
    });

    let compilation = pollster::block_on(module.get_compilation_info());
    let errors: Vec<String> = compilation
        .messages
        .iter()
        .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
        .map(|m| m.message.clone())
        .collect();
    if !errors.is_empty() {
        return Err(ShaderError::CompilationFailed {
            stage,
            message: errors.join("; "),
        });
    }

    info!("Compiled {} shader", stage.label());
    Ok(module)
}
