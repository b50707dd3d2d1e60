//! Shader program interface and the bundled textured-sphere program.
//!
//! A [`ProgramInterface`] names every attribute and uniform a program reads
//! and the location it is bound at. Backends resolve
//! `attribute_location`/`uniform_location` queries against it.

use glam::Mat4;

use crate::handle::{AttributeLocation, UniformLocation};

/// Number of texture units a backend exposes.
pub const MAX_TEXTURE_UNITS: u32 = 8;

/// Type of value a uniform slot accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Mat4,
    Vec4,
    /// Texture unit index for a sampled texture.
    Sampler,
}

/// A value written to a uniform slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec4([f32; 4]),
    /// Texture unit index.
    Int(i32),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Mat4(_) => UniformKind::Mat4,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Int(_) => UniformKind::Sampler,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeBinding {
    pub name: &'static str,
    pub location: AttributeLocation,
    /// Float components per vertex.
    pub components: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformBinding {
    pub name: &'static str,
    pub location: UniformLocation,
    pub kind: UniformKind,
}

/// Attribute and uniform layout shared by a family of programs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramInterface {
    pub attributes: &'static [AttributeBinding],
    pub uniforms: &'static [UniformBinding],
}

impl ProgramInterface {
    pub fn attribute(&self, name: &str) -> Option<&AttributeBinding> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_at(&self, location: AttributeLocation) -> Option<&AttributeBinding> {
        self.attributes.iter().find(|a| a.location == location)
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformBinding> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    pub fn uniform_at(&self, location: UniformLocation) -> Option<&UniformBinding> {
        self.uniforms.iter().find(|u| u.location == location)
    }

    /// Every sampler uniform in the interface.
    pub fn samplers(&self) -> impl Iterator<Item = &UniformBinding> + '_ {
        self.uniforms
            .iter()
            .filter(|u| u.kind == UniformKind::Sampler)
    }
}

pub const POSITION_ATTRIBUTE: &str = "a_position";
pub const TEX_COORD_ATTRIBUTE: &str = "a_tex_coords";
pub const MVP_UNIFORM: &str = "u_mvp";
pub const COLOR_UNIFORM: &str = "u_color";
pub const TEXTURE_UNIT_UNIFORM: &str = "u_texture_unit";

/// Interface of [`SPHERE_VERTEX_SHADER`] + [`SPHERE_FRAGMENT_SHADER`].
///
/// Attribute locations match the vertex buffer layouts in `orrery-mesh`.
pub const SPHERE_INTERFACE: ProgramInterface = ProgramInterface {
    attributes: &[
        AttributeBinding {
            name: POSITION_ATTRIBUTE,
            location: AttributeLocation(orrery_mesh::POSITION_LOCATION),
            components: 3,
        },
        AttributeBinding {
            name: TEX_COORD_ATTRIBUTE,
            location: AttributeLocation(orrery_mesh::TEX_COORD_LOCATION),
            components: 2,
        },
    ],
    uniforms: &[
        UniformBinding {
            name: MVP_UNIFORM,
            location: UniformLocation(0),
            kind: UniformKind::Mat4,
        },
        UniformBinding {
            name: COLOR_UNIFORM,
            location: UniformLocation(1),
            kind: UniformKind::Vec4,
        },
        UniformBinding {
            name: TEXTURE_UNIT_UNIFORM,
            location: UniformLocation(2),
            kind: UniformKind::Sampler,
        },
    ],
};

/// Vertex stage: transforms positions by the MVP and forwards UVs.
pub const SPHERE_VERTEX_SHADER: &str = r#"
struct DrawUniforms {
    mvp: mat4x4<f32>,
    color: vec4<f32>,
    texture_unit: i32,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniforms;

struct VertexInput {
    @location(0) a_position: vec3<f32>,
    @location(1) a_tex_coords: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = draw.mvp * vec4<f32>(in.a_position, 1.0);
    out.uv = in.a_tex_coords;
    return out;
}
"#;

/// Fragment stage: texture sample modulated by the flat tint.
pub const SPHERE_FRAGMENT_SHADER: &str = r#"
struct DrawUniforms {
    mvp: mat4x4<f32>,
    color: vec4<f32>,
    texture_unit: i32,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniforms;

@group(1) @binding(0)
var t_diffuse: texture_2d<f32>;
@group(1) @binding(1)
var s_diffuse: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return textureSample(t_diffuse, s_diffuse, uv) * draw.color;
}
"#;

/// Entry point of the vertex stage.
pub const VERTEX_ENTRY_POINT: &str = "vs_main";
/// Entry point of the fragment stage.
pub const FRAGMENT_ENTRY_POINT: &str = "fs_main";
