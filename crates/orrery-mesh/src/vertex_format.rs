//! Canonical `wgpu::VertexBufferLayout`s for sphere geometry.
//!
//! Positions and texture coordinates live in two separate, tightly packed
//! vertex buffers, one attribute each.
//!
//! | Buffer | Location | Stride | Format    | Field    |
//! |--------|----------|--------|-----------|----------|
//! | 0      | 0        | 12     | Float32x3 | position |
//! | 1      | 1        | 8      | Float32x2 | uv       |

use std::mem;

use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use crate::geometry::{PositionVertex, TexCoordVertex};

/// Shader location of the position attribute.
pub const POSITION_LOCATION: u32 = 0;
/// Shader location of the texture coordinate attribute.
pub const TEX_COORD_LOCATION: u32 = 1;

pub const POSITION_ATTRIBUTES: [VertexAttribute; 1] = [VertexAttribute {
    format: VertexFormat::Float32x3,
    offset: 0,
    shader_location: POSITION_LOCATION,
}];

pub const TEX_COORD_ATTRIBUTES: [VertexAttribute; 1] = [VertexAttribute {
    format: VertexFormat::Float32x2,
    offset: 0,
    shader_location: TEX_COORD_LOCATION,
}];

/// Layout of the position stream.
pub const POSITION_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<PositionVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &POSITION_ATTRIBUTES,
};

/// Layout of the texture coordinate stream.
pub const TEX_COORD_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<TexCoordVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &TEX_COORD_ATTRIBUTES,
};

/// Both sphere vertex streams, in vertex buffer slot order.
pub fn sphere_vertex_buffer_layouts() -> [VertexBufferLayout<'static>; 2] {
    [POSITION_LAYOUT, TEX_COORD_LAYOUT]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides_match_element_sizes() {
        assert_eq!(POSITION_LAYOUT.array_stride, 12);
        assert_eq!(TEX_COORD_LAYOUT.array_stride, 8);
    }

    #[test]
    fn test_layouts_use_distinct_locations() {
        let [positions, tex_coords] = sphere_vertex_buffer_layouts();
        assert_eq!(positions.attributes[0].shader_location, POSITION_LOCATION);
        assert_eq!(tex_coords.attributes[0].shader_location, TEX_COORD_LOCATION);
        assert_ne!(POSITION_LOCATION, TEX_COORD_LOCATION);
    }

    #[test]
    fn test_formats() {
        assert_eq!(POSITION_ATTRIBUTES[0].format, VertexFormat::Float32x3);
        assert_eq!(TEX_COORD_ATTRIBUTES[0].format, VertexFormat::Float32x2);
        assert_eq!(POSITION_ATTRIBUTES[0].format.size(), POSITION_LAYOUT.array_stride);
        assert_eq!(TEX_COORD_ATTRIBUTES[0].format.size(), TEX_COORD_LAYOUT.array_stride);
    }
}
