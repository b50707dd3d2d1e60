//! Sphere geometry packed for direct GPU upload.
//!
//! [`SphereGeometry`] owns the tessellated data as `Pod` element arrays, so
//! the upload bytes are a zero-copy view in native byte order. Element order is
//! exactly the generator's order.

use bytemuck::{Pod, Zeroable};

use crate::sphere::{MeshError, SphereMesh, SphereParams, generate_uv_sphere};

/// One entry of the position stream (12 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PositionVertex {
    pub position: [f32; 3],
}

/// One entry of the texture coordinate stream (8 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TexCoordVertex {
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(PositionVertex, [u8; 12]);
static_assertions::assert_eq_size!(TexCoordVertex, [u8; 8]);

/// Size of one index in bytes (16-bit indices).
pub const INDEX_SIZE: usize = std::mem::size_of::<u16>();

/// Immutable, upload-ready sphere buffers.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereGeometry {
    positions: Vec<PositionVertex>,
    tex_coords: Vec<TexCoordVertex>,
    indices: Vec<u16>,
}

impl SphereGeometry {
    /// Tessellate and pack a sphere in one step.
    pub fn from_params(params: &SphereParams) -> Result<Self, MeshError> {
        generate_uv_sphere(params).map(Self::from)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn positions(&self) -> &[PositionVertex] {
        &self.positions
    }

    pub fn tex_coords(&self) -> &[TexCoordVertex] {
        &self.tex_coords
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Position stream bytes: `vertex_count × 12`.
    pub fn positions_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Texture coordinate stream bytes: `vertex_count × 8`.
    pub fn tex_coords_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.tex_coords)
    }

    /// Index bytes: `index_count × 2`.
    pub fn indices_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl From<SphereMesh> for SphereGeometry {
    fn from(mesh: SphereMesh) -> Self {
        Self {
            positions: mesh
                .positions
                .into_iter()
                .map(|position| PositionVertex { position })
                .collect(),
            tex_coords: mesh
                .tex_coords
                .into_iter()
                .map(|uv| TexCoordVertex { uv })
                .collect(),
            indices: mesh.indices,
        }
    }
}
