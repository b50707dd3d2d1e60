//! Sphere tessellation and upload-ready geometry buffers.

pub mod geometry;
pub mod sphere;
pub mod vertex_format;

pub use geometry::{INDEX_SIZE, PositionVertex, SphereGeometry, TexCoordVertex};
pub use sphere::{
    DEFAULT_SECTOR_COUNT, DEFAULT_STACK_COUNT, MAX_VERTEX_COUNT, MeshError, SphereMesh,
    SphereParams, generate_uv_sphere,
};
pub use vertex_format::{
    POSITION_LAYOUT, POSITION_LOCATION, TEX_COORD_LAYOUT, TEX_COORD_LOCATION,
    sphere_vertex_buffer_layouts,
};
