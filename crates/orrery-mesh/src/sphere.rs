//! UV-sphere tessellation from stack (latitude) and sector (longitude) sampling.
//!
//! Stack `i` runs from the north pole (`i = 0`) to the south pole
//! (`i = stack_count`); sector `j` sweeps the full circle starting at +Z and
//! turning toward +X. Each pole is a ring of coincident vertices rather than a
//! single vertex, which keeps the index arithmetic uniform. Triangles wind
//! counter-clockwise when seen from outside the sphere.

use std::f64::consts::PI;

use glam::Vec3;

/// Default latitude band count.
pub const DEFAULT_STACK_COUNT: u32 = 26;
/// Default longitude band count.
pub const DEFAULT_SECTOR_COUNT: u32 = 26;
/// Largest vertex count addressable with 16-bit indices.
pub const MAX_VERTEX_COUNT: usize = u16::MAX as usize + 1;

/// Errors produced when sphere parameters cannot be tessellated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("stack count must be at least 1")]
    ZeroStacks,

    #[error("sector count must be at least 1")]
    ZeroSectors,

    #[error("sphere radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    /// The vertex grid does not fit 16-bit indices.
    #[error("{vertex_count} vertices exceed the 16-bit index range ({MAX_VERTEX_COUNT})")]
    IndexOverflow { vertex_count: usize },
}

/// Placement and resolution of a UV sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereParams {
    /// Center in model space.
    pub center: Vec3,
    pub radius: f32,
    pub stack_count: u32,
    pub sector_count: u32,
}

impl SphereParams {
    /// A sphere at `center` with the default 26×26 resolution.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            stack_count: DEFAULT_STACK_COUNT,
            sector_count: DEFAULT_SECTOR_COUNT,
        }
    }

    /// Override the stack and sector counts.
    pub fn with_resolution(mut self, stack_count: u32, sector_count: u32) -> Self {
        self.stack_count = stack_count;
        self.sector_count = sector_count;
        self
    }

    /// Check that the parameters can be tessellated into a 16-bit indexed mesh.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.stack_count == 0 {
            return Err(MeshError::ZeroStacks);
        }
        if self.sector_count == 0 {
            return Err(MeshError::ZeroSectors);
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(MeshError::InvalidRadius(self.radius));
        }
        let vertex_count = self.vertex_count();
        if vertex_count > MAX_VERTEX_COUNT {
            return Err(MeshError::IndexOverflow { vertex_count });
        }
        Ok(())
    }

    /// `(stacks + 1) × (sectors + 1)`, saturating at `usize::MAX`.
    pub fn vertex_count(&self) -> usize {
        let rings = (self.stack_count as usize).saturating_add(1);
        let columns = (self.sector_count as usize).saturating_add(1);
        rings.saturating_mul(columns)
    }

    /// Both pole bands contribute one triangle per sector, every inner band two.
    pub fn triangle_count(&self) -> usize {
        let stacks = self.stack_count as usize;
        let sectors = self.sector_count as usize;
        sectors
            .saturating_mul(2)
            .saturating_mul(stacks.saturating_sub(1))
    }

    pub fn index_count(&self) -> usize {
        self.triangle_count().saturating_mul(3)
    }
}

impl Default for SphereParams {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0)
    }
}

/// Tessellated sphere data, index-aligned positions and texture coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    pub positions: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u16>,
}

impl SphereMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u16; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

/// Generate a UV sphere.
///
/// Angles are evaluated in `f64` and each vertex is narrowed to `f32` once,
/// after the center offset is applied.
pub fn generate_uv_sphere(params: &SphereParams) -> Result<SphereMesh, MeshError> {
    params.validate()?;

    let stacks = params.stack_count;
    let sectors = params.sector_count;
    let radius = params.radius as f64;
    let center = params.center.as_dvec3();

    let stack_step = PI / stacks as f64;
    let sector_step = 2.0 * PI / sectors as f64;

    let vertex_count = params.vertex_count();
    let mut positions = Vec::with_capacity(vertex_count);
    let mut tex_coords = Vec::with_capacity(vertex_count);

    for i in 0..=stacks {
        let stack_angle = PI / 2.0 - i as f64 * stack_step;
        let xz = radius * stack_angle.cos();
        let y = radius * stack_angle.sin();

        for j in 0..=sectors {
            let sector_angle = j as f64 * sector_step;
            let x = xz * sector_angle.sin();
            let z = xz * sector_angle.cos();

            positions.push([
                (center.x + x) as f32,
                (center.y + y) as f32,
                (center.z + z) as f32,
            ]);
            tex_coords.push([j as f32 / sectors as f32, i as f32 / stacks as f32]);
        }
    }

    // validate() bounds every index below 2^16, so the narrowing casts are lossless.
    let mut indices = Vec::with_capacity(params.index_count());
    for i in 0..stacks {
        let mut k1 = i * (sectors + 1);
        let mut k2 = k1 + sectors + 1;
        for _ in 0..sectors {
            if i != 0 {
                indices.extend_from_slice(&[k1 as u16, k2 as u16, (k1 + 1) as u16]);
            }
            if i + 1 != stacks {
                indices.extend_from_slice(&[(k1 + 1) as u16, k2 as u16, (k2 + 1) as u16]);
            }
            k1 += 1;
            k2 += 1;
        }
    }

    Ok(SphereMesh {
        positions,
        tex_coords,
        indices,
    })
}
