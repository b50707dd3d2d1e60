//! A textured sphere placed in the scene.

use glam::{Mat4, Vec3};
use log::debug;
use orrery_mesh::{SphereGeometry, SphereParams};
use orrery_render::{
    AttributeLocation, BufferHandle, BufferKind, COLOR_UNIFORM, MVP_UNIFORM, POSITION_ATTRIBUTE,
    ProgramHandle, RenderBackend, ShaderService, TEX_COORD_ATTRIBUTE, TEXTURE_UNIT_UNIFORM,
    TextureHandle, UniformLocation, UniformValue, report_backend_errors,
};

use crate::error::SceneError;
use crate::transform::TransformNode;

/// Texture unit every body samples from.
pub const BODY_TEXTURE_UNIT: u32 = 0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BodyLocations {
    position: AttributeLocation,
    tex_coords: AttributeLocation,
    mvp: UniformLocation,
    color: UniformLocation,
    texture_unit: UniformLocation,
}

impl BodyLocations {
    fn resolve<S: ShaderService + ?Sized>(
        shaders: &S,
        program: ProgramHandle,
    ) -> Result<Self, SceneError> {
        let attribute = |name: &'static str| {
            shaders
                .attribute_location(program, name)
                .ok_or(SceneError::MissingAttribute { program, name })
        };
        let uniform = |name: &'static str| {
            shaders
                .uniform_location(program, name)
                .ok_or(SceneError::MissingUniform { program, name })
        };
        Ok(Self {
            position: attribute(POSITION_ATTRIBUTE)?,
            tex_coords: attribute(TEX_COORD_ATTRIBUTE)?,
            mvp: uniform(MVP_UNIFORM)?,
            color: uniform(COLOR_UNIFORM)?,
            texture_unit: uniform(TEXTURE_UNIT_UNIFORM)?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BodyBuffers {
    positions: BufferHandle,
    tex_coords: BufferHandle,
    indices: BufferHandle,
    index_count: u32,
}

/// A sphere with its own transform, texture and tint.
///
/// Geometry is generated and uploaded once at construction. Each draw binds
/// everything it needs and unbinds it again, so bodies never observe each
/// other's state.
#[derive(Debug)]
pub struct CelestialBody {
    label: String,
    geometry: SphereGeometry,
    transform: TransformNode,
    program: ProgramHandle,
    texture: TextureHandle,
    color: [f32; 4],
    locations: BodyLocations,
    buffers: BodyBuffers,
}

impl CelestialBody {
    /// Generate a sphere of `radius` at `center`, upload its buffers, and
    /// resolve the program's attribute and uniform locations.
    #[allow(clippy::too_many_arguments)]
    pub fn new<B: RenderBackend + ShaderService + ?Sized>(
        backend: &mut B,
        label: &str,
        center: Vec3,
        radius: f32,
        stack_count: u32,
        sector_count: u32,
        program: ProgramHandle,
        texture: TextureHandle,
        color: [f32; 4],
    ) -> Result<Self, SceneError> {
        let params = SphereParams::new(center, radius).with_resolution(stack_count, sector_count);
        let geometry = SphereGeometry::from_params(&params)?;
        let locations = BodyLocations::resolve(&*backend, program)?;

        let buffers = BodyBuffers {
            positions: backend.upload_buffer(
                BufferKind::Vertex,
                &format!("{label}-positions"),
                geometry.positions_bytes(),
            ),
            tex_coords: backend.upload_buffer(
                BufferKind::Vertex,
                &format!("{label}-tex-coords"),
                geometry.tex_coords_bytes(),
            ),
            indices: backend.upload_buffer(
                BufferKind::Index,
                &format!("{label}-indices"),
                geometry.indices_bytes(),
            ),
            index_count: geometry.index_count() as u32,
        };
        debug!(
            "Built {label}: {} vertices, {} indices",
            geometry.vertex_count(),
            geometry.index_count()
        );

        Ok(Self {
            label: label.to_string(),
            geometry,
            transform: TransformNode::new(),
            program,
            texture,
            color,
            locations,
            buffers,
        })
    }

    /// Draw with `mvp = view_projection · model`, then report every error the
    /// backend queued. Returns how many errors were reported.
    pub fn draw<B: RenderBackend + ?Sized>(&self, backend: &mut B, view_projection: Mat4) -> usize {
        let locations = &self.locations;
        let buffers = &self.buffers;

        backend.use_program(Some(self.program));
        backend.bind_vertex_buffer(locations.position, buffers.positions);
        backend.bind_vertex_buffer(locations.tex_coords, buffers.tex_coords);
        backend.bind_texture(BODY_TEXTURE_UNIT, Some(self.texture));
        backend.set_uniform(
            locations.texture_unit,
            UniformValue::Int(BODY_TEXTURE_UNIT as i32),
        );
        backend.set_uniform(locations.color, UniformValue::Vec4(self.color));
        backend.set_uniform(
            locations.mvp,
            UniformValue::Mat4(view_projection * self.transform.model_matrix()),
        );

        backend.draw_indexed_triangles(buffers.indices, buffers.index_count);

        backend.bind_texture(BODY_TEXTURE_UNIT, None);
        backend.disable_vertex_attribute(locations.position);
        backend.disable_vertex_attribute(locations.tex_coords);
        backend.use_program(None);

        report_backend_errors(&self.label, &backend.drain_errors())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn geometry(&self) -> &SphereGeometry {
        &self.geometry
    }

    pub fn transform(&self) -> &TransformNode {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut TransformNode {
        &mut self.transform
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.transform.model_matrix()
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn color(&self) -> [f32; 4] {
        self.color
    }

    pub fn index_count(&self) -> u32 {
        self.buffers.index_count
    }

    pub fn index_buffer(&self) -> BufferHandle {
        self.buffers.indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_mesh::MeshError;
    use orrery_render::{
        BackendCall, ClearMask, ErrorCode, RecordingBackend, SPHERE_FRAGMENT_SHADER,
        SPHERE_VERTEX_SHADER, TextureImage, TextureService,
    };

    const TINT: [f32; 4] = [0.5607843, 0.843137, 0.858823, 1.0];

    fn setup() -> (RecordingBackend, ProgramHandle, TextureHandle) {
        let mut backend = RecordingBackend::new();
        let program = backend
            .compile_program(SPHERE_VERTEX_SHADER, SPHERE_FRAGMENT_SHADER)
            .unwrap();
        let texture = backend
            .load_texture("earth", &TextureImage::solid(2, [0, 0, 255, 255]))
            .unwrap();
        (backend, program, texture)
    }

    fn body(
        backend: &mut RecordingBackend,
        program: ProgramHandle,
        texture: TextureHandle,
    ) -> CelestialBody {
        CelestialBody::new(
            backend,
            "earth",
            Vec3::ZERO,
            1.0,
            26,
            26,
            program,
            texture,
            TINT,
        )
        .unwrap()
    }

    #[test]
    fn test_construction_uploads_packed_geometry() {
        let (mut backend, program, texture) = setup();
        let earth = body(&mut backend, program, texture);

        assert_eq!(earth.geometry().vertex_count(), 27 * 27);
        assert_eq!(earth.index_count() as usize, 26 * 2 * 25 * 3);
        let index_bytes = backend.buffer_bytes(earth.index_buffer()).unwrap();
        assert_eq!(index_bytes, earth.geometry().indices_bytes());

        let uploads = backend
            .calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::UploadBuffer { .. }))
            .count();
        assert_eq!(uploads, 3);
    }

    #[test]
    fn test_invalid_radius_is_rejected() {
        let (mut backend, program, texture) = setup();
        let result = CelestialBody::new(
            &mut backend,
            "bad",
            Vec3::ZERO,
            0.0,
            26,
            26,
            program,
            texture,
            TINT,
        );
        assert!(matches!(
            result,
            Err(SceneError::Mesh(MeshError::InvalidRadius(_)))
        ));
    }

    #[test]
    fn test_unknown_program_is_rejected() {
        let (mut backend, _program, texture) = setup();
        let result = CelestialBody::new(
            &mut backend,
            "orphan",
            Vec3::ZERO,
            1.0,
            4,
            4,
            ProgramHandle::from_raw(999),
            texture,
            TINT,
        );
        assert!(matches!(
            result,
            Err(SceneError::MissingAttribute {
                name: POSITION_ATTRIBUTE,
                ..
            })
        ));
    }

    #[test]
    fn test_draw_sets_mvp_and_tint() {
        let (mut backend, program, texture) = setup();
        let mut earth = body(&mut backend, program, texture);
        earth.transform_mut().translate(0.0, 0.0, 5.0);
        let view_projection = Mat4::from_scale(Vec3::splat(2.0));

        backend.begin_frame();
        backend.clear(ClearMask::ALL);
        assert_eq!(earth.draw(&mut backend, view_projection), 0);
        backend.end_frame();

        let draw = &backend.draws()[0];
        assert_eq!(draw.program, program);
        assert_eq!(draw.texture, texture);
        assert_eq!(draw.uniforms.color, TINT);
        assert_eq!(draw.uniforms.texture_unit, 0);
        assert_eq!(
            draw.uniforms.mvp,
            view_projection * Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0))
        );
        assert_eq!(draw.index_count, earth.index_count());
    }

    #[test]
    fn test_draw_leaves_nothing_bound() {
        let (mut backend, program, texture) = setup();
        let earth = body(&mut backend, program, texture);
        backend.begin_frame();
        earth.draw(&mut backend, Mat4::IDENTITY);
        assert!(backend.state().is_unbound());
    }

    #[test]
    fn test_draw_outside_frame_reports_error() {
        let (mut backend, program, texture) = setup();
        let earth = body(&mut backend, program, texture);
        assert_eq!(earth.draw(&mut backend, Mat4::IDENTITY), 1);
        assert!(backend.draws().is_empty());
        assert_eq!(backend.drain_errors(), Vec::<ErrorCode>::new());
    }
}
