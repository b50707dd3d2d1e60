//! GL-style binding state shared by every backend.
//!
//! [`BindingState`] tracks what is current (program, enabled attributes,
//! texture units, per-program uniforms), validates each call against it and
//! queues an [`ErrorCode`] for every rejected call. A successful draw produces
//! a [`DrawSnapshot`] carrying everything the backend needs to execute it.

use std::collections::{BTreeMap, HashMap, HashSet};

use glam::Mat4;

use crate::backend::{Capability, ClearMask};
use crate::error::ErrorCode;
use crate::handle::{
    AttributeLocation, BufferHandle, BufferKind, ProgramHandle, TextureHandle, UniformLocation,
};
use crate::program::{MAX_TEXTURE_UNITS, ProgramInterface, UniformKind, UniformValue};

/// Metadata of an uploaded buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferInfo {
    pub kind: BufferKind,
    pub byte_len: usize,
}

/// Uniform values of one program. Unwritten uniforms read as zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgramUniforms {
    pub mvp: Mat4,
    pub color: [f32; 4],
    pub texture_unit: i32,
}

impl Default for ProgramUniforms {
    fn default() -> Self {
        Self {
            mvp: Mat4::ZERO,
            color: [0.0; 4],
            texture_unit: 0,
        }
    }
}

/// Everything a validated draw reads.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawSnapshot {
    pub program: ProgramHandle,
    /// Enabled attributes and their buffers, in location order.
    pub vertex_buffers: Vec<(AttributeLocation, BufferHandle)>,
    pub texture: TextureHandle,
    pub uniforms: ProgramUniforms,
    pub index_buffer: BufferHandle,
    pub index_count: u32,
    pub depth_test: bool,
    pub cull_face: bool,
}

#[derive(Debug)]
pub struct BindingState {
    next_id: u32,
    programs: HashMap<ProgramHandle, ProgramInterface>,
    textures: HashMap<TextureHandle, (u32, u32)>,
    buffers: HashMap<BufferHandle, BufferInfo>,
    current_program: Option<ProgramHandle>,
    attributes: BTreeMap<AttributeLocation, BufferHandle>,
    texture_units: [Option<TextureHandle>; MAX_TEXTURE_UNITS as usize],
    uniforms: HashMap<ProgramHandle, ProgramUniforms>,
    capabilities: HashSet<Capability>,
    clear_color: [f32; 4],
    viewport: (u32, u32),
    frame_active: bool,
    pending_clear: ClearMask,
    errors: Vec<ErrorCode>,
}

impl BindingState {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            programs: HashMap::new(),
            textures: HashMap::new(),
            buffers: HashMap::new(),
            current_program: None,
            attributes: BTreeMap::new(),
            texture_units: [None; MAX_TEXTURE_UNITS as usize],
            uniforms: HashMap::new(),
            capabilities: HashSet::new(),
            clear_color: [0.0, 0.0, 0.0, 0.0],
            viewport: (0, 0),
            frame_active: false,
            pending_clear: ClearMask::default(),
            errors: Vec::new(),
        }
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // --- Resource registration ---

    pub fn register_program(&mut self, interface: ProgramInterface) -> ProgramHandle {
        let handle = ProgramHandle::from_raw(self.allocate_id());
        self.programs.insert(handle, interface);
        self.uniforms.insert(handle, ProgramUniforms::default());
        handle
    }

    pub fn register_texture(&mut self, width: u32, height: u32) -> TextureHandle {
        let handle = TextureHandle::from_raw(self.allocate_id());
        self.textures.insert(handle, (width, height));
        handle
    }

    pub fn register_buffer(&mut self, kind: BufferKind, byte_len: usize) -> BufferHandle {
        let handle = BufferHandle::from_raw(self.allocate_id());
        self.buffers.insert(handle, BufferInfo { kind, byte_len });
        handle
    }

    pub fn program_interface(&self, program: ProgramHandle) -> Option<&ProgramInterface> {
        self.programs.get(&program)
    }

    pub fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&texture).copied()
    }

    pub fn buffer(&self, buffer: BufferHandle) -> Option<&BufferInfo> {
        self.buffers.get(&buffer)
    }

    // --- Binding ---

    pub fn use_program(&mut self, program: Option<ProgramHandle>) {
        match program {
            Some(handle) if !self.programs.contains_key(&handle) => {
                self.push_error(ErrorCode::InvalidValue);
            }
            _ => self.current_program = program,
        }
    }

    pub fn bind_vertex_buffer(&mut self, location: AttributeLocation, buffer: BufferHandle) {
        match self.buffers.get(&buffer) {
            None => self.push_error(ErrorCode::InvalidValue),
            Some(info) if info.kind != BufferKind::Vertex => {
                self.push_error(ErrorCode::InvalidOperation)
            }
            Some(_) => {
                self.attributes.insert(location, buffer);
            }
        }
    }

    pub fn disable_vertex_attribute(&mut self, location: AttributeLocation) {
        self.attributes.remove(&location);
    }

    pub fn bind_texture(&mut self, unit: u32, texture: Option<TextureHandle>) {
        if unit >= MAX_TEXTURE_UNITS {
            self.push_error(ErrorCode::InvalidEnum);
            return;
        }
        if let Some(handle) = texture
            && !self.textures.contains_key(&handle)
        {
            self.push_error(ErrorCode::InvalidValue);
            return;
        }
        self.texture_units[unit as usize] = texture;
    }

    pub fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(program) = self.current_program else {
            self.push_error(ErrorCode::InvalidOperation);
            return;
        };
        let kind = self
            .programs
            .get(&program)
            .and_then(|interface| interface.uniform_at(location))
            .map(|binding| binding.kind);
        if kind != Some(value.kind()) {
            self.push_error(ErrorCode::InvalidOperation);
            return;
        }

        let uniforms = self.uniforms.entry(program).or_default();
        match value {
            UniformValue::Mat4(m) => uniforms.mvp = m,
            UniformValue::Vec4(v) => uniforms.color = v,
            UniformValue::Int(unit) => {
                if unit < 0 || unit as u32 >= MAX_TEXTURE_UNITS {
                    self.errors.push(ErrorCode::InvalidValue);
                } else {
                    uniforms.texture_unit = unit;
                }
            }
        }
    }

    // --- Fixed-function state ---

    pub fn enable(&mut self, capability: Capability) {
        self.capabilities.insert(capability);
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    // --- Frame ---

    pub fn begin_frame(&mut self) {
        if self.frame_active {
            self.push_error(ErrorCode::InvalidOperation);
        }
        self.frame_active = true;
        self.pending_clear = ClearMask::default();
    }

    pub fn clear(&mut self, mask: ClearMask) {
        if !self.frame_active {
            self.push_error(ErrorCode::InvalidFramebufferOperation);
            return;
        }
        self.pending_clear = self.pending_clear.union(mask);
    }

    /// Close the frame and return the buffers cleared during it.
    pub fn end_frame(&mut self) -> ClearMask {
        if !self.frame_active {
            self.push_error(ErrorCode::InvalidOperation);
        }
        self.frame_active = false;
        std::mem::take(&mut self.pending_clear)
    }

    pub fn frame_active(&self) -> bool {
        self.frame_active
    }

    // --- Draw ---

    /// Validate a draw against the current state.
    ///
    /// Returns `None` and queues an error if the draw cannot run.
    pub fn prepare_draw(
        &mut self,
        index_buffer: BufferHandle,
        index_count: u32,
    ) -> Option<DrawSnapshot> {
        match self.validate_draw(index_buffer, index_count) {
            Ok(snapshot) => Some(snapshot),
            Err(code) => {
                self.push_error(code);
                None
            }
        }
    }

    fn validate_draw(
        &self,
        index_buffer: BufferHandle,
        index_count: u32,
    ) -> Result<DrawSnapshot, ErrorCode> {
        if !self.frame_active {
            return Err(ErrorCode::InvalidFramebufferOperation);
        }
        let program = self.current_program.ok_or(ErrorCode::InvalidOperation)?;
        let interface = self
            .programs
            .get(&program)
            .ok_or(ErrorCode::InvalidOperation)?;

        let index_info = self
            .buffers
            .get(&index_buffer)
            .ok_or(ErrorCode::InvalidValue)?;
        if index_info.kind != BufferKind::Index {
            return Err(ErrorCode::InvalidOperation);
        }
        if index_count as usize * std::mem::size_of::<u16>() > index_info.byte_len {
            return Err(ErrorCode::InvalidValue);
        }

        let mut vertex_buffers = Vec::with_capacity(interface.attributes.len());
        for attribute in interface.attributes {
            let buffer = self
                .attributes
                .get(&attribute.location)
                .copied()
                .ok_or(ErrorCode::InvalidOperation)?;
            vertex_buffers.push((attribute.location, buffer));
        }

        let uniforms = self.uniforms.get(&program).copied().unwrap_or_default();
        let texture = self
            .bound_texture(uniforms.texture_unit as u32)
            .ok_or(ErrorCode::InvalidOperation)?;

        Ok(DrawSnapshot {
            program,
            vertex_buffers,
            texture,
            uniforms,
            index_buffer,
            index_count,
            depth_test: self.is_enabled(Capability::DepthTest),
            cull_face: self.is_enabled(Capability::CullFace),
        })
    }

    // --- Errors ---

    pub fn push_error(&mut self, code: ErrorCode) {
        self.errors.push(code);
    }

    pub fn drain_errors(&mut self) -> Vec<ErrorCode> {
        std::mem::take(&mut self.errors)
    }

    // --- Inspection ---

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    pub fn bound_attributes(&self) -> impl Iterator<Item = (AttributeLocation, BufferHandle)> + '_ {
        self.attributes.iter().map(|(l, b)| (*l, *b))
    }

    pub fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
        self.texture_units.get(unit as usize).copied().flatten()
    }

    pub fn uniforms(&self, program: ProgramHandle) -> Option<&ProgramUniforms> {
        self.uniforms.get(&program)
    }

    /// True when no program, attribute or texture is bound.
    pub fn is_unbound(&self) -> bool {
        self.current_program.is_none()
            && self.attributes.is_empty()
            && self.texture_units.iter().all(Option::is_none)
    }
}

impl Default for BindingState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::SPHERE_INTERFACE;

    struct Fixture {
        state: BindingState,
        program: ProgramHandle,
        positions: BufferHandle,
        uvs: BufferHandle,
        indices: BufferHandle,
        texture: TextureHandle,
    }

    fn fixture() -> Fixture {
        let mut state = BindingState::new();
        let program = state.register_program(SPHERE_INTERFACE);
        let positions = state.register_buffer(BufferKind::Vertex, 36);
        let uvs = state.register_buffer(BufferKind::Vertex, 24);
        let indices = state.register_buffer(BufferKind::Index, 6);
        let texture = state.register_texture(4, 4);
        Fixture {
            state,
            program,
            positions,
            uvs,
            indices,
            texture,
        }
    }

    fn bind_all(f: &mut Fixture) {
        f.state.use_program(Some(f.program));
        f.state.bind_vertex_buffer(AttributeLocation(0), f.positions);
        f.state.bind_vertex_buffer(AttributeLocation(1), f.uvs);
        f.state.bind_texture(0, Some(f.texture));
    }

    #[test]
    fn test_handles_are_unique() {
        let f = fixture();
        let raws = [
            f.program.raw(),
            f.positions.raw(),
            f.uvs.raw(),
            f.indices.raw(),
            f.texture.raw(),
        ];
        let unique: HashSet<_> = raws.iter().collect();
        assert_eq!(unique.len(), raws.len());
    }

    #[test]
    fn test_valid_draw_produces_snapshot() {
        let mut f = fixture();
        f.state.begin_frame();
        bind_all(&mut f);
        f.state
            .set_uniform(UniformLocation(1), UniformValue::Vec4([1.0, 0.5, 0.25, 1.0]));

        let snapshot = f.state.prepare_draw(f.indices, 3).unwrap();
        assert_eq!(snapshot.program, f.program);
        assert_eq!(snapshot.texture, f.texture);
        assert_eq!(snapshot.uniforms.color, [1.0, 0.5, 0.25, 1.0]);
        assert_eq!(
            snapshot.vertex_buffers,
            vec![
                (AttributeLocation(0), f.positions),
                (AttributeLocation(1), f.uvs)
            ]
        );
        assert!(f.state.drain_errors().is_empty());
    }

    #[test]
    fn test_draw_without_program_is_invalid_operation() {
        let mut f = fixture();
        f.state.begin_frame();
        assert!(f.state.prepare_draw(f.indices, 3).is_none());
        assert_eq!(f.state.drain_errors(), vec![ErrorCode::InvalidOperation]);
    }

    #[test]
    fn test_draw_outside_frame_is_framebuffer_error() {
        let mut f = fixture();
        bind_all(&mut f);
        assert!(f.state.prepare_draw(f.indices, 3).is_none());
        assert_eq!(
            f.state.drain_errors(),
            vec![ErrorCode::InvalidFramebufferOperation]
        );
    }

    #[test]
    fn test_draw_past_index_buffer_is_invalid_value() {
        let mut f = fixture();
        f.state.begin_frame();
        bind_all(&mut f);
        assert!(f.state.prepare_draw(f.indices, 4).is_none());
        assert_eq!(f.state.drain_errors(), vec![ErrorCode::InvalidValue]);
    }

    #[test]
    fn test_draw_with_disabled_attribute_fails() {
        let mut f = fixture();
        f.state.begin_frame();
        bind_all(&mut f);
        f.state.disable_vertex_attribute(AttributeLocation(1));
        assert!(f.state.prepare_draw(f.indices, 3).is_none());
        assert_eq!(f.state.drain_errors(), vec![ErrorCode::InvalidOperation]);
    }

    #[test]
    fn test_draw_without_texture_fails() {
        let mut f = fixture();
        f.state.begin_frame();
        bind_all(&mut f);
        f.state.bind_texture(0, None);
        assert!(f.state.prepare_draw(f.indices, 3).is_none());
        assert_eq!(f.state.drain_errors(), vec![ErrorCode::InvalidOperation]);
    }

    #[test]
    fn test_binding_rejections() {
        let mut f = fixture();
        f.state.use_program(Some(ProgramHandle::from_raw(999)));
        f.state.bind_vertex_buffer(AttributeLocation(0), f.indices);
        f.state.bind_vertex_buffer(AttributeLocation(0), BufferHandle::from_raw(999));
        f.state.bind_texture(MAX_TEXTURE_UNITS, Some(f.texture));
        f.state.bind_texture(0, Some(TextureHandle::from_raw(999)));
        assert_eq!(
            f.state.drain_errors(),
            vec![
                ErrorCode::InvalidValue,
                ErrorCode::InvalidOperation,
                ErrorCode::InvalidValue,
                ErrorCode::InvalidEnum,
                ErrorCode::InvalidValue,
            ]
        );
        assert!(f.state.is_unbound());
    }

    #[test]
    fn test_uniform_rejections() {
        let mut f = fixture();
        f.state
            .set_uniform(UniformLocation(0), UniformValue::Mat4(Mat4::IDENTITY));
        f.state.use_program(Some(f.program));
        f.state
            .set_uniform(UniformLocation(0), UniformValue::Vec4([0.0; 4]));
        f.state
            .set_uniform(UniformLocation(42), UniformValue::Mat4(Mat4::IDENTITY));
        f.state.set_uniform(UniformLocation(2), UniformValue::Int(-1));
        assert_eq!(
            f.state.drain_errors(),
            vec![
                ErrorCode::InvalidOperation,
                ErrorCode::InvalidOperation,
                ErrorCode::InvalidOperation,
                ErrorCode::InvalidValue,
            ]
        );
        assert_eq!(
            f.state.uniforms(f.program).unwrap(),
            &ProgramUniforms::default()
        );
    }

    #[test]
    fn test_uniforms_are_per_program() {
        let mut f = fixture();
        let other = f.state.register_program(SPHERE_INTERFACE);
        f.state.use_program(Some(f.program));
        f.state
            .set_uniform(UniformLocation(0), UniformValue::Mat4(Mat4::IDENTITY));
        f.state.use_program(Some(other));
        assert_eq!(f.state.uniforms(other).unwrap().mvp, Mat4::ZERO);
        assert_eq!(f.state.uniforms(f.program).unwrap().mvp, Mat4::IDENTITY);
    }

    #[test]
    fn test_clear_requires_frame_and_accumulates() {
        let mut f = fixture();
        f.state.clear(ClearMask::COLOR);
        assert_eq!(
            f.state.drain_errors(),
            vec![ErrorCode::InvalidFramebufferOperation]
        );

        f.state.begin_frame();
        f.state.clear(ClearMask::COLOR);
        f.state.clear(ClearMask::DEPTH);
        assert_eq!(f.state.end_frame(), ClearMask::ALL);
        assert!(!f.state.frame_active());
    }

    #[test]
    fn test_capabilities_recorded_in_snapshot() {
        let mut f = fixture();
        f.state.enable(Capability::DepthTest);
        f.state.begin_frame();
        bind_all(&mut f);
        let snapshot = f.state.prepare_draw(f.indices, 3).unwrap();
        assert!(snapshot.depth_test);
        assert!(!snapshot.cull_face);
    }
}
