//! GPU buffers: uploaded geometry and per-draw uniforms.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::handle::BufferKind;
use crate::state::ProgramUniforms;

/// Create a buffer holding `data` for the given binding kind.
pub fn create_geometry_buffer(
    device: &wgpu::Device,
    kind: BufferKind,
    label: &str,
    data: &[u8],
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: data,
        usage: buffer_usage(kind),
    })
}

pub fn buffer_usage(kind: BufferKind) -> wgpu::BufferUsages {
    match kind {
        BufferKind::Vertex => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        BufferKind::Index => wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
    }
}

/// Uniform block read by the sphere program. Layout matches the WGSL
/// `DrawUniforms` struct, padded to 16 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DrawUniforms {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub texture_unit: i32,
    pub _padding: [i32; 3],
}

static_assertions::const_assert_eq!(std::mem::size_of::<DrawUniforms>(), 96);

impl From<&ProgramUniforms> for DrawUniforms {
    fn from(uniforms: &ProgramUniforms) -> Self {
        Self {
            mvp: uniforms.mvp.to_cols_array_2d(),
            color: uniforms.color,
            texture_unit: uniforms.texture_unit,
            _padding: [0; 3],
        }
    }
}

/// Round `size` up to a multiple of `alignment`.
pub fn align_to(size: u64, alignment: u64) -> u64 {
    size.div_ceil(alignment) * alignment
}

/// One uniform buffer holding a [`DrawUniforms`] slot per draw, addressed by
/// dynamic offset.
pub struct UniformRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
}

impl UniformRing {
    const INITIAL_CAPACITY: usize = 8;

    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw-uniforms-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<DrawUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        })
    }

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = align_to(std::mem::size_of::<DrawUniforms>() as u64, alignment);
        Self::with_capacity(device, layout, stride, Self::INITIAL_CAPACITY)
    }

    fn with_capacity(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw-uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw-uniforms-bind-group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        Self {
            buffer,
            bind_group,
            stride,
            capacity,
        }
    }

    /// Grow so that `draws` slots fit. Existing contents are discarded.
    pub fn reserve(&mut self, device: &wgpu::Device, layout: &wgpu::BindGroupLayout, draws: usize) {
        if draws <= self.capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        log::debug!("Growing draw uniform buffer to {capacity} slots");
        *self = Self::with_capacity(device, layout, self.stride, capacity);
    }

    /// Write the uniforms of draw `slot`.
    pub fn write(&self, queue: &wgpu::Queue, slot: usize, uniforms: &DrawUniforms) {
        queue.write_buffer(&self.buffer, self.offset(slot) as u64, bytemuck::bytes_of(uniforms));
    }

    /// Dynamic offset of draw `slot`.
    pub fn offset(&self, slot: usize) -> u32 {
        (self.stride * slot as u64) as u32
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
