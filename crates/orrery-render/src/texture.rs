//! Texture images: decoding, generated fallbacks, and GPU upload.
//!
//! A [`TextureImage`] is tightly packed RGBA8 pixels, rows top to bottom.
//! Backends upload it through [`TextureService`](crate::TextureService); the
//! wgpu backend goes through [`GpuTexture::upload`].

use std::borrow::Cow;
use std::path::Path;

use image::imageops::FilterType;

/// Errors that can occur while producing or uploading a texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Pixel data length doesn't match the expected size for the dimensions.
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    /// Width or height is zero.
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// Wider or taller than the device allows for 2D textures.
    #[error("texture {width}x{height} exceeds the device limit of {max} texels per side")]
    TooLarge { width: u32, height: u32, max: u32 },

    /// The image file could not be opened or decoded.
    #[error("failed to decode texture image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decoded RGBA8 pixels plus dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl TextureImage {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Wrap raw RGBA8 pixels, validating the dimensions against the data.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroDimensions { width, height });
        }
        let expected = width as usize * height as usize * Self::BYTES_PER_PIXEL;
        if rgba.len() != expected {
            return Err(TextureError::DataSizeMismatch {
                actual: rgba.len(),
                expected,
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Decode an image file of any format the `image` crate was built with.
    pub fn open(path: &Path) -> Result<Self, TextureError> {
        let decoded = image::open(path)?.to_rgba8();
        let (width, height) = decoded.dimensions();
        log::debug!("Decoded {} ({width}x{height})", path.display());
        Self::from_rgba(width, height, decoded.into_raw())
    }

    /// A single-colour texture.
    pub fn solid(size: u32, color: [u8; 4]) -> Self {
        let size = size.max(1);
        let image = image::RgbaImage::from_pixel(size, size, image::Rgba(color));
        Self {
            width: size,
            height: size,
            rgba: image.into_raw(),
        }
    }

    /// A checkerboard of 4x4-texel cells alternating `color_a` and `color_b`.
    pub fn checkerboard(size: u32, color_a: [u8; 4], color_b: [u8; 4]) -> Self {
        let size = size.max(1);
        let cell = 4;
        let image = image::RgbaImage::from_fn(size, size, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                image::Rgba(color_a)
            } else {
                image::Rgba(color_b)
            }
        });
        Self {
            width: size,
            height: size,
            rgba: image.into_raw(),
        }
    }

    /// Decode `path` if given and readable, otherwise fall back to a
    /// checkerboard of `fallback_color` and black.
    pub fn open_or_fallback(path: Option<&Path>, fallback_color: [u8; 4]) -> Self {
        if let Some(path) = path {
            match Self::open(path) {
                Ok(image) => return image,
                Err(e) => log::warn!("Using fallback texture for {}: {e}", path.display()),
            }
        }
        Self::checkerboard(FALLBACK_TEXTURE_SIZE, fallback_color, [0, 0, 0, 255])
    }

    /// Fail with [`TextureError::TooLarge`] if either side exceeds `max_dimension`.
    pub fn check_fits(&self, max_dimension: u32) -> Result<(), TextureError> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(TextureError::TooLarge {
                width: self.width,
                height: self.height,
                max: max_dimension,
            });
        }
        Ok(())
    }

    /// Downscale, keeping the aspect ratio, so that neither side exceeds
    /// `max_dimension`. Images that already fit are borrowed unchanged.
    pub fn fit_within(&self, max_dimension: u32) -> Cow<'_, Self> {
        let max_dimension = max_dimension.max(1);
        if self.check_fits(max_dimension).is_ok() {
            return Cow::Borrowed(self);
        }
        let pixels = self.rgba.as_slice();
        let Some(source) = image::ImageBuffer::<image::Rgba<u8>, &[u8]>::from_raw(
            self.width,
            self.height,
            pixels,
        ) else {
            return Cow::Borrowed(self);
        };

        let scale = f64::from(max_dimension) / f64::from(self.width.max(self.height));
        let scaled = |side: u32| ((f64::from(side) * scale).round() as u32).clamp(1, max_dimension);
        let (width, height) = (scaled(self.width), scaled(self.height));
        let resized = image::imageops::resize(&source, width, height, FilterType::Triangle);
        log::warn!(
            "Downscaled {}x{} texture to {width}x{height}",
            self.width,
            self.height
        );
        Cow::Owned(Self {
            width,
            height,
            rgba: resized.into_raw(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Colour of the texel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL;
        let mut texel = [0u8; 4];
        texel.copy_from_slice(&self.rgba[offset..offset + Self::BYTES_PER_PIXEL]);
        Some(texel)
    }
}

/// Edge length of generated fallback textures.
pub const FALLBACK_TEXTURE_SIZE: u32 = 32;

/// Format every body texture is uploaded as.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// An uploaded texture, held alive by its ready-to-bind group.
pub struct GpuTexture {
    pub bind_group: wgpu::BindGroup,
    pub dimensions: (u32, u32),
}

impl GpuTexture {
    /// Layout of the texture + sampler bind group the sphere program samples.
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }

    /// Linear, repeating sampler shared by every body texture.
    pub fn create_sampler(device: &wgpu::Device) -> wgpu::Sampler {
        device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sampler-linear"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        })
    }

    /// Upload `image`, rejecting it up front if the device cannot hold it.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        label: &str,
        image: &TextureImage,
    ) -> Result<Self, TextureError> {
        image.check_fits(device.limits().max_texture_dimension_2d)?;
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.rgba(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * TextureImage::BYTES_PER_PIXEL as u32),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-bind-group")),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        log::info!("Created texture '{label}' ({width}x{height})");
        Ok(Self {
            bind_group,
            dimensions: (width, height),
        })
    }
}

/// Create a test GPU device and queue. Returns `None` if no GPU is available.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: Default::default(),
                ..Default::default()
            })
            .await
            .ok()
    })
}
