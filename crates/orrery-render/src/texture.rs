//! Body textures: image decoding, GPU upload with mipmaps, and the per-body
//! texture set.
//!
//! Decode failures never abort startup. The affected body gets a 1×1 blank
//! texture and an error is logged, so every body always has a bindable texture.

use std::path::{Path, PathBuf};

use orrery_scene::Body;

use crate::mipmap::{MipmapGenerator, mip_level_count};

/// Pixel format of every body texture.
pub const BODY_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Texel used for textures that failed to load: opaque black.
const BLANK_TEXEL: [u8; 4] = [0, 0, 0, 255];

/// Errors that can occur while producing a texture.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// The file is missing, unreadable, or not a supported image.
    #[error("failed to decode '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Width or height is zero.
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// Wider or taller than the device allows.
    #[error("texture is {width}x{height}, the device allows at most {max}x{max}")]
    TooLarge { width: u32, height: u32, max: u32 },

    /// Pixel data length doesn't match the dimensions.
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },
}

/// Decoded RGBA8 pixels, bottom row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file before conversion to RGBA.
    pub source_channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// A single opaque black texel.
    pub fn blank() -> Self {
        Self {
            width: 1,
            height: 1,
            source_channels: 4,
            pixels: BLANK_TEXEL.to_vec(),
        }
    }

    fn validate(&self) -> Result<(), TextureError> {
        if self.width == 0 || self.height == 0 {
            return Err(TextureError::ZeroDimensions {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize * 4;
        if self.pixels.len() != expected {
            return Err(TextureError::DataSizeMismatch {
                actual: self.pixels.len(),
                expected,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Check both sides against the device's `max_texture_dimension_2d`.
    fn fits(&self, max_dimension: u32) -> Result<(), TextureError> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(TextureError::TooLarge {
                width: self.width,
                height: self.height,
                max: max_dimension,
            });
        }
        Ok(())
    }
}

/// Decode an image file, flip it vertically and convert it to RGBA8.
///
/// The flip puts the first image row at `v = 1`, which is what the sphere
/// mesh's texture coordinates expect.
pub fn decode_image(path: &Path) -> Result<DecodedImage, TextureError> {
    let image = image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let source_channels = image.color().channel_count();
    let rgba = image.flipv().to_rgba8();

    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        source_channels,
        pixels: rgba.into_raw(),
    })
}

/// A body texture uploaded to the GPU and ready to bind at group 1.
pub struct BodyTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub bind_group: wgpu::BindGroup,
    pub dimensions: (u32, u32),
    pub mip_level_count: u32,
}

/// One texture per body. Every texture is destroyed when the set is dropped.
pub struct BodyTextures {
    textures: [BodyTexture; Body::COUNT],
}

impl BodyTextures {
    /// Load each body's texture from the path `path_for` returns.
    pub fn load(
        manager: &TextureManager,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path_for: impl Fn(Body) -> PathBuf,
    ) -> Self {
        let textures =
            Body::ALL.map(|body| manager.load_body_texture(device, queue, body, &path_for(body)));
        Self { textures }
    }

    pub fn get(&self, body: Body) -> &BodyTexture {
        &self.textures[body.index()]
    }
}

impl Drop for BodyTextures {
    fn drop(&mut self) {
        for texture in &self.textures {
            texture.texture.destroy();
        }
        log::debug!("Destroyed {} body textures", self.textures.len());
    }
}

/// Creates body textures with a shared repeat/linear sampler and bind group layout.
pub struct TextureManager {
    sampler: wgpu::Sampler,
    bind_group_layout: wgpu::BindGroupLayout,
    mipmaps: MipmapGenerator,
}

/// Fragment-visible filterable 2D texture at binding 0, sampler at binding 1.
pub(crate) fn texture_sampler_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
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

pub(crate) fn texture_sampler_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

impl TextureManager {
    pub fn new(device: &wgpu::Device) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("body-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        Self {
            sampler,
            bind_group_layout: texture_sampler_layout(device, "body-texture-layout"),
            mipmaps: MipmapGenerator::new(device),
        }
    }

    /// Layout of group 1: `ourTexture` at binding 0, `ourSampler` at binding 1.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Decode and upload the texture for `body`.
    ///
    /// On failure logs `Failed to load texture` and returns a blank 1×1 texture.
    pub fn load_body_texture(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        body: Body,
        path: &Path,
    ) -> BodyTexture {
        let label = format!("{body}-texture");
        let decoded = decode_image(path).and_then(|image| {
            log::info!(
                "Loaded {body} texture {} ({}x{}, {} channels)",
                path.display(),
                image.width,
                image.height,
                image.source_channels
            );
            self.create_texture(device, queue, &label, &image)
        });

        match decoded {
            Ok(texture) => texture,
            Err(err) => {
                log::error!("Failed to load texture for {body}: {err}");
                self.blank_texture(device, queue, &label)
            }
        }
    }

    /// Upload `image` with a full mip chain.
    pub fn create_texture(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &DecodedImage,
    ) -> Result<BodyTexture, TextureError> {
        image.validate()?;
        image.fits(device.limits().max_texture_dimension_2d)?;
        Ok(self.upload(device, queue, label, image))
    }

    fn blank_texture(&self, device: &wgpu::Device, queue: &wgpu::Queue, label: &str) -> BodyTexture {
        self.upload(device, queue, label, &DecodedImage::blank())
    }

    /// Upload an already validated image.
    fn upload(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: &DecodedImage,
    ) -> BodyTexture {
        let (width, height) = (image.width, image.height);
        let mip_levels = mip_level_count(width, height);
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: BODY_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        self.mipmaps.generate(device, queue, &texture);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = texture_sampler_bind_group(
            device,
            &self.bind_group_layout,
            &view,
            &self.sampler,
            &format!("{label}-bind-group"),
        );

        BodyTexture {
            texture,
            view,
            bind_group,
            dimensions: (width, height),
            mip_level_count: mip_levels,
        }
    }
}
