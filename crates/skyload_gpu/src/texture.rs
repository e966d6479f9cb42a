use crate::config::TextureConfig;
use crate::context::GpuContext;
use crate::error::{GpuError, Result};

/// One sprite's pixels on the GPU: a 2D array texture with one layer per
/// animation frame.
pub struct SpriteTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
    pub frames: u32,
}

impl SpriteTexture {
    /// Create a texture from tightly packed RGBA8 frames using the context's
    /// texture configuration.
    ///
    /// `data` holds `frames` consecutive `width * height` images.
    pub fn from_frames(
        ctx: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        frames: u32,
    ) -> Result<Self> {
        Self::from_frames_with_config(ctx, data, width, height, frames, &ctx.config.texture)
    }

    /// Create a texture from tightly packed RGBA8 frames with custom configuration.
    pub fn from_frames_with_config(
        ctx: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        frames: u32,
        config: &TextureConfig,
    ) -> Result<Self> {
        if width == 0 || height == 0 || frames == 0 {
            return Err(GpuError::Texture(format!(
                "Empty texture requested: {}x{} with {} frames",
                width, height, frames
            )));
        }

        let max_dimension = ctx.max_texture_dimension();
        if width > max_dimension || height > max_dimension {
            return Err(GpuError::Texture(format!(
                "{}x{} exceeds the device limit of {} pixels",
                width, height, max_dimension
            )));
        }
        if frames > ctx.max_frames() {
            return Err(GpuError::Texture(format!(
                "{} frames exceeds the device limit of {} layers",
                frames,
                ctx.max_frames()
            )));
        }

        let frame_bytes = (width as usize) * (height as usize) * 4;
        let expected_size = frame_bytes * frames as usize;
        if data.len() != expected_size {
            return Err(GpuError::Texture(format!(
                "Invalid data size: expected {} bytes for {}x{}x{} RGBA8, got {}",
                expected_size,
                width,
                height,
                frames,
                data.len()
            )));
        }

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(config.label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: frames,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (frame, pixels) in data.chunks_exact(frame_bytes).enumerate() {
            ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: frame as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        log::trace!("Created {}x{} sprite texture with {} frames", width, height, frames);

        Ok(Self {
            texture,
            view,
            width,
            height,
            frames,
        })
    }

    /// Bytes of texture memory held by this sprite.
    pub fn byte_size(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height) * u64::from(self.frames) * 4
    }
}

impl Drop for SpriteTexture {
    fn drop(&mut self) {
        self.texture.destroy();
    }
}
