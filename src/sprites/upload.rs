//! Where decoded sprites go on the main thread.
//!
//! The sprite queue hands each decoded buffer to an [`UploadTarget`]. With a
//! GPU this creates a texture; [`Headless`] skips the GPU entirely and only
//! the sprite's size and frame count are installed.

use skyload_gpu::{GpuContext, SpriteTexture};

use super::ImageBuffer;

/// Creates GPU textures from decoded frames. Called on the main thread only.
pub trait UploadTarget {
    /// Upload every frame of `image` for sprite `name`.
    ///
    /// `Ok(None)` means nothing was uploaded and the sprite is installed
    /// without a texture.
    fn upload(&mut self, name: &str, image: &ImageBuffer) -> skyload_gpu::Result<Option<SpriteTexture>>;
}

/// Upload target that never touches a GPU.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl UploadTarget for Headless {
    fn upload(&mut self, _name: &str, _image: &ImageBuffer) -> skyload_gpu::Result<Option<SpriteTexture>> {
        Ok(None)
    }
}

impl UploadTarget for GpuContext {
    fn upload(&mut self, name: &str, image: &ImageBuffer) -> skyload_gpu::Result<Option<SpriteTexture>> {
        let frames = u32::try_from(image.frames()).map_err(|_| {
            skyload_gpu::GpuError::Texture(format!("\"{}\" has too many frames", name))
        })?;
        let texture = SpriteTexture::from_frames(self, image.pixels(), image.width(), image.height(), frames)?;
        log::trace!(
            "Uploaded \"{}\" ({}x{} x{} frames, {} bytes)",
            name,
            texture.width,
            texture.height,
            texture.frames,
            texture.byte_size()
        );
        Ok(Some(texture))
    }
}
