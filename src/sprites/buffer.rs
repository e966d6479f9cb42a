//! Multi-frame RGBA pixel buffer.
//!
//! All frames of a sprite share one allocation, laid out frame after frame,
//! row after row, four bytes per pixel. The size is fixed by the first frame
//! that is read; later frames must match it.

use std::path::Path;

use crate::error::ImageError;
use crate::names::{self, BlendMode};

/// Decoded pixels for every frame of one sprite variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    frames: usize,
    pixels: Vec<u8>,
}

impl ImageBuffer {
    /// Create an unallocated buffer that will hold `frames` frames.
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            ..Self::default()
        }
    }

    /// Drop the pixels and resize for `frames` frames.
    pub fn clear(&mut self, frames: usize) {
        self.width = 0;
        self.height = 0;
        self.frames = frames;
        self.pixels = Vec::new();
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Whether no pixels have been allocated.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Every frame's pixels, contiguous.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Pixels of one frame, or `None` if the buffer is empty or too short.
    pub fn frame_pixels(&self, frame: usize) -> Option<&[u8]> {
        let len = self.frame_len();
        let start = frame.checked_mul(len)?;
        self.pixels.get(start..start + len).filter(|p| !p.is_empty())
    }

    /// Alpha value at pixel (`x`, `y`) of `frame`.
    pub fn alpha(&self, frame: usize, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.frame_pixels(frame)
            .map(|pixels| pixels[(y as usize * self.width as usize + x as usize) * 4 + 3])
            .unwrap_or(0)
    }

    fn allocate(&mut self, width: u32, height: u32) {
        if !self.pixels.is_empty() || width == 0 || height == 0 || self.frames == 0 {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; self.frame_len() * self.frames];
    }

    /// Decode `path` into `frame`, premultiplying alpha for `blend`.
    ///
    /// The first successful read allocates the buffer at that image's size.
    pub fn read(&mut self, path: &Path, frame: usize, blend: BlendMode) -> Result<(), ImageError> {
        if !names::is_image_file(path) {
            return Err(ImageError::UnsupportedExtension {
                path: path.to_path_buf(),
            });
        }
        if frame >= self.frames {
            return Err(ImageError::FrameIndex {
                frame,
                frames: self.frames,
            });
        }

        let bytes = std::fs::read(path).map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let img = ::image::load_from_memory(&bytes)
            .map_err(|source| ImageError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();

        self.allocate(img.width(), img.height());
        if img.width() != self.width || img.height() != self.height {
            return Err(ImageError::FrameSize {
                frame,
                width: self.width,
                height: self.height,
                actual_width: img.width(),
                actual_height: img.height(),
            });
        }

        let len = self.frame_len();
        let start = frame * len;
        let target = &mut self.pixels[start..start + len];
        target.copy_from_slice(img.as_raw());

        // JPEG has no alpha channel, so only the additive modes change it.
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        let premultiply = match blend {
            BlendMode::Premultiplied => false,
            BlendMode::Additive | BlendMode::HalfAdditive => true,
            BlendMode::Alpha => is_png,
        };
        if premultiply {
            premultiply_alpha(target, blend);
        }

        log::trace!(
            "Read {:?} into frame {} ({}x{})",
            path,
            frame,
            self.width,
            self.height
        );
        Ok(())
    }

    /// Decode a single still image synchronously.
    pub fn decode_file(path: &Path, blend: BlendMode) -> Result<Self, ImageError> {
        let mut buffer = Self::new(1);
        buffer.read(path, 0, blend)?;
        Ok(buffer)
    }
}

/// Scale RGB by alpha, then adjust alpha for additive blending.
fn premultiply_alpha(pixels: &mut [u8], blend: BlendMode) {
    for pixel in pixels.chunks_exact_mut(4) {
        let alpha = u16::from(pixel[3]);
        for channel in &mut pixel[..3] {
            *channel = (u16::from(*channel) * alpha / 255) as u8;
        }
        pixel[3] = match blend {
            BlendMode::HalfAdditive => pixel[3] >> 2,
            BlendMode::Additive => 0,
            _ => pixel[3],
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 4]) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbaImage::from_pixel(width, height, Rgba(color))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_premultiply_modes() {
        let mut pixels = [200, 100, 50, 128];
        premultiply_alpha(&mut pixels, BlendMode::Alpha);
        assert_eq!(pixels, [100, 50, 25, 128]);

        let mut pixels = [200, 100, 50, 128];
        premultiply_alpha(&mut pixels, BlendMode::HalfAdditive);
        assert_eq!(pixels, [100, 50, 25, 32]);

        let mut pixels = [200, 100, 50, 128];
        premultiply_alpha(&mut pixels, BlendMode::Additive);
        assert_eq!(pixels, [100, 50, 25, 0]);
    }

    #[test]
    fn test_read_frames() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 4, 2, [255, 0, 0, 255]);
        let b = write_png(dir.path(), "b.png", 4, 2, [0, 255, 0, 255]);

        let mut buffer = ImageBuffer::new(2);
        assert!(buffer.is_empty());
        buffer.read(&a, 0, BlendMode::Alpha).unwrap();
        buffer.read(&b, 1, BlendMode::Alpha).unwrap();

        assert_eq!((buffer.width(), buffer.height(), buffer.frames()), (4, 2, 2));
        assert_eq!(buffer.pixels().len(), 4 * 2 * 4 * 2);
        assert_eq!(&buffer.frame_pixels(0).unwrap()[..4], &[255, 0, 0, 255]);
        assert_eq!(&buffer.frame_pixels(1).unwrap()[..4], &[0, 255, 0, 255]);
        assert!(buffer.frame_pixels(2).is_none());
        assert_eq!(buffer.alpha(1, 3, 1), 255);
        assert_eq!(buffer.alpha(1, 4, 1), 0);
    }

    #[test]
    fn test_frame_size_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 4, 4, [1, 2, 3, 255]);
        let b = write_png(dir.path(), "b.png", 2, 2, [1, 2, 3, 255]);

        let mut buffer = ImageBuffer::new(2);
        buffer.read(&a, 0, BlendMode::Alpha).unwrap();
        let err = buffer.read(&b, 1, BlendMode::Alpha).unwrap_err();
        assert!(matches!(
            err,
            ImageError::FrameSize {
                frame: 1,
                actual_width: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_read_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut buffer = ImageBuffer::new(1);

        let missing = dir.path().join("missing.png");
        assert!(matches!(
            buffer.read(&missing, 0, BlendMode::Alpha),
            Err(ImageError::Io { .. })
        ));

        let garbage = dir.path().join("garbage.png");
        std::fs::write(&garbage, b"not a png").unwrap();
        assert!(matches!(
            buffer.read(&garbage, 0, BlendMode::Alpha),
            Err(ImageError::Decode { .. })
        ));

        let text = dir.path().join("notes.txt");
        assert!(matches!(
            buffer.read(&text, 0, BlendMode::Alpha),
            Err(ImageError::UnsupportedExtension { .. })
        ));

        let ok = write_png(dir.path(), "ok.png", 1, 1, [0, 0, 0, 0]);
        assert!(matches!(
            buffer.read(&ok, 1, BlendMode::Alpha),
            Err(ImageError::FrameIndex { frame: 1, frames: 1 })
        ));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_premultiplied_file_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "glow.png", 1, 1, [200, 100, 50, 128]);

        let plain = ImageBuffer::decode_file(&path, BlendMode::Premultiplied).unwrap();
        assert_eq!(plain.pixels(), &[200, 100, 50, 128]);

        let alpha = ImageBuffer::decode_file(&path, BlendMode::Alpha).unwrap();
        assert_eq!(alpha.pixels(), &[100, 50, 25, 128]);
    }
}
