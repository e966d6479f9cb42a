//! Scenario tests for the sprite pipeline.
//!
//! PNG fixtures are written with the `image` crate into temporary
//! directories. Uploads go to a recording target that keeps every buffer and
//! the thread it arrived on.

mod image_set_tests;

use std::path::{Path, PathBuf};
use std::thread::{self, ThreadId};

use ::image::{Rgba, RgbaImage};
use skyload_gpu::{GpuError, SpriteTexture};

use crate::sprites::{ImageBuffer, UploadTarget};

/// Write a solid-color PNG at `dir/relative`, creating parent directories.
pub(crate) fn write_png(dir: &Path, relative: &str, width: u32, height: u32, color: [u8; 4]) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    RgbaImage::from_pixel(width, height, Rgba(color))
        .save(&path)
        .unwrap();
    path
}

/// One call to [`RecordingTarget::upload`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedUpload {
    pub name: String,
    pub thread: ThreadId,
    pub frames: usize,
    pub pixels: Vec<u8>,
}

/// Upload target that records instead of touching a GPU.
#[derive(Debug, Default)]
pub(crate) struct RecordingTarget {
    pub uploads: Vec<RecordedUpload>,
}

impl UploadTarget for RecordingTarget {
    fn upload(&mut self, name: &str, image: &ImageBuffer) -> skyload_gpu::Result<Option<SpriteTexture>> {
        self.uploads.push(RecordedUpload {
            name: name.to_string(),
            thread: thread::current().id(),
            frames: image.frames(),
            pixels: image.pixels().to_vec(),
        });
        Ok(None)
    }
}

/// Upload target whose every upload fails.
pub(crate) struct FailingTarget;

impl UploadTarget for FailingTarget {
    fn upload(&mut self, name: &str, _image: &ImageBuffer) -> skyload_gpu::Result<Option<SpriteTexture>> {
        Err(GpuError::Texture(format!("no room for \"{}\"", name)))
    }
}
