//! GPU-side representation of one sprite.
//!
//! A `Sprite` starts out as a nameless placeholder handed out by the set.
//! The main thread later installs its dimensions, textures and masks in
//! place, so handles taken early see the loaded sprite. Besides the frames
//! themselves a sprite may carry swizzle mask textures, which mark the pixels
//! that take on a ship's color scheme.

use std::sync::Arc;

use parking_lot::RwLock;
use skyload_gpu::SpriteTexture;

use super::Mask;
use crate::asset_set::NamedAsset;

#[derive(Default)]
struct SpriteState {
    name: String,
    width: u32,
    height: u32,
    frames: usize,
    texture: Option<SpriteTexture>,
    high_dpi_texture: Option<SpriteTexture>,
    swizzle_mask: Option<SpriteTexture>,
    high_dpi_swizzle_mask: Option<SpriteTexture>,
    masks: Arc<[Mask]>,
}

/// Everything the upload stage produced for one sprite.
pub(crate) struct SpriteData {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub frames: usize,
    pub texture: Option<SpriteTexture>,
    pub high_dpi_texture: Option<SpriteTexture>,
    pub swizzle_mask: Option<SpriteTexture>,
    pub high_dpi_swizzle_mask: Option<SpriteTexture>,
    pub masks: Vec<Mask>,
}

/// A sprite as seen by the renderer.
#[derive(Default)]
pub struct Sprite {
    state: RwLock<SpriteState>,
}

impl Sprite {
    /// Replace this sprite's contents. Main thread only.
    pub(crate) fn install(&self, data: SpriteData) {
        let mut state = self.state.write();
        state.name = data.name;
        state.width = data.width;
        state.height = data.height;
        state.frames = data.frames;
        state.texture = data.texture;
        state.high_dpi_texture = data.high_dpi_texture;
        state.swizzle_mask = data.swizzle_mask;
        state.high_dpi_swizzle_mask = data.high_dpi_swizzle_mask;
        state.masks = Arc::from(data.masks);
    }

    /// Free the textures, keeping name, size and masks. Main thread only.
    pub(crate) fn unload(&self) {
        let mut state = self.state.write();
        state.texture = None;
        state.high_dpi_texture = None;
        state.swizzle_mask = None;
        state.high_dpi_swizzle_mask = None;
    }

    /// Canonical name, empty for a placeholder.
    pub fn name(&self) -> String {
        self.state.read().name.clone()
    }

    /// Width of one frame in pixels.
    pub fn width(&self) -> u32 {
        self.state.read().width
    }

    /// Height of one frame in pixels.
    pub fn height(&self) -> u32 {
        self.state.read().height
    }

    /// Number of animation frames, 0 for a placeholder or failed decode.
    pub fn frames(&self) -> usize {
        self.state.read().frames
    }

    /// Collision masks, one per frame for masked sprites.
    pub fn masks(&self) -> Arc<[Mask]> {
        Arc::clone(&self.state.read().masks)
    }

    /// Whether a normal-resolution texture is resident.
    pub fn has_texture(&self) -> bool {
        self.state.read().texture.is_some()
    }

    pub fn has_high_dpi_texture(&self) -> bool {
        self.state.read().high_dpi_texture.is_some()
    }

    /// Run `f` with the texture to draw, preferring `@2x` when asked and present.
    pub fn with_texture<R>(&self, high_dpi: bool, f: impl FnOnce(Option<&SpriteTexture>) -> R) -> R {
        let state = self.state.read();
        let texture = if high_dpi {
            state.high_dpi_texture.as_ref().or(state.texture.as_ref())
        } else {
            state.texture.as_ref()
        };
        f(texture)
    }

    /// Whether a normal-resolution swizzle mask texture is resident.
    pub fn has_swizzle_mask(&self) -> bool {
        self.state.read().swizzle_mask.is_some()
    }

    /// Run `f` with the swizzle mask to draw with, preferring `@2x` when asked
    /// and present.
    pub fn with_swizzle_mask<R>(&self, high_dpi: bool, f: impl FnOnce(Option<&SpriteTexture>) -> R) -> R {
        let state = self.state.read();
        let mask = if high_dpi {
            state.high_dpi_swizzle_mask.as_ref().or(state.swizzle_mask.as_ref())
        } else {
            state.swizzle_mask.as_ref()
        };
        f(mask)
    }
}

impl NamedAsset for Sprite {
    const KIND: &'static str = "sprite";

    fn is_placeholder(&self) -> bool {
        self.state.read().name.is_empty()
    }
}

impl std::fmt::Debug for Sprite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Sprite")
            .field("name", &state.name)
            .field("width", &state.width)
            .field("height", &state.height)
            .field("frames", &state.frames)
            .field("texture", &state.texture.is_some())
            .field("high_dpi_texture", &state.high_dpi_texture.is_some())
            .field("swizzle_mask", &state.swizzle_mask.is_some())
            .field("masks", &state.masks.len())
            .finish()
    }
}
