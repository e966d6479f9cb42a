//! Sprite loading: frame decoding, collision masks, the sprite registry and
//! the decode/upload queue.

mod buffer;
mod image_set;
mod mask;
mod sprite;
mod sprite_queue;
mod upload;

#[cfg(test)]
mod tests;

pub use buffer::ImageBuffer;
pub use image_set::ImageSet;
pub use mask::{Mask, Point};
pub use sprite::Sprite;
pub use sprite_queue::SpriteQueue;
pub use upload::{Headless, UploadTarget};

use crate::asset_set::AssetSet;

/// Registry of every sprite by canonical name.
pub type SpriteSet = AssetSet<Sprite>;
