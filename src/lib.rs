//! skyload - concurrent sprite and sound loading for a 2D space game.
//!
//! Worker threads decode image frames and WAV files in the background while
//! the main thread pulls decoded sprites off the queue and uploads them as
//! GPU textures, a bounded number per frame. Assets are handed out by name as
//! shared handles before they load and are filled in place once ready.

pub mod asset_set;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod names;
pub mod pipeline;
pub mod progress;
pub mod sources;
pub mod sprites;

#[cfg(test)]
pub(crate) mod test_log;

pub use asset_set::{AssetSet, NamedAsset};
pub use audio::{Sound, SoundEntry, SoundQueue, SoundSet};
pub use config::{LogLevel, PipelineConfig};
pub use error::{ConfigError, ImageError, PipelineError, WavError};
pub use names::BlendMode;
pub use pipeline::AssetPipeline;
pub use progress::{LoadProgress, ProgressSource, QueueCounts};
pub use sources::AssetSources;
pub use sprites::{ImageBuffer, ImageSet, Mask, Sprite, SpriteQueue, SpriteSet};
