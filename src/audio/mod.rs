//! Sound loading: WAV decoding, the sound registry and its worker queue.

mod sound;
mod sound_queue;
pub mod wav;

#[cfg(test)]
mod tests;

pub use sound::Sound;
pub use sound_queue::{SoundEntry, SoundQueue};
pub use wav::{SAMPLE_RATE, read_wav, to_stereo, write_wav};

use crate::asset_set::AssetSet;

/// Registry of every sound by canonical name.
pub type SoundSet = AssetSet<Sound>;
