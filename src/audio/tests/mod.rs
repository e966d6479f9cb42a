//! Scenario tests for the sound pipeline.
//!
//! Fixtures are written into temporary directories with the crate's own WAV
//! writer, then pushed through a real `SoundQueue`.


use std::fs::File;
use std::path::{Path, PathBuf};

use crate::audio::write_wav;

/// Write a valid 44.1 kHz mono clip of `samples` samples.
pub(crate) fn write_clip(dir: &Path, relative: &str, samples: usize) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let data: Vec<i16> = (0..samples).map(|i| (i % 200) as i16 - 100).collect();
    write_wav(File::create(&path).unwrap(), &data).unwrap();
    path
}

/// Write a clip whose header declares two channels.
pub(crate) fn write_stereo_clip(dir: &Path, relative: &str) -> PathBuf {
    let path = dir.join(relative);
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&44_100u32.to_le_bytes());
    bytes.extend_from_slice(&176_400u32.to_le_bytes());
    bytes.extend_from_slice(&4u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&4u32.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    std::fs::write(&path, bytes).unwrap();
    path
}
