//! A single logical sound clip.
//!
//! A `Sound` is created empty by the set (as a placeholder) and filled in by a
//! sound worker. Each clip has up to two interleaved stereo buffers: the normal
//! one and the `@3x` alternate-pitch variant. Readers always see either the
//! old buffer or the fully decoded new one, never a partial write.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;

use super::wav::{read_wav, to_stereo};
use crate::asset_set::NamedAsset;
use crate::error::WavError;
use crate::names;

#[derive(Debug, Default)]
struct SoundState {
    name: String,
    buffer: Option<Arc<[i16]>>,
    alternate: Option<Arc<[i16]>>,
    looping: bool,
}

/// Decoded PCM for one sound name.
#[derive(Debug, Default)]
pub struct Sound {
    state: RwLock<SoundState>,
}

impl Sound {
    /// Decode `path` and install it under `name`.
    ///
    /// The file stem decides which buffer is filled (`@3x` = alternate) and
    /// whether the sound loops (`~`). On failure the error is logged, the name
    /// is still recorded and the buffers are left as they were.
    pub fn load(&self, path: &Path, name: &str) -> bool {
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default();
        let looping = names::is_looping_stem(stem);
        let stem = stem.strip_suffix('~').unwrap_or(stem);
        let alternate = names::is_alternate_stem(stem);

        let decoded = decode_file(path);

        let mut state = self.state.write();
        state.name = name.to_string();
        match decoded {
            Ok(samples) => {
                let samples: Arc<[i16]> = Arc::from(to_stereo(&samples));
                log::debug!(
                    "Loaded sound \"{}\" from {:?} ({} stereo samples{})",
                    name,
                    path,
                    samples.len(),
                    if alternate { ", alternate" } else { "" }
                );
                if alternate {
                    state.alternate = Some(samples);
                } else {
                    state.buffer = Some(samples);
                }
                state.looping |= looping;
                true
            }
            Err(e) => {
                log::error!("Failed to load sound \"{}\" from {:?}: {}", name, path, e);
                false
            }
        }
    }

    /// Canonical name, empty until a load has been attempted.
    pub fn name(&self) -> String {
        self.state.read().name.clone()
    }

    /// Normal buffer, falling back to the alternate; empty if neither loaded.
    pub fn buffer(&self) -> Arc<[i16]> {
        let state = self.state.read();
        state
            .buffer
            .as_ref()
            .or(state.alternate.as_ref())
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    /// Alternate-pitch buffer, falling back to the normal one.
    pub fn alternate_buffer(&self) -> Arc<[i16]> {
        let state = self.state.read();
        state
            .alternate
            .as_ref()
            .or(state.buffer.as_ref())
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    /// Whether either buffer holds samples.
    pub fn is_loaded(&self) -> bool {
        let state = self.state.read();
        state.buffer.is_some() || state.alternate.is_some()
    }

    pub fn is_looping(&self) -> bool {
        self.state.read().looping
    }
}

impl NamedAsset for Sound {
    const KIND: &'static str = "sound";

    fn is_placeholder(&self) -> bool {
        self.state.read().name.is_empty()
    }
}

fn decode_file(path: &Path) -> Result<Vec<i16>, WavError> {
    let file = File::open(path)?;
    read_wav(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::wav::write_wav;

    fn write_clip(dir: &Path, file_name: &str, samples: &[i16]) -> std::path::PathBuf {
        let path = dir.join(file_name);
        write_wav(File::create(&path).unwrap(), samples).unwrap();
        path
    }

    #[test]
    fn test_placeholder_is_empty() {
        let sound = Sound::default();
        assert!(sound.is_placeholder());
        assert!(sound.buffer().is_empty());
        assert!(!sound.is_looping());
        assert!(!sound.is_loaded());
    }

    #[test]
    fn test_load_interleaves_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_clip(dir.path(), "beep.wav", &[10, -20, 30]);

        let sound = Sound::default();
        assert!(sound.load(&path, "beep"));
        assert_eq!(sound.name(), "beep");
        assert_eq!(&*sound.buffer(), &[10, 10, -20, -20, 30, 30]);
        assert!(!sound.is_looping());
    }

    #[test]
    fn test_alternate_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_clip(dir.path(), "engine@3x~.wav", &[7]);

        let sound = Sound::default();
        assert!(sound.load(&path, "engine"));
        assert!(sound.is_looping());
        // Only the alternate exists, so both lookups return it.
        assert_eq!(&*sound.buffer(), &[7, 7]);
        assert_eq!(&*sound.alternate_buffer(), &[7, 7]);

        let normal = write_clip(dir.path(), "engine~.wav", &[1, 2]);
        assert!(sound.load(&normal, "engine"));
        assert_eq!(&*sound.buffer(), &[1, 1, 2, 2]);
        assert_eq!(&*sound.alternate_buffer(), &[7, 7]);
    }

    #[test]
    fn test_failed_load_sets_name_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.wav");

        let sound = Sound::default();
        assert!(!sound.load(&path, "missing"));
        assert_eq!(sound.name(), "missing");
        assert!(!sound.is_placeholder());
        assert!(sound.buffer().is_empty());
    }
}
