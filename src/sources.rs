//! Finds the sprites and sounds under a list of source directories.
//!
//! Each source root may hold an `images/` and a `sounds/` folder. Roots are
//! scanned in order and a later root overrides an earlier one per canonical
//! name: a sprite is replaced as a whole (all frames), a sound per variant.
//! This is the only dedup the pipeline does; the queues load whatever they
//! are given.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::audio::{SoundEntry, SoundQueue};
use crate::names;
use crate::sprites::{ImageSet, SpriteQueue};

/// Folder under a source root holding sprite frames.
pub const IMAGES_DIR: &str = "images";

/// Folder under a source root holding sounds.
pub const SOUNDS_DIR: &str = "sounds";

/// Everything found under the scanned roots, keyed by canonical name.
#[derive(Debug, Default)]
pub struct AssetSources {
    images: BTreeMap<String, ImageSet>,
    /// Keyed by name and whether the file is the `@3x` variant.
    sounds: BTreeMap<(String, bool), PathBuf>,
}

impl AssetSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every root in order.
    pub fn scan<P: AsRef<Path>>(roots: &[P]) -> Self {
        let mut sources = Self::new();
        for root in roots {
            sources.add_root(root.as_ref());
        }
        log::info!(
            "Found {} sprites and {} sound files in {} sources",
            sources.images.len(),
            sources.sounds.len(),
            roots.len()
        );
        sources
    }

    /// Scan one root, overriding anything earlier roots defined.
    pub fn add_root(&mut self, root: &Path) {
        if !root.is_dir() {
            log::warn!("Source {:?} is not a directory", root);
            return;
        }

        let images_root = root.join(IMAGES_DIR);
        let mut found: BTreeMap<String, ImageSet> = BTreeMap::new();
        for path in list_files(&images_root) {
            let Some(relative) = names::relative_path(&images_root, &path) else {
                continue;
            };
            let Some(parsed) = names::parse_sprite_path(&relative) else {
                log::trace!("Skipping non-sprite file {:?}", path);
                continue;
            };
            found
                .entry(parsed.name.clone())
                .or_insert_with(|| ImageSet::new(parsed.name))
                .add(path);
        }
        for (name, image_set) in found {
            if self.images.insert(name.clone(), image_set).is_some() {
                log::debug!("Sprite \"{}\" overridden by {:?}", name, root);
            }
        }

        let sounds_root = root.join(SOUNDS_DIR);
        for path in list_files(&sounds_root) {
            let Some(relative) = names::relative_path(&sounds_root, &path) else {
                continue;
            };
            let Some(parsed) = names::parse_sound_path(&relative) else {
                log::trace!("Skipping non-sound file {:?}", path);
                continue;
            };
            if let Some(previous) = self.sounds.insert((parsed.name.clone(), parsed.alternate), path) {
                log::debug!("Sound \"{}\" overrides {:?}", parsed.name, previous);
            }
        }
    }

    /// Number of distinct sprites found.
    pub fn sprite_count(&self) -> usize {
        self.images.len()
    }

    /// Number of sound files to load (a name may have two variants).
    pub fn sound_count(&self) -> usize {
        self.sounds.len()
    }

    pub fn sprite_names(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }

    pub fn image_set(&self, name: &str) -> Option<&ImageSet> {
        self.images.get(name)
    }

    /// Sound files to load, in name order.
    pub fn sound_entries(&self) -> Vec<SoundEntry> {
        self.sounds
            .iter()
            .map(|((name, _), path)| SoundEntry::new(name.clone(), path.clone()))
            .collect()
    }

    /// Hand everything to the queues. Returns how many sprites and sounds
    /// were accepted.
    pub fn enqueue(self, sprite_queue: &SpriteQueue, sound_queue: &SoundQueue) -> (usize, usize) {
        let sounds = self.sound_entries();
        let sprites = self
            .images
            .into_values()
            .map(|image_set| sprite_queue.add(image_set))
            .filter(|&accepted| accepted)
            .count();
        let sounds = sounds
            .into_iter()
            .map(|entry| sound_queue.add(entry))
            .filter(|&accepted| accepted)
            .count();
        log::debug!("Queued {} sprites and {} sounds", sprites, sounds);
        (sprites, sounds)
    }
}

/// All files under `folder`, sorted. A missing folder yields nothing.
fn list_files(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if !folder.is_dir() {
        return files;
    }
    if let Err(e) = scan_folder_recursive(folder, &mut files) {
        log::warn!("Failed to scan folder {:?}: {}", folder, e);
    }
    files.sort();
    files
}

fn scan_folder_recursive(folder: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(folder)?.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        } else if path.is_dir() {
            if let Err(e) = scan_folder_recursive(&path, files) {
                log::warn!("Failed to scan subdirectory {:?}: {}", path, e);
            }
        }
    }
    Ok(())
}
