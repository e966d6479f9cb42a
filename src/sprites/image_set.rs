//! The unit of work for the sprite queue: every frame file of one sprite.
//!
//! Paths are filed by variant (normal, `@2x`, `@sw` swizzle mask or
//! `@sw@2x`) and frame index as they are added, reduced to a consecutive run
//! by [`ImageSet::validate_frames`] on the main thread, then decoded by
//! [`ImageSet::load`] on a worker thread.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{ImageBuffer, Mask};
use crate::names::{self, BlendMode};

const NORMAL: usize = 0;
const HIGH_DPI: usize = 1;
const SWIZZLE_MASK: usize = 2;
const HIGH_DPI_SWIZZLE_MASK: usize = 3;
const VARIANTS: usize = 4;

/// How each variant is named in log messages.
const VARIANT_LABELS: [&str; VARIANTS] = ["", "@2x", "mask", "@2x mask"];

/// Sprite directories whose frames get collision masks.
const MASKED_DIRECTORIES: &[&str] = &["ship", "asteroid"];

/// Sprite prefixes that are drawn at half scale and blur on odd sizes.
const HALF_SCALE_PREFIXES: &[&str] = &["ship/", "outfit/", "thumbnail/"];

fn variant_index(high_dpi: bool, swizzle_mask: bool) -> usize {
    usize::from(high_dpi) + 2 * usize::from(swizzle_mask)
}

/// Label followed by a space, or nothing for the normal variant.
fn variant_prefix(variant: usize) -> String {
    match VARIANT_LABELS[variant] {
        "" => String::new(),
        label => format!("{} ", label),
    }
}

/// All frame files of one sprite, and their decoded pixels once loaded.
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    name: String,
    blend: BlendMode,
    /// Paths as added, keyed by frame index.
    frame_paths: [BTreeMap<usize, PathBuf>; VARIANTS],
    /// Validated, consecutive frame paths.
    paths: [Vec<PathBuf>; VARIANTS],
    buffers: [ImageBuffer; VARIANTS],
    masks: Vec<Mask>,
}

impl ImageSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Blending mode taken from the first normal frame's file name.
    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    /// Whether no frame files have been added or validated.
    pub fn is_empty(&self) -> bool {
        self.frame_paths.iter().all(BTreeMap::is_empty) && self.paths.iter().all(Vec::is_empty)
    }

    /// File one frame under its variant and index.
    ///
    /// The index and variant come from the file name. A second file for the
    /// same slot replaces the first.
    pub fn add(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let Some(parsed) = path
            .file_name()
            .and_then(|file_name| file_name.to_str())
            .and_then(names::parse_sprite_path)
        else {
            log::warn!(
                "Sprite \"{}\": ignoring {:?}, not a sprite frame name",
                self.name,
                path
            );
            return;
        };

        let variant = variant_index(parsed.high_dpi, parsed.swizzle_mask);
        if variant == NORMAL && parsed.frame == 0 {
            self.blend = parsed.blend;
        }
        self.frame_paths[variant].insert(parsed.frame, path);
    }

    /// Reduce the added paths to consecutive runs starting at frame 0.
    ///
    /// Frames after a gap, and `@2x` or mask frames beyond the normal frame
    /// count, are dropped with an error log. A swizzle mask given for frame 0
    /// only is repeated for every frame. Calling it again without adding
    /// anything keeps the current result.
    pub fn validate_frames(&mut self) {
        if self.frame_paths.iter().all(BTreeMap::is_empty) {
            return;
        }

        for variant in 0..VARIANTS {
            let frame_paths = std::mem::take(&mut self.frame_paths[variant]);
            self.paths[variant] = self.consecutive_frames(frame_paths, variant);
        }

        let frames = self.paths[NORMAL].len();
        for variant in [HIGH_DPI, SWIZZLE_MASK, HIGH_DPI_SWIZZLE_MASK] {
            let paths = &mut self.paths[variant];
            if paths.len() > frames {
                log::error!(
                    "Sprite \"{}\": {} extra frames for the {} sprite will be ignored.",
                    self.name,
                    paths.len() - frames,
                    VARIANT_LABELS[variant]
                );
                paths.truncate(frames);
            }
        }

        for variant in [SWIZZLE_MASK, HIGH_DPI_SWIZZLE_MASK] {
            let paths = &mut self.paths[variant];
            if paths.len() == 1 && frames > 1 {
                let first = paths[0].clone();
                paths.resize(frames, first);
            }
        }
    }

    fn consecutive_frames(&self, frame_paths: BTreeMap<usize, PathBuf>, variant: usize) -> Vec<PathBuf> {
        let label = variant_prefix(variant);
        let total = frame_paths.len();
        let Some(&first) = frame_paths.keys().next() else {
            return Vec::new();
        };
        if first != 0 {
            log::error!(
                "Sprite \"{}\": ignored {}frame {} ({} ignored in total). Animations must start at frame 0.",
                self.name,
                label,
                first,
                total
            );
            return Vec::new();
        }

        let run: Vec<PathBuf> = frame_paths
            .into_iter()
            .enumerate()
            .take_while(|(expected, (frame, _))| expected == frame)
            .map(|(_, (_, path))| path)
            .collect();

        if run.len() < total {
            let ignored = total - run.len();
            log::error!(
                "Sprite \"{}\": missing {}frame {} ({} {} ignored in total).",
                self.name,
                label,
                run.len(),
                ignored,
                if ignored > 1 { "frames" } else { "frame" }
            );
        }
        run
    }

    /// Validated paths for the normal (`false`) or `@2x` (`true`) variant.
    pub fn paths(&self, high_dpi: bool) -> &[PathBuf] {
        &self.paths[variant_index(high_dpi, false)]
    }

    /// Validated swizzle mask paths for the `@sw` (`false`) or `@sw@2x`
    /// (`true`) variant.
    pub fn swizzle_mask_paths(&self, high_dpi: bool) -> &[PathBuf] {
        &self.paths[variant_index(high_dpi, true)]
    }

    /// Number of animation frames (normal variant).
    pub fn frame_count(&self) -> usize {
        self.paths[NORMAL].len()
    }

    /// Whether frames of this sprite get collision masks.
    pub fn needs_masks(&self) -> bool {
        Path::new(&self.name)
            .iter()
            .next()
            .and_then(|first| first.to_str())
            .is_some_and(|first| MASKED_DIRECTORIES.contains(&first))
    }

    /// Decode every frame. Runs on a worker thread.
    ///
    /// A normal frame that fails to read is logged and left blank. A failing
    /// `@2x` or mask frame discards that whole variant.
    pub fn load(&mut self) {
        if self.frame_paths.iter().any(|paths| !paths.is_empty()) {
            log::warn!(
                "Sprite \"{}\": loading without validated frames; validating now",
                self.name
            );
            self.validate_frames();
        }

        let frames = self.paths[NORMAL].len();
        for buffer in &mut self.buffers {
            buffer.clear(frames);
        }

        let make_masks = self.needs_masks();
        self.masks = Vec::with_capacity(if make_masks { frames } else { 0 });

        for (frame, path) in self.paths[NORMAL].iter().enumerate() {
            let read = self.buffers[NORMAL].read(path, frame, self.blend);
            if let Err(e) = &read {
                log::error!(
                    "Failed to read image data for \"{}\" frame #{}: {}",
                    self.name,
                    frame,
                    e
                );
            }
            if make_masks {
                let mask = if read.is_ok() {
                    Mask::create(&self.buffers[NORMAL], frame, &self.name)
                } else {
                    Mask::default()
                };
                if !mask.is_loaded() {
                    log::error!(
                        "Failed to create collision mask for \"{}\" frame #{}",
                        self.name,
                        frame
                    );
                }
                self.masks.push(mask);
            }
        }

        for variant in [HIGH_DPI, SWIZZLE_MASK, HIGH_DPI_SWIZZLE_MASK] {
            for (frame, path) in self.paths[variant].iter().enumerate().take(frames) {
                if let Err(e) = self.buffers[variant].read(path, frame, self.blend) {
                    log::error!(
                        "Removing {}frames for \"{}\" due to read error: {}",
                        variant_prefix(variant),
                        self.name,
                        e
                    );
                    self.buffers[variant].clear(frames);
                    break;
                }
            }
        }

        let buffer = &self.buffers[NORMAL];
        let odd = buffer.width() % 2 == 1 || buffer.height() % 2 == 1;
        if odd
            && HALF_SCALE_PREFIXES
                .iter()
                .any(|prefix| self.name.len() > prefix.len() && self.name.starts_with(prefix))
        {
            log::warn!(
                "Image \"{}\" will be blurry since width and/or height are not even ({}x{}).",
                self.name,
                buffer.width(),
                buffer.height()
            );
        }

        let extras: Vec<&str> = [HIGH_DPI, SWIZZLE_MASK, HIGH_DPI_SWIZZLE_MASK]
            .into_iter()
            .filter(|&variant| !self.buffers[variant].is_empty())
            .map(|variant| VARIANT_LABELS[variant])
            .collect();
        log::debug!(
            "Decoded sprite \"{}\": {} frames, {}x{}{}",
            self.name,
            frames,
            buffer.width(),
            buffer.height(),
            if extras.is_empty() {
                String::new()
            } else {
                format!(" (+{})", extras.join(", +"))
            }
        );
    }

    /// Decoded normal-resolution frames.
    pub fn buffer(&self) -> &ImageBuffer {
        &self.buffers[NORMAL]
    }

    /// Decoded `@2x` frames; empty if there are none or they failed.
    pub fn high_dpi_buffer(&self) -> &ImageBuffer {
        &self.buffers[HIGH_DPI]
    }

    /// Decoded `@sw` swizzle mask frames; empty if there are none or they failed.
    pub fn swizzle_mask_buffer(&self) -> &ImageBuffer {
        &self.buffers[SWIZZLE_MASK]
    }

    pub fn high_dpi_swizzle_mask_buffer(&self) -> &ImageBuffer {
        &self.buffers[HIGH_DPI_SWIZZLE_MASK]
    }

    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    /// Release the decoded pixels and hand over the masks, keeping the paths
    /// so the set can be loaded again.
    pub(crate) fn take_decoded(&mut self) -> Vec<Mask> {
        let frames = self.paths[NORMAL].len();
        for buffer in &mut self.buffers {
            buffer.clear(frames);
        }
        std::mem::take(&mut self.masks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_files_frames_by_index() {
        let mut set = ImageSet::new("effect/flare");
        assert!(set.is_empty());
        set.add("/data/images/effect/flare+2.png");
        set.add("/data/images/effect/flare+0.png");
        set.add("/data/images/effect/flare+1.png");
        set.add("/data/images/effect/flare+0@2x.png");
        set.validate_frames();

        assert!(!set.is_empty());
        assert_eq!(set.blend(), BlendMode::Additive);
        assert_eq!(set.frame_count(), 3);
        assert_eq!(
            set.paths(false),
            &[
                PathBuf::from("/data/images/effect/flare+0.png"),
                PathBuf::from("/data/images/effect/flare+1.png"),
                PathBuf::from("/data/images/effect/flare+2.png"),
            ]
        );
        assert_eq!(set.paths(true).len(), 1);
    }

    #[test]
    fn test_validate_stops_at_gap() {
        let mut set = ImageSet::new("ship");
        set.add("ship-0.png");
        set.add("ship-1.png");
        set.add("ship-3.png");
        set.validate_frames();
        assert_eq!(set.frame_count(), 2);
    }

    #[test]
    fn test_validate_requires_frame_zero() {
        let mut set = ImageSet::new("ship");
        set.add("ship-1.png");
        set.add("ship-2.png");
        set.validate_frames();
        assert_eq!(set.frame_count(), 0);
    }

    #[test]
    fn test_extra_high_dpi_frames_dropped() {
        let mut set = ImageSet::new("ship");
        set.add("ship.png");
        set.add("ship-0@2x.png");
        set.add("ship-1@2x.png");
        set.validate_frames();
        assert_eq!(set.frame_count(), 1);
        assert_eq!(set.paths(true).len(), 1);
    }

    #[test]
    fn test_swizzle_masks_filed_separately() {
        let mut set = ImageSet::new("ship/kestrel");
        set.add("kestrel-0.png");
        set.add("kestrel-1.png");
        set.add("kestrel-0@sw.png");
        set.add("kestrel-1@sw.png");
        set.add("kestrel-0@sw@2x.png");
        set.validate_frames();

        assert_eq!(set.frame_count(), 2);
        assert!(set.paths(true).is_empty());
        assert_eq!(
            set.swizzle_mask_paths(false),
            &[PathBuf::from("kestrel-0@sw.png"), PathBuf::from("kestrel-1@sw.png")]
        );
        // A single mask frame covers every frame.
        assert_eq!(
            set.swizzle_mask_paths(true),
            &[
                PathBuf::from("kestrel-0@sw@2x.png"),
                PathBuf::from("kestrel-0@sw@2x.png"),
            ]
        );
    }

    #[test]
    fn test_single_swizzle_mask_fills_every_frame() {
        let mut set = ImageSet::new("ship/kestrel");
        for frame in 0..3 {
            set.add(format!("kestrel-{}.png", frame));
        }
        set.add("kestrel@sw.png");
        set.validate_frames();
        assert_eq!(set.swizzle_mask_paths(false).len(), 3);
        assert!(set
            .swizzle_mask_paths(false)
            .iter()
            .all(|path| path == &PathBuf::from("kestrel@sw.png")));
    }

    #[test]
    fn test_extra_swizzle_mask_frames_dropped() {
        let mut set = ImageSet::new("ship/kestrel");
        set.add("kestrel-0.png");
        set.add("kestrel-1.png");
        for frame in 0..4 {
            set.add(format!("kestrel-{}@sw.png", frame));
        }
        set.validate_frames();
        assert_eq!(set.swizzle_mask_paths(false).len(), 2);
    }

    #[test]
    fn test_overflowing_frame_number_keeps_frame_zero() {
        let mut set = ImageSet::new("ship");
        set.add("ship-0.png");
        set.add("ship-99999999999999999999999.png");
        set.validate_frames();
        assert_eq!(set.paths(false), &[PathBuf::from("ship-0.png")]);
    }

    #[test]
    fn test_validate_twice_keeps_paths() {
        let mut set = ImageSet::new("ship");
        set.add("ship.png");
        set.validate_frames();
        set.validate_frames();
        assert_eq!(set.frame_count(), 1);
    }

    #[test]
    fn test_later_add_replaces_slot() {
        let mut set = ImageSet::new("ship");
        set.add("a/ship.png");
        set.add("b/ship.png");
        set.validate_frames();
        assert_eq!(set.paths(false), &[PathBuf::from("b/ship.png")]);
    }

    #[test]
    fn test_needs_masks() {
        assert!(ImageSet::new("ship/kestrel").needs_masks());
        assert!(ImageSet::new("asteroid/rock").needs_masks());
        assert!(!ImageSet::new("shipyard/dock").needs_masks());
        assert!(!ImageSet::new("planet/earth").needs_masks());
    }
}
