//! Canonical asset names.
//!
//! An asset's name is its path relative to the `images/` or `sounds/` folder
//! of a source, with `/` separators, minus the extension and any marker
//! suffixes. Two files that reduce to the same name are the same asset.
//!
//! Sprite paths have the shape `<name>(<blend><frame>)(@sw)(@2x).<ext>`:
//!
//! ```text
//! ship/kestrel.png        -> "ship/kestrel", frame 0
//! ship/kestrel@2x.png     -> "ship/kestrel", frame 0, high-DPI
//! ship/kestrel@sw.png     -> "ship/kestrel", frame 0, swizzle mask
//! effect/flare+3.png      -> "effect/flare", frame 3, additive
//! planet/earth2.png       -> "planet/earth2" (no blend char, digits are part of the name)
//! ```
//!
//! Sound paths have the shape `<name>(@3x)(~).wav`, where `~` marks a looping
//! clip and `@3x` the alternate-pitch variant merged into the same name.

use std::path::Path;

/// File extensions accepted as sprite frames (lowercase, without dots).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// File extension accepted for sounds.
pub const SOUND_EXTENSION: &str = "wav";

const HIGH_DPI_SUFFIX: &str = "@2x";
const SWIZZLE_MASK_SUFFIX: &str = "@sw";
const ALTERNATE_SOUND_SUFFIX: &str = "@3x";
const LOOPING_MARKER: char = '~';

/// How a sprite's pixels are combined with what is behind them.
///
/// Selected by the character separating the name from the frame number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// `-`: ordinary alpha blending.
    #[default]
    Alpha,
    /// `~` or `^`: color adds to the background, alpha still darkens a little.
    HalfAdditive,
    /// `+`: color adds to the background, alpha is ignored.
    Additive,
    /// `=`: the file already holds premultiplied alpha.
    Premultiplied,
}

impl BlendMode {
    /// Map a separator character to its blending mode.
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '-' => Some(BlendMode::Alpha),
            '~' | '^' => Some(BlendMode::HalfAdditive),
            '+' => Some(BlendMode::Additive),
            '=' => Some(BlendMode::Premultiplied),
            _ => None,
        }
    }
}

/// A sprite frame path broken into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpritePath {
    /// Canonical sprite name
    pub name: String,
    /// Frame index within the animation
    pub frame: usize,
    /// Whether this is the `@2x` high-DPI variant
    pub high_dpi: bool,
    /// Whether this is an `@sw` swizzle mask frame
    pub swizzle_mask: bool,
    /// Blending mode selected by the frame separator
    pub blend: BlendMode,
}

/// A sound path broken into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundPath {
    /// Canonical sound name
    pub name: String,
    /// Whether the file stem ended in `~`
    pub looping: bool,
    /// Whether this is the `@3x` alternate-pitch variant
    pub alternate: bool,
}

/// Lowercase extension of a path, if any.
fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Check if a path has a supported image extension.
pub fn is_image_file(path: &Path) -> bool {
    extension(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Check if a path has the sound extension.
pub fn is_sound_file(path: &Path) -> bool {
    extension(path).as_deref() == Some(SOUND_EXTENSION)
}

/// Path of `path` relative to `root`, joined with `/` regardless of platform.
///
/// Returns `None` if `path` is not under `root` or is not valid UTF-8.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.iter().map(|part| part.to_str()).collect();
    let parts = parts?;
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Strip the extension from a relative path string.
fn strip_extension(relative: &str) -> &str {
    let file_start = relative.rfind('/').map(|i| i + 1).unwrap_or(0);
    match relative[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &relative[..file_start + dot],
        _ => relative,
    }
}

/// Parse a sprite frame path relative to an `images/` folder.
///
/// Returns `None` for non-image files, for paths that leave an empty name,
/// and for frame numbers too large to index.
pub fn parse_sprite_path(relative: &str) -> Option<SpritePath> {
    if !is_image_file(Path::new(relative)) {
        return None;
    }

    let mut stem = strip_extension(relative);
    let high_dpi = stem.ends_with(HIGH_DPI_SUFFIX);
    if high_dpi {
        stem = &stem[..stem.len() - HIGH_DPI_SUFFIX.len()];
    }
    let swizzle_mask = stem.ends_with(SWIZZLE_MASK_SUFFIX);
    if swizzle_mask {
        stem = &stem[..stem.len() - SWIZZLE_MASK_SUFFIX.len()];
    }

    let digits_start = stem
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(stem.len());

    // Digits are a frame index only when a blend marker separates them from
    // a non-empty name.
    let marker = stem[..digits_start].chars().next_back();
    let (name, frame, blend) = match marker.and_then(BlendMode::from_marker) {
        Some(blend) if digits_start > 1 => {
            let digits = &stem[digits_start..];
            let frame = if digits.is_empty() {
                0
            } else {
                match digits.parse() {
                    Ok(frame) => frame,
                    Err(_) => {
                        log::warn!("Ignoring {:?}: frame number {} is out of range", relative, digits);
                        return None;
                    }
                }
            };
            (&stem[..digits_start - 1], frame, blend)
        }
        _ => (stem, 0, BlendMode::Alpha),
    };

    if name.is_empty() || name.ends_with('/') {
        return None;
    }

    Some(SpritePath {
        name: name.to_string(),
        frame,
        high_dpi,
        swizzle_mask,
        blend,
    })
}

/// Parse a sound path relative to a `sounds/` folder.
pub fn parse_sound_path(relative: &str) -> Option<SoundPath> {
    if !is_sound_file(Path::new(relative)) {
        return None;
    }

    let mut stem = strip_extension(relative);
    let looping = stem.ends_with(LOOPING_MARKER);
    if looping {
        stem = &stem[..stem.len() - LOOPING_MARKER.len_utf8()];
    }
    let alternate = stem.ends_with(ALTERNATE_SOUND_SUFFIX);
    if alternate {
        stem = &stem[..stem.len() - ALTERNATE_SOUND_SUFFIX.len()];
    }

    if stem.is_empty() || stem.ends_with('/') {
        return None;
    }

    Some(SoundPath {
        name: stem.to_string(),
        looping,
        alternate,
    })
}

/// Whether a file stem (no extension) marks a looping sound.
pub fn is_looping_stem(stem: &str) -> bool {
    stem.ends_with(LOOPING_MARKER)
}

/// Whether a file stem (no extension, looping marker already removed) marks
/// the alternate-pitch variant.
pub fn is_alternate_stem(stem: &str) -> bool {
    stem.ends_with(ALTERNATE_SOUND_SUFFIX)
}
