//! Tests for decoding an `ImageSet` on the calling thread.

use ::image::{Rgba, RgbaImage};

use super::write_png;
use crate::names::BlendMode;
use crate::sprites::ImageSet;

#[test]
fn test_load_normal_and_high_dpi() {
    let dir = tempfile::tempdir().unwrap();
    let mut set = ImageSet::new("effect/spark");
    set.add(write_png(dir.path(), "spark+0.png", 2, 2, [200, 100, 50, 128]));
    set.add(write_png(dir.path(), "spark+1.png", 2, 2, [200, 100, 50, 128]));
    set.add(write_png(dir.path(), "spark+0@2x.png", 4, 4, [200, 100, 50, 128]));
    set.add(write_png(dir.path(), "spark+1@2x.png", 4, 4, [200, 100, 50, 128]));
    set.validate_frames();
    set.load();

    assert_eq!(set.blend(), BlendMode::Additive);
    assert_eq!(set.buffer().frames(), 2);
    assert_eq!((set.buffer().width(), set.buffer().height()), (2, 2));
    assert_eq!(set.high_dpi_buffer().width(), 4);
    // Additive: RGB premultiplied, alpha dropped.
    assert_eq!(&set.buffer().pixels()[..4], &[100, 50, 25, 0]);
    assert!(set.masks().is_empty());
}

#[test]
fn test_bad_high_dpi_frame_drops_variant() {
    let dir = tempfile::tempdir().unwrap();
    let mut set = ImageSet::new("planet/rock");
    set.add(write_png(dir.path(), "rock-0.png", 2, 2, [1, 1, 1, 255]));
    set.add(write_png(dir.path(), "rock-1.png", 2, 2, [1, 1, 1, 255]));
    set.add(write_png(dir.path(), "rock-0@2x.png", 4, 4, [1, 1, 1, 255]));
    // Wrong size for frame 1 of the @2x variant.
    set.add(write_png(dir.path(), "rock-1@2x.png", 6, 6, [1, 1, 1, 255]));
    set.validate_frames();
    set.load();

    assert!(!set.buffer().is_empty());
    assert!(set.high_dpi_buffer().is_empty());
}

#[test]
fn test_bad_normal_frame_keeps_others() {
    let dir = tempfile::tempdir().unwrap();
    let mut set = ImageSet::new("planet/moon");
    set.add(write_png(dir.path(), "moon-0.png", 2, 2, [1, 2, 3, 255]));
    set.add(dir.path().join("moon-1.png"));
    set.validate_frames();
    set.load();

    let buffer = set.buffer();
    assert_eq!(buffer.frames(), 2);
    assert_eq!(&buffer.frame_pixels(0).unwrap()[..4], &[1, 2, 3, 255]);
    assert!(buffer.frame_pixels(1).unwrap().iter().all(|&b| b == 0));
}

#[test]
fn test_load_swizzle_masks() {
    let dir = tempfile::tempdir().unwrap();
    let mut set = ImageSet::new("ship/hauler");
    set.add(write_png(dir.path(), "hauler-0.png", 4, 4, [1, 1, 1, 255]));
    set.add(write_png(dir.path(), "hauler-1.png", 4, 4, [1, 1, 1, 255]));
    set.add(write_png(dir.path(), "hauler-0@sw.png", 4, 4, [0, 255, 0, 255]));
    set.add(write_png(dir.path(), "hauler-0@2x.png", 8, 8, [1, 1, 1, 255]));
    set.add(write_png(dir.path(), "hauler-1@2x.png", 8, 8, [1, 1, 1, 255]));
    set.add(write_png(dir.path(), "hauler-0@sw@2x.png", 8, 8, [0, 0, 255, 255]));
    set.validate_frames();
    set.load();

    let mask = set.swizzle_mask_buffer();
    assert_eq!(mask.frames(), 2);
    assert_eq!((mask.width(), mask.height()), (4, 4));
    assert_eq!(&mask.frame_pixels(1).unwrap()[..4], &[0, 255, 0, 255]);
    let high_dpi_mask = set.high_dpi_swizzle_mask_buffer();
    assert_eq!(high_dpi_mask.width(), 8);
    assert_eq!(&high_dpi_mask.frame_pixels(1).unwrap()[..4], &[0, 0, 255, 255]);
}

#[test]
fn test_bad_swizzle_mask_frame_drops_variant() {
    let dir = tempfile::tempdir().unwrap();
    let mut set = ImageSet::new("ship/tug");
    set.add(write_png(dir.path(), "tug-0.png", 4, 4, [1, 1, 1, 255]));
    set.add(write_png(dir.path(), "tug-1.png", 4, 4, [1, 1, 1, 255]));
    set.add(write_png(dir.path(), "tug-0@sw.png", 4, 4, [0, 255, 0, 255]));
    // Frame 1 of the mask is missing on disk.
    set.add(dir.path().join("tug-1@sw.png"));
    set.validate_frames();
    set.load();

    assert_eq!(set.buffer().frames(), 2);
    assert!(!set.buffer().is_empty());
    assert!(set.swizzle_mask_buffer().is_empty());
}

#[test]
fn test_ship_gets_one_mask_per_frame() {
    let dir = tempfile::tempdir().unwrap();
    let mut set = ImageSet::new("ship/shuttle");
    for frame in 0..2 {
        let path = dir.path().join(format!("shuttle-{}.png", frame));
        RgbaImage::from_fn(20, 20, |x, y| {
            if (4..16).contains(&x) && (4..16).contains(&y) {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        })
        .save(&path)
        .unwrap();
        set.add(path);
    }
    set.validate_frames();
    set.load();

    assert_eq!(set.masks().len(), 2);
    assert!(set.masks().iter().all(|mask| mask.is_loaded()));
}

#[test]
fn test_odd_sized_ship_still_loads() {
    let dir = tempfile::tempdir().unwrap();
    let mut set = ImageSet::new("ship/odd");
    set.add(write_png(dir.path(), "odd.png", 3, 5, [1, 1, 1, 255]));
    set.validate_frames();
    set.load();

    assert_eq!((set.buffer().width(), set.buffer().height()), (3, 5));
    assert_eq!(set.masks().len(), 1);
}

#[test]
fn test_load_validates_if_needed() {
    let dir = tempfile::tempdir().unwrap();
    let mut set = ImageSet::new("planet/dust");
    set.add(write_png(dir.path(), "dust.png", 2, 2, [1, 1, 1, 255]));
    set.load();
    assert_eq!(set.frame_count(), 1);
    assert!(!set.buffer().is_empty());
}
