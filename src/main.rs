//! `skyload`: load every sprite and sound under the given source directories
//! and report what loaded.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use skyload::cli::CliOverrides;
use skyload::sources::AssetSources;
use skyload::sprites::{Headless, UploadTarget};
use skyload::{AssetPipeline, NamedAsset};
use skyload_gpu::{GpuConfig, GpuContext};

/// Pause between upload passes, roughly one frame.
const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    let overrides = CliOverrides::parse_from_env()?;
    let config = overrides.resolve_config()?;

    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    let target: Box<dyn UploadTarget> = if config.headless {
        Box::new(Headless)
    } else {
        match GpuContext::headless_blocking(GpuConfig::default()) {
            Ok(ctx) => Box::new(ctx),
            Err(e) => {
                log::warn!("No GPU available ({}); continuing without textures", e);
                Box::new(Headless)
            }
        }
    };

    let mut pipeline =
        AssetPipeline::new(&config, target).context("Failed to start the asset pipeline")?;

    let started = Instant::now();
    let sources = AssetSources::scan(&overrides.sources);
    let (sprite_count, sound_count) = pipeline.enqueue(sources);
    log::info!("Loading {} sprites and {} sounds", sprite_count, sound_count);

    let mut next_report = 10;
    while !pipeline.is_done() {
        pipeline.step()?;
        let percent = pipeline.percent();
        if percent >= next_report {
            log::info!("Loading: {}%", percent);
            next_report = (percent / 10 + 1) * 10;
        }
        thread::sleep(FRAME);
    }
    pipeline.finish()?;

    let (missing_sprites, missing_sounds) = pipeline.check_references();

    let sprites = pipeline.sprites();
    let loaded_sprites = sprites
        .names()
        .iter()
        .filter_map(|name| sprites.find(name))
        .filter(|sprite| !sprite.is_placeholder() && sprite.frames() > 0)
        .count();
    let sounds = pipeline.sounds();
    let loaded_sounds = sounds
        .names()
        .iter()
        .filter_map(|name| sounds.find(name))
        .filter(|sound| sound.is_loaded())
        .count();

    println!("Loaded in {:.2?}", started.elapsed());
    println!("  sprites: {} of {} loaded", loaded_sprites, sprite_count);
    println!("  sounds:  {} of {} loaded", loaded_sounds, sounds.len());
    if !missing_sprites.is_empty() || !missing_sounds.is_empty() {
        println!(
            "  missing: {} sprites, {} sounds",
            missing_sprites.len(),
            missing_sounds.len()
        );
    }

    pipeline.shutdown();
    Ok(())
}
