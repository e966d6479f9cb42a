//! The whole loading pipeline behind one handle.
//!
//! `AssetPipeline` owns both sets, both queues and the upload target. The
//! thread that creates it is the main thread: it must call [`step`] once per
//! frame (or [`finish`] to block) so sprites reach the GPU.
//!
//! [`step`]: AssetPipeline::step
//! [`finish`]: AssetPipeline::finish

use std::sync::Arc;

use crate::audio::{SoundEntry, SoundQueue, SoundSet};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::progress::{LoadProgress, ProgressSource, QueueCounts};
use crate::sources::AssetSources;
use crate::sprites::{Headless, ImageSet, SpriteQueue, SpriteSet, UploadTarget};

/// Sprite and sound loading driven from the main thread.
pub struct AssetPipeline {
    sprites: Arc<SpriteSet>,
    sounds: Arc<SoundSet>,
    sprite_queue: SpriteQueue,
    sound_queue: SoundQueue,
    target: Box<dyn UploadTarget>,
}

impl AssetPipeline {
    /// Start both queues. With `config.headless` set, `target` is ignored and
    /// no textures are created.
    pub fn new(config: &PipelineConfig, target: Box<dyn UploadTarget>) -> Result<Self, PipelineError> {
        let sprites = Arc::new(SpriteSet::new());
        let sounds = Arc::new(SoundSet::new());
        let sprite_queue = SpriteQueue::from_config(Arc::clone(&sprites), config)?;
        let sound_queue = SoundQueue::new(Arc::clone(&sounds), config.sound_worker_count)?;
        let target: Box<dyn UploadTarget> = if config.headless {
            Box::new(Headless)
        } else {
            target
        };

        Ok(Self {
            sprites,
            sounds,
            sprite_queue,
            sound_queue,
            target,
        })
    }

    /// Start a pipeline that never touches a GPU.
    pub fn headless(config: &PipelineConfig) -> Result<Self, PipelineError> {
        Self::new(config, Box::new(Headless))
    }

    pub fn sprites(&self) -> &Arc<SpriteSet> {
        &self.sprites
    }

    pub fn sounds(&self) -> &Arc<SoundSet> {
        &self.sounds
    }

    pub fn sprite_queue(&self) -> &SpriteQueue {
        &self.sprite_queue
    }

    pub fn sound_queue(&self) -> &SoundQueue {
        &self.sound_queue
    }

    /// Queue everything found by a directory scan.
    pub fn enqueue(&self, sources: AssetSources) -> (usize, usize) {
        sources.enqueue(&self.sprite_queue, &self.sound_queue)
    }

    pub fn add_sprite(&self, image_set: ImageSet) -> bool {
        self.sprite_queue.add(image_set)
    }

    pub fn add_sound(&self, entry: SoundEntry) -> bool {
        self.sound_queue.add(entry)
    }

    /// Release a sprite's textures at the next [`step`](Self::step).
    pub fn unload_sprite(&self, name: impl Into<String>) {
        self.sprite_queue.unload(name);
    }

    /// Combined counters of both queues.
    pub fn counts(&self) -> QueueCounts {
        self.load_progress().counts()
    }

    /// Overall loading fraction in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.load_progress().fraction()
    }

    /// Overall loading percentage, rounded down.
    pub fn percent(&self) -> u32 {
        self.load_progress().percent()
    }

    pub fn is_done(&self) -> bool {
        self.load_progress().is_done()
    }

    fn load_progress(&self) -> LoadProgress<'_> {
        let sources: Vec<&dyn ProgressSource> = vec![&self.sprite_queue, &self.sound_queue];
        LoadProgress::new(sources)
    }

    /// Run one bounded upload pass. Call once per frame on the main thread.
    pub fn step(&mut self) -> Result<usize, PipelineError> {
        self.sprite_queue.upload_sprites(&mut *self.target)
    }

    /// Block until every queued sprite and sound is loaded.
    pub fn finish(&mut self) -> Result<(), PipelineError> {
        self.sprite_queue.finish(&mut *self.target)?;
        self.sound_queue.finish()
    }

    /// Log and return every name referenced but never loaded, as
    /// `(sprites, sounds)`.
    pub fn check_references(&self) -> (Vec<String>, Vec<String>) {
        (self.sprites.check_references(), self.sounds.check_references())
    }

    /// Stop both queues, dropping unfinished work.
    pub fn shutdown(&mut self) {
        self.sprite_queue.shutdown();
        self.sound_queue.shutdown();
    }
}
