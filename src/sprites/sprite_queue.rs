//! Two-stage sprite loading: worker decode, main-thread upload.
//!
//! Workers pull [`ImageSet`]s from the read queue, decode them, and push them
//! to the load queue. The main thread drains the load queue in
//! [`SpriteQueue::upload_sprites`], which is the only place textures are
//! created or freed. `completed` counts installed sprites, so progress reaches
//! 1.0 only once every texture is on the GPU.
//!
//! Lock order: the read lock and the load lock are never held together.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use parking_lot::{Condvar, Mutex, MutexGuard};
use skyload_gpu::SpriteTexture;

use super::sprite::SpriteData;
use super::{ImageBuffer, ImageSet, SpriteSet, UploadTarget};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::progress::{ProgressSource, QueueCounts};

#[derive(Default)]
struct ReadState {
    to_read: VecDeque<ImageSet>,
    added: usize,
    shutting_down: bool,
}

#[derive(Default)]
struct LoadState {
    to_load: VecDeque<ImageSet>,
    to_unload: Vec<String>,
    completed: usize,
    shutting_down: bool,
}

struct Shared {
    read: Mutex<ReadState>,
    /// Signalled when an image set is added or the queue shuts down.
    read_condition: Condvar,
    load: Mutex<LoadState>,
    /// Signalled when the load queue grows, shrinks, or shuts down.
    load_condition: Condvar,
    /// Decoded sets allowed to wait for upload (0 = unbounded).
    max_pending: usize,
}

/// Sprite decoder pool plus the main-thread upload stage.
pub struct SpriteQueue {
    shared: Arc<Shared>,
    sprites: Arc<SpriteSet>,
    workers: Vec<JoinHandle<()>>,
    main_thread: ThreadId,
    max_upload_per_frame: Option<usize>,
}

impl SpriteQueue {
    /// Start `worker_count` decoder threads (at least one) with no upload
    /// bound and the default back-pressure limit.
    ///
    /// The calling thread becomes the queue's main thread.
    pub fn new(sprites: Arc<SpriteSet>, worker_count: usize) -> Result<Self, PipelineError> {
        let config = PipelineConfig::default();
        Self::start(sprites, worker_count, None, config.max_pending_uploads)
    }

    /// Start a queue sized and bounded by `config`.
    pub fn from_config(sprites: Arc<SpriteSet>, config: &PipelineConfig) -> Result<Self, PipelineError> {
        Self::start(
            sprites,
            config.worker_count,
            config.max_upload_per_frame,
            config.max_pending_uploads,
        )
    }

    fn start(
        sprites: Arc<SpriteSet>,
        worker_count: usize,
        max_upload_per_frame: Option<usize>,
        max_pending: usize,
    ) -> Result<Self, PipelineError> {
        let shared = Arc::new(Shared {
            read: Mutex::new(ReadState::default()),
            read_condition: Condvar::new(),
            load: Mutex::new(LoadState::default()),
            load_condition: Condvar::new(),
            max_pending,
        });
        let mut queue = Self {
            shared,
            sprites,
            workers: Vec::new(),
            main_thread: thread::current().id(),
            max_upload_per_frame: max_upload_per_frame.filter(|&n| n > 0),
        };

        for index in 0..worker_count.max(1) {
            let shared = Arc::clone(&queue.shared);
            let handle = thread::Builder::new()
                .name(format!("sprite-loader-{}", index))
                .spawn(move || {
                    log::debug!("Sprite loader thread {} started", index);
                    worker_loop(&shared);
                    log::debug!("Sprite loader thread {} exiting", index);
                })
                .map_err(|e| PipelineError::Spawn(e.to_string()))?;
            queue.workers.push(handle);
        }

        log::debug!(
            "Sprite queue started with {} workers (upload bound: {:?}, pending bound: {})",
            queue.workers.len(),
            queue.max_upload_per_frame,
            max_pending
        );
        Ok(queue)
    }

    /// The set sprites are installed into.
    pub fn sprites(&self) -> &Arc<SpriteSet> {
        &self.sprites
    }

    /// Queue an image set for decoding.
    ///
    /// Frames are validated here. Returns `false` (and drops the set) if the
    /// queue is shutting down.
    pub fn add(&self, mut image_set: ImageSet) -> bool {
        image_set.validate_frames();

        let mut read = self.shared.read.lock();
        if read.shutting_down {
            log::warn!(
                "Sprite queue is shut down; dropping \"{}\"",
                image_set.name()
            );
            return false;
        }
        read.to_read.push_back(image_set);
        read.added += 1;
        self.shared.read_condition.notify_one();
        true
    }

    /// Free the textures of `name` during the next upload pass.
    pub fn unload(&self, name: impl Into<String>) {
        let mut load = self.shared.load.lock();
        if !load.shutting_down {
            load.to_unload.push(name.into());
        }
    }

    /// Current `added` / `completed` counters.
    pub fn counts(&self) -> QueueCounts {
        // Read `completed` first so a concurrent add can only lower the ratio.
        let completed = self.shared.load.lock().completed;
        let added = self.shared.read.lock().added;
        QueueCounts { added, completed }
    }

    /// Fraction of queued sprites installed, 1.0 when nothing is queued.
    pub fn progress(&self) -> f64 {
        self.counts().progress()
    }

    fn check_main_thread(&self, operation: &'static str) -> Result<(), PipelineError> {
        if thread::current().id() == self.main_thread {
            return Ok(());
        }
        let error = PipelineError::NotMainThread { operation };
        log::error!("{} (called from {:?})", error, thread::current().name());
        Err(error)
    }

    /// Process pending unloads and upload decoded sprites. Main thread only.
    ///
    /// Uploads at most `max_upload_per_frame` sprites per call and returns how
    /// many were installed.
    pub fn upload_sprites(&self, target: &mut dyn UploadTarget) -> Result<usize, PipelineError> {
        self.check_main_thread("upload_sprites")?;

        let (unloads, batch) = {
            let mut load = self.shared.load.lock();
            let unloads = std::mem::take(&mut load.to_unload);
            let count = self
                .max_upload_per_frame
                .map_or(load.to_load.len(), |limit| limit.min(load.to_load.len()));
            let batch: Vec<ImageSet> = load.to_load.drain(..count).collect();
            (unloads, batch)
        };
        if !batch.is_empty() {
            // Room in the load queue for workers held back by max_pending.
            self.shared.load_condition.notify_all();
        }

        for name in unloads {
            match self.sprites.find(&name) {
                Some(sprite) => {
                    sprite.unload();
                    log::debug!("Unloaded sprite \"{}\"", name);
                }
                None => log::warn!("Cannot unload unknown sprite \"{}\"", name),
            }
        }

        let uploaded = batch.len();
        for image_set in batch {
            self.install(target, image_set);
        }

        if uploaded > 0 {
            let mut load = self.shared.load.lock();
            load.completed += uploaded;
            self.shared.load_condition.notify_all();
        }
        Ok(uploaded)
    }

    fn install(&self, target: &mut dyn UploadTarget, mut image_set: ImageSet) {
        let name = image_set.name().to_string();
        let texture = upload_variant(target, &name, image_set.buffer());
        let high_dpi_texture =
            upload_variant(target, &format!("{}@2x", name), image_set.high_dpi_buffer());
        let swizzle_mask =
            upload_variant(target, &format!("{}@sw", name), image_set.swizzle_mask_buffer());
        let high_dpi_swizzle_mask = upload_variant(
            target,
            &format!("{}@sw@2x", name),
            image_set.high_dpi_swizzle_mask_buffer(),
        );

        let buffer = image_set.buffer();
        let (width, height, frames) = if buffer.is_empty() {
            (0, 0, 0)
        } else {
            (buffer.width(), buffer.height(), buffer.frames())
        };
        let masks = image_set.take_decoded();

        self.sprites.modify(&name).install(SpriteData {
            name,
            width,
            height,
            frames,
            texture,
            high_dpi_texture,
            swizzle_mask,
            high_dpi_swizzle_mask,
            masks,
        });
    }

    /// Block until every added sprite is installed. Main thread only.
    ///
    /// Keeps uploading while it waits, since no other thread can. Returns
    /// [`PipelineError::ShutDown`] if the queue shuts down first.
    pub fn finish(&self, target: &mut dyn UploadTarget) -> Result<(), PipelineError> {
        self.check_main_thread("finish")?;

        loop {
            self.upload_sprites(target)?;

            let added = self.shared.read.lock().added;
            let mut load = self.shared.load.lock();
            if load.completed >= added {
                return Ok(());
            }
            if load.shutting_down {
                return Err(PipelineError::ShutDown);
            }
            while load.to_load.is_empty() && load.to_unload.is_empty() && !load.shutting_down {
                self.shared.load_condition.wait(&mut load);
            }
        }
    }

    /// Whether [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.shared.read.lock().shutting_down
    }

    /// Stop the workers and drop everything not yet uploaded.
    ///
    /// Blocks until every worker has finished its current set and exited.
    /// Calling it again is a no-op.
    pub fn shutdown(&mut self) {
        let dropped_reads = {
            let mut read = self.shared.read.lock();
            read.shutting_down = true;
            std::mem::take(&mut read.to_read)
        };
        let dropped_loads = {
            let mut load = self.shared.load.lock();
            load.shutting_down = true;
            load.to_unload.clear();
            std::mem::take(&mut load.to_load)
        };
        self.shared.read_condition.notify_all();
        self.shared.load_condition.notify_all();

        if !self.workers.is_empty() {
            log::debug!(
                "Shutting down sprite queue ({} undecoded and {} unuploaded sets dropped)",
                dropped_reads.len(),
                dropped_loads.len()
            );
        }
        for handle in self.workers.drain(..) {
            if let Err(e) = handle.join() {
                log::warn!("Sprite loader thread panicked: {:?}", e);
            }
        }
    }
}

impl ProgressSource for SpriteQueue {
    fn counts(&self) -> QueueCounts {
        SpriteQueue::counts(self)
    }
}

impl Drop for SpriteQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn upload_variant(target: &mut dyn UploadTarget, name: &str, buffer: &ImageBuffer) -> Option<SpriteTexture> {
    if buffer.is_empty() {
        return None;
    }
    match target.upload(name, buffer) {
        Ok(texture) => texture,
        Err(e) => {
            log::error!("Failed to upload sprite \"{}\": {}", name, e);
            None
        }
    }
}

fn worker_loop(shared: &Shared) {
    let mut read = shared.read.lock();
    while !read.shutting_down {
        let Some(mut image_set) = read.to_read.pop_front() else {
            shared.read_condition.wait(&mut read);
            continue;
        };

        MutexGuard::unlocked(&mut read, || {
            image_set.load();

            let mut load = shared.load.lock();
            while shared.max_pending > 0
                && load.to_load.len() >= shared.max_pending
                && !load.shutting_down
            {
                shared.load_condition.wait(&mut load);
            }
            if load.shutting_down {
                return;
            }
            load.to_load.push_back(image_set);
            shared.load_condition.notify_all();
        });
    }
}
