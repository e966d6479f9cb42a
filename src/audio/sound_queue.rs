//! Background sound decoding.
//!
//! Sounds need no main-thread hand-off: a worker decodes a clip and writes it
//! straight into its [`Sound`](super::Sound) entry in the shared
//! [`SoundSet`](super::SoundSet). `completed` only advances after that write, so
//! a progress of 1.0 means every queued sound is playable.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex, MutexGuard};

use super::SoundSet;
use crate::error::PipelineError;
use crate::progress::{ProgressSource, QueueCounts};

/// One sound file waiting to be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundEntry {
    /// Canonical name the decoded clip is stored under
    pub name: String,
    /// File to decode
    pub path: PathBuf,
}

impl SoundEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Default)]
struct ReadState {
    to_read: VecDeque<SoundEntry>,
    added: usize,
    completed: usize,
    /// Set once on shutdown; workers exit when they see it.
    shutting_down: bool,
}

struct Shared {
    read: Mutex<ReadState>,
    /// Signalled when work is added or the queue shuts down.
    read_condition: Condvar,
    /// Signalled when `completed` catches up with `added`.
    done_condition: Condvar,
    sounds: Arc<SoundSet>,
}

/// Pool of sound decoder threads feeding a [`SoundSet`].
pub struct SoundQueue {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl SoundQueue {
    /// Start `worker_count` decoder threads (at least one) writing into `sounds`.
    pub fn new(sounds: Arc<SoundSet>, worker_count: usize) -> Result<Self, PipelineError> {
        let shared = Arc::new(Shared {
            read: Mutex::new(ReadState::default()),
            read_condition: Condvar::new(),
            done_condition: Condvar::new(),
            sounds,
        });
        let mut queue = Self {
            shared,
            workers: Vec::new(),
        };

        for index in 0..worker_count.max(1) {
            let shared = Arc::clone(&queue.shared);
            // On error `queue` is dropped here, which joins the workers
            // already started.
            let handle = thread::Builder::new()
                .name(format!("sound-loader-{}", index))
                .spawn(move || {
                    log::debug!("Sound loader thread {} started", index);
                    worker_loop(&shared);
                    log::debug!("Sound loader thread {} exiting", index);
                })
                .map_err(|e| PipelineError::Spawn(e.to_string()))?;
            queue.workers.push(handle);
        }

        log::debug!("Sound queue started with {} workers", queue.workers.len());
        Ok(queue)
    }

    /// Queue a sound for decoding.
    ///
    /// Returns `false` (and drops the entry) if the queue is shutting down.
    pub fn add(&self, entry: SoundEntry) -> bool {
        let mut read = self.shared.read.lock();
        if read.shutting_down {
            log::warn!(
                "Sound queue is shut down; dropping \"{}\" ({:?})",
                entry.name,
                entry.path
            );
            return false;
        }
        read.to_read.push_back(entry);
        read.added += 1;
        self.shared.read_condition.notify_one();
        true
    }

    /// Current `added` / `completed` counters.
    pub fn counts(&self) -> QueueCounts {
        let read = self.shared.read.lock();
        QueueCounts {
            added: read.added,
            completed: read.completed,
        }
    }

    /// Fraction of queued sounds that are decoded, 1.0 when nothing is queued.
    pub fn progress(&self) -> f64 {
        self.counts().progress()
    }

    /// Block until every queued sound has been decoded.
    ///
    /// Returns [`PipelineError::ShutDown`] if the queue is shut down first.
    pub fn finish(&self) -> Result<(), PipelineError> {
        let mut read = self.shared.read.lock();
        while read.completed < read.added {
            if read.shutting_down {
                return Err(PipelineError::ShutDown);
            }
            self.shared.done_condition.wait(&mut read);
        }
        Ok(())
    }

    /// Whether [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        self.shared.read.lock().shutting_down
    }

    /// Stop the workers, dropping anything not yet decoded.
    ///
    /// Blocks until every worker has finished its current clip and exited.
    /// Calling it again is a no-op.
    pub fn shutdown(&mut self) {
        {
            let mut read = self.shared.read.lock();
            if !read.shutting_down {
                log::debug!(
                    "Shutting down sound queue ({} of {} sounds decoded, {} dropped)",
                    read.completed,
                    read.added,
                    read.to_read.len()
                );
            }
            read.shutting_down = true;
            read.to_read.clear();
        }
        self.shared.read_condition.notify_all();
        self.shared.done_condition.notify_all();

        for handle in self.workers.drain(..) {
            if let Err(e) = handle.join() {
                log::warn!("Sound loader thread panicked: {:?}", e);
            }
        }
    }
}

impl ProgressSource for SoundQueue {
    fn counts(&self) -> QueueCounts {
        SoundQueue::counts(self)
    }
}

impl Drop for SoundQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &Shared) {
    let mut read = shared.read.lock();
    while !read.shutting_down {
        let Some(entry) = read.to_read.pop_front() else {
            shared.read_condition.wait(&mut read);
            continue;
        };

        MutexGuard::unlocked(&mut read, || {
            shared
                .sounds
                .modify(&entry.name)
                .load(&entry.path, &entry.name);
        });

        read.completed += 1;
        if read.completed == read.added {
            shared.done_condition.notify_all();
        }
    }
}
