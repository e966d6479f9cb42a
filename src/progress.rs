//! Loading progress reported to the loading screen.
//!
//! Each queue exposes an `added` / `completed` pair. [`LoadProgress`] sums
//! those pairs over every queue and reports `completed / added` for the whole
//! union, so one slow sound does not stall the bar at 50% while hundreds of
//! sprites are still pending.

/// Snapshot of a queue's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueCounts {
    /// Items accepted by `add`
    pub added: usize,
    /// Items fully installed in their set
    pub completed: usize,
}

impl QueueCounts {
    /// `completed / added`, or 1.0 when nothing was added.
    pub fn progress(&self) -> f64 {
        if self.added == 0 {
            1.0
        } else {
            (self.completed as f64 / self.added as f64).min(1.0)
        }
    }

    /// Whether every added item has completed.
    pub fn is_drained(&self) -> bool {
        self.completed >= self.added
    }
}

impl std::ops::Add for QueueCounts {
    type Output = QueueCounts;

    fn add(self, other: QueueCounts) -> QueueCounts {
        QueueCounts {
            added: self.added + other.added,
            completed: self.completed + other.completed,
        }
    }
}

/// Anything that can report queue counters.
pub trait ProgressSource {
    fn counts(&self) -> QueueCounts;
}

/// Combined progress over several queues.
pub struct LoadProgress<'a> {
    sources: Vec<&'a dyn ProgressSource>,
}

impl<'a> LoadProgress<'a> {
    pub fn new(sources: Vec<&'a dyn ProgressSource>) -> Self {
        Self { sources }
    }

    /// Summed counters of every source.
    pub fn counts(&self) -> QueueCounts {
        self.sources
            .iter()
            .map(|source| source.counts())
            .fold(QueueCounts::default(), |acc, counts| acc + counts)
    }

    /// Overall fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        self.counts().progress()
    }

    /// Overall percentage, rounded down.
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).floor() as u32
    }

    pub fn is_done(&self) -> bool {
        self.counts().is_drained()
    }
}
