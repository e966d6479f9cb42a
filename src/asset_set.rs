//! Name-indexed asset registry with placeholder-on-miss lookups.
//!
//! Game data refers to sprites and sounds by name long before the loaders
//! have produced them. `get` therefore never fails: a missing name gets a
//! default (placeholder) entry, and the handle returned stays valid and points
//! at the same entry for the life of the set. The loader later fills that same
//! entry in place.
//!
//! The mutex covers the map only. Entries are `Arc`s with their own interior
//! locking, so readers never block insertions of other names.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// An asset kind that can live in an [`AssetSet`].
pub trait NamedAsset: Default + Send + Sync {
    /// Human-readable kind used in log lines ("sprite", "sound").
    const KIND: &'static str;

    /// Whether the entry was only ever referenced, never loaded.
    fn is_placeholder(&self) -> bool;
}

/// Registry of assets keyed by canonical name.
pub struct AssetSet<T: NamedAsset> {
    entries: Mutex<HashMap<String, Arc<T>>>,
}

impl<T: NamedAsset> Default for AssetSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NamedAsset> AssetSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up `name`, inserting a placeholder if it is missing.
    pub fn get(&self, name: &str) -> Arc<T> {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(name) {
            return Arc::clone(entry);
        }
        let entry = Arc::new(T::default());
        entries.insert(name.to_string(), Arc::clone(&entry));
        entry
    }

    /// Handle used by loaders to fill an entry in place.
    ///
    /// Same lookup as [`get`](Self::get); kept separate so call sites that
    /// write are easy to find.
    pub fn modify(&self, name: &str) -> Arc<T> {
        self.get(name)
    }

    /// Look up `name` without inserting anything.
    pub fn find(&self, name: &str) -> Option<Arc<T>> {
        self.entries.lock().get(name).cloned()
    }

    /// Number of entries, placeholders included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Sorted list of every registered name.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Log every name that was referenced but never loaded.
    ///
    /// Returns those names, sorted.
    pub fn check_references(&self) -> Vec<String> {
        let mut missing: Vec<String> = self
            .entries
            .lock()
            .iter()
            .filter(|(_, entry)| entry.is_placeholder())
            .map(|(name, _)| name.clone())
            .collect();
        missing.sort();
        for name in &missing {
            log::error!("{} \"{}\" is referenced, but never defined.", T::KIND, name);
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct Dummy {
        loaded: AtomicBool,
    }

    impl NamedAsset for Dummy {
        const KIND: &'static str = "dummy";

        fn is_placeholder(&self) -> bool {
            !self.loaded.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_get_inserts_placeholder() {
        let set: AssetSet<Dummy> = AssetSet::new();
        assert!(set.is_empty());
        let entry = set.get("a");
        assert!(entry.is_placeholder());
        assert_eq!(set.len(), 1);
        assert!(set.find("b").is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_handles_are_stable() {
        let set: AssetSet<Dummy> = AssetSet::new();
        let first = set.get("ship");
        for i in 0..1000 {
            set.get(&format!("other{}", i));
        }
        let second = set.get("ship");
        assert!(Arc::ptr_eq(&first, &second));

        set.modify("ship").loaded.store(true, Ordering::SeqCst);
        assert!(!first.is_placeholder());
    }

    #[test]
    fn test_check_references() {
        let set: AssetSet<Dummy> = AssetSet::new();
        set.get("b");
        set.get("a");
        set.modify("loaded").loaded.store(true, Ordering::SeqCst);
        assert_eq!(set.check_references(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(set.names(), vec!["a", "b", "loaded"]);
    }

    #[test]
    fn test_check_references_logs_each_missing_name() {
        crate::test_log::capture();
        let set: AssetSet<Dummy> = AssetSet::new();
        set.get("refcheck/engine");
        set.get("refcheck/hull");
        set.modify("refcheck/loaded").loaded.store(true, Ordering::SeqCst);
        set.check_references();

        let records = crate::test_log::records_containing("\"refcheck/");
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.level == log::Level::Error));
        assert_eq!(
            records[0].message,
            "dummy \"refcheck/engine\" is referenced, but never defined."
        );
        assert_eq!(
            records[1].message,
            "dummy \"refcheck/hull\" is referenced, but never defined."
        );
    }

    #[test]
    fn test_concurrent_get_returns_one_entry() {
        let set: Arc<AssetSet<Dummy>> = Arc::new(AssetSet::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let set = Arc::clone(&set);
                std::thread::spawn(move || set.get("shared"))
            })
            .collect();
        let entries: Vec<Arc<Dummy>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(entries.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(set.len(), 1);
    }
}
