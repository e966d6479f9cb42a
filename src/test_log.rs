//! Log capture for tests.
//!
//! One process-wide logger keeps every record at debug level and above.
//! Tests run in parallel and share it, so look records up by text unique to
//! the test (an asset name, a path).

use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// A formatted log record.
#[derive(Debug, Clone)]
pub(crate) struct CapturedRecord {
    pub level: Level,
    pub message: String,
}

struct CaptureLogger {
    records: Mutex<Vec<CapturedRecord>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            self.records.lock().push(CapturedRecord {
                level: record.level(),
                message: record.args().to_string(),
            });
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: parking_lot::const_mutex(Vec::new()),
};
static INIT: Once = Once::new();

/// Install the capturing logger. Safe to call from every test.
pub(crate) fn capture() {
    INIT.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Debug);
        }
    });
}

/// Every captured record whose message contains `needle`.
pub(crate) fn records_containing(needle: &str) -> Vec<CapturedRecord> {
    LOGGER
        .records
        .lock()
        .iter()
        .filter(|record| record.message.contains(needle))
        .cloned()
        .collect()
}
