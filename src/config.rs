//! Configuration file support for the asset pipeline.
//!
//! Settings are stored as JSON. Every field has a default so that a partial
//! file (or no file at all) yields a usable configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Log level setting for the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Tuning knobs for the sprite and sound queues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of sprite decoder threads
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Number of audio decoder threads
    #[serde(default = "default_sound_worker_count")]
    pub sound_worker_count: usize,

    /// Textures uploaded per `upload_sprites` call (`None` = all available)
    #[serde(default)]
    pub max_upload_per_frame: Option<usize>,

    /// Decoded sprites allowed to wait for upload before workers stall (0 = unbounded)
    #[serde(default = "default_max_pending_uploads")]
    pub max_pending_uploads: usize,

    /// Skip GPU uploads entirely (console-only runs and tests)
    #[serde(default)]
    pub headless: bool,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_sound_worker_count() -> usize {
    2
}

fn default_max_pending_uploads() -> usize {
    64
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            sound_worker_count: default_sound_worker_count(),
            max_upload_per_frame: None,
            max_pending_uploads: default_max_pending_uploads(),
            headless: false,
            log_level: LogLevel::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::debug!("Loaded pipeline config from {:?}", path);
        Ok(config)
    }

    /// Write this config to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Serialize this config to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp worker counts to at least one thread.
    pub fn sanitized(mut self) -> Self {
        if self.worker_count == 0 {
            log::warn!("worker_count of 0 requested; using 1 sprite worker");
            self.worker_count = 1;
        }
        if self.sound_worker_count == 0 {
            log::warn!("sound_worker_count of 0 requested; using 1 sound worker");
            self.sound_worker_count = 1;
        }
        if self.max_upload_per_frame == Some(0) {
            log::warn!("max_upload_per_frame of 0 would never upload; removing the limit");
            self.max_upload_per_frame = None;
        }
        self
    }

    /// Set the sprite worker count.
    pub fn with_workers(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Set the sound worker count.
    pub fn with_sound_workers(mut self, count: usize) -> Self {
        self.sound_worker_count = count;
        self
    }

    /// Set the per-call upload bound.
    pub fn with_max_upload_per_frame(mut self, limit: Option<usize>) -> Self {
        self.max_upload_per_frame = limit;
        self
    }

    /// Set the back-pressure bound on decoded sprites.
    pub fn with_max_pending_uploads(mut self, limit: usize) -> Self {
        self.max_pending_uploads = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!(config.worker_count >= 1);
        assert_eq!(config.sound_worker_count, 2);
        assert_eq!(config.max_upload_per_frame, None);
        assert!(!config.headless);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PipelineConfig::from_json(r#"{ "sound_worker_count": 3 }"#).unwrap();
        assert_eq!(config.sound_worker_count, 3);
        assert_eq!(config.max_pending_uploads, 64);
        assert_eq!(config.max_upload_per_frame, None);
    }

    #[test]
    fn test_zero_workers_clamped() {
        let config =
            PipelineConfig::from_json(r#"{ "worker_count": 0, "sound_worker_count": 0 }"#).unwrap();
        assert_eq!(config.worker_count, 1);
        assert_eq!(config.sound_worker_count, 1);
    }

    #[test]
    fn test_log_level_lowercase() {
        let config = PipelineConfig::from_json(r#"{ "log_level": "debug" }"#).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        let config = PipelineConfig::default()
            .with_workers(3)
            .with_max_upload_per_frame(Some(8));
        config.save(&path).unwrap();

        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PipelineConfig::from_json("{ nope"),
            Err(ConfigError::Json(_))
        ));
    }
}
