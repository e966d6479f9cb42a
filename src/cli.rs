//! Command-line arguments for the `skyload` binary.
//!
//! ```text
//! skyload [--config FILE] [--workers N] [--sound-workers N] [--max-upload N]
//!         [--headless on|off] [--log-level LEVEL] <source dir>...
//! ```
//!
//! Flags override the config file; positional arguments are source roots,
//! scanned in order (later roots win).

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};

use crate::config::{LogLevel, PipelineConfig};

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub worker_count: Option<usize>,
    pub sound_worker_count: Option<usize>,
    pub max_upload_per_frame: Option<usize>,
    pub headless: Option<bool>,
    pub log_level: Option<LogLevel>,
    pub sources: Vec<PathBuf>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    /// Parse arguments, the first of which is the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // program name
        while let Some(raw) = iter.next() {
            let arg = raw.as_ref();
            let Some(key) = arg.strip_prefix("--") else {
                overrides.sources.push(PathBuf::from(arg));
                continue;
            };
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("Expected a value after '{arg}'"))?
                .as_ref()
                .to_string();
            match key {
                "config" => overrides.config = Some(PathBuf::from(value)),
                "workers" => overrides.worker_count = Some(parse_count(arg, &value)?),
                "sound-workers" => overrides.sound_worker_count = Some(parse_count(arg, &value)?),
                "max-upload" => overrides.max_upload_per_frame = Some(parse_count(arg, &value)?),
                "headless" => overrides.headless = Some(parse_bool_flag("headless", &value)?),
                "log-level" => overrides.log_level = Some(parse_log_level(&value)?),
                _ => bail!(
                    "Unknown flag '{arg}'. Supported flags: --config, --workers, --sound-workers, \
                     --max-upload, --headless, --log-level."
                ),
            }
        }
        if overrides.sources.is_empty() {
            bail!("No source directories given. Usage: skyload [flags] <source dir>...");
        }
        Ok(overrides)
    }

    /// Load the config file (if any) and apply the flags on top.
    pub fn resolve_config(&self) -> Result<PipelineConfig> {
        let base = match &self.config {
            Some(path) => PipelineConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        Ok(self.apply(base))
    }

    /// Apply the flags to `config`.
    pub fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(count) = self.worker_count {
            config.worker_count = count;
        }
        if let Some(count) = self.sound_worker_count {
            config.sound_worker_count = count;
        }
        if let Some(limit) = self.max_upload_per_frame {
            config.max_upload_per_frame = Some(limit);
        }
        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        config.sanitized()
    }
}

fn parse_count(flag: &str, value: &str) -> Result<usize> {
    value
        .parse::<usize>()
        .with_context(|| format!("Invalid {flag} value '{value}'"))
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}

fn parse_log_level(value: &str) -> Result<LogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "error" => Ok(LogLevel::Error),
        "warn" => Ok(LogLevel::Warn),
        "info" => Ok(LogLevel::Info),
        "debug" => Ok(LogLevel::Debug),
        "trace" => Ok(LogLevel::Trace),
        other => bail!("Invalid log level '{other}'. Use error, warn, info, debug or trace."),
    }
}
