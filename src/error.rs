//! Error types for asset decoding and pipeline operations.
//!
//! Decoders report failures through these types. The queues never hand them
//! to the main thread: a failed asset is logged and installed empty so the
//! loading screen always completes.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a WAV file.
#[derive(Error, Debug)]
pub enum WavError {
    /// I/O error while reading the stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended inside the RIFF header or a chunk header
    #[error("truncated header")]
    TruncatedHeader,

    /// The stream does not start with a RIFF/WAVE header
    #[error("not a RIFF/WAVE file")]
    NotRiff,

    /// The "fmt " chunk declares something other than 16-bit mono PCM at the
    /// pipeline's sample rate
    #[error("unsupported format: {reason}")]
    UnsupportedFormat {
        /// Which field did not match
        reason: String,
    },

    /// A "data" chunk appeared before any "fmt " chunk
    #[error("\"data\" chunk precedes \"fmt \" chunk")]
    MissingFormatChunk,

    /// The stream ended without a "data" chunk
    #[error("missing \"data\" chunk")]
    MissingData,

    /// The "data" chunk is shorter than its declared size
    #[error("truncated data: expected {expected} bytes, found {found}")]
    TruncatedData {
        /// Declared chunk size
        expected: u32,
        /// Bytes actually present
        found: u64,
    },
}

impl WavError {
    /// Create an unsupported format error with a reason.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            reason: reason.into(),
        }
    }
}

/// Errors that can occur while decoding a sprite frame.
#[derive(Error, Debug)]
pub enum ImageError {
    /// I/O error while reading the file
    #[error("IO error reading {path:?}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The image decoder rejected the file contents
    #[error("Failed to decode {path:?}: {source}")]
    Decode {
        /// File being decoded
        path: PathBuf,
        /// Underlying error
        source: ::image::ImageError,
    },

    /// The extension is not one of the supported image types
    #[error("Unsupported image extension: {path:?}")]
    UnsupportedExtension {
        /// Offending path
        path: PathBuf,
    },

    /// A frame's dimensions differ from the first frame of the same sprite
    #[error("Frame {frame} is {actual_width}x{actual_height}, expected {width}x{height}")]
    FrameSize {
        /// Frame index
        frame: usize,
        /// Expected width (from frame 0)
        width: u32,
        /// Expected height (from frame 0)
        height: u32,
        /// Width of the offending frame
        actual_width: u32,
        /// Height of the offending frame
        actual_height: u32,
    },

    /// The frame index is past the number of frames the buffer holds
    #[error("Frame {frame} out of range for a {frames}-frame buffer")]
    FrameIndex {
        /// Requested frame
        frame: usize,
        /// Frames the buffer was sized for
        frames: usize,
    },
}

/// Errors returned by queue operations that the caller can act on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A main-thread-only operation was called from another thread
    #[error("{operation} must be called from the thread that created the queue")]
    NotMainThread {
        /// Name of the rejected operation
        operation: &'static str,
    },

    /// The queue has been shut down and its workers are gone
    #[error("queue has been shut down")]
    ShutDown,

    /// A worker thread could not be started
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(String),
}

/// Errors that can occur while reading or writing a config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
