//! GPU side of the skyload asset pipeline.
//!
//! Owns the wgpu device/queue pair and turns decoded RGBA frames into sprite
//! textures. Nothing in here is thread-aware: callers must keep every call on
//! the thread that drives rendering.

pub mod config;
pub mod context;
pub mod error;
pub mod texture;

pub use config::{GpuConfig, TextureConfig};
pub use context::GpuContext;
pub use error::{GpuError, Result};
pub use texture::SpriteTexture;
