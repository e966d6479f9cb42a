//! Configuration structs for GPU settings.

/// Configuration for GPU context initialization.
#[derive(Debug, Clone, Default)]
pub struct GpuConfig {
    /// Power preference for adapter selection.
    pub power_preference: wgpu::PowerPreference,
    /// Allow the software fallback adapter (useful on CI machines).
    pub force_fallback_adapter: bool,
    /// Settings for every sprite texture created through this context.
    pub texture: TextureConfig,
}

impl GpuConfig {
    /// Set power preference.
    pub fn with_power_preference(mut self, pref: wgpu::PowerPreference) -> Self {
        self.power_preference = pref;
        self
    }

    /// Request the software fallback adapter.
    pub fn with_fallback_adapter(mut self, fallback: bool) -> Self {
        self.force_fallback_adapter = fallback;
        self
    }

    /// Set the texture configuration used for sprite uploads.
    pub fn with_texture(mut self, texture: TextureConfig) -> Self {
        self.texture = texture;
        self
    }
}

/// Configuration for sprite texture creation.
#[derive(Debug, Clone)]
pub struct TextureConfig {
    /// Texel format. Sprite pixels arrive premultiplied, so this defaults to
    /// a linear format.
    pub format: wgpu::TextureFormat,
    /// Debug label attached to created textures.
    pub label: &'static str,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            format: wgpu::TextureFormat::Rgba8Unorm,
            label: "Sprite Texture",
        }
    }
}
