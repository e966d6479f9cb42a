use crate::config::GpuConfig;
use crate::error::Result;

/// GPU device and queue used for sprite uploads.
///
/// The context is created without a surface: the asset pipeline only needs
/// to allocate textures and copy pixels, and a window may not exist yet while
/// the loading screen is being prepared.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: GpuConfig,
}

impl GpuContext {
    /// Initialize a surface-less GPU context.
    ///
    /// On native, use `pollster::block_on()` or [`GpuContext::headless_blocking`].
    pub async fn headless(config: GpuConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: config.power_preference,
                compatible_surface: None,
                force_fallback_adapter: config.force_fallback_adapter,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let limits = wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Asset Upload Device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits,
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self {
            device,
            queue,
            config,
        })
    }

    /// Blocking wrapper around [`GpuContext::headless`].
    pub fn headless_blocking(config: GpuConfig) -> Result<Self> {
        pollster::block_on(Self::headless(config))
    }

    /// Largest width or height a sprite texture may have on this device.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Largest number of frames a single sprite texture may hold.
    pub fn max_frames(&self) -> u32 {
        self.device.limits().max_texture_array_layers
    }
}
