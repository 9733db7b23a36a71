// ============================================================================
// vrecode-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig plus environment overrides. Explicit
// builder calls made after `apply_env` take precedence over the environment.
//
// KEY COMPONENTS:
// - CoreConfigBuilder: Builder struct for creating CoreConfig instances
// - apply_env / apply_env_from: VRECODE_* environment overrides

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::CoreConfig;
use super::utils::{get_env_value, parse_bool};
use crate::error::{CoreError, CoreResult};
use crate::hardware::HardwareBackend;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use vrecode_core::config::CoreConfigBuilder;
///
/// let config = CoreConfigBuilder::new()
///     .prefer_hevc_decode(false)
///     .ffmpeg_check(false)
///     .build();
/// assert!(!config.prefer_hevc_decode);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    /// Creates a new CoreConfigBuilder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output directory.
    pub fn output_dir(mut self, output_dir: PathBuf) -> Self {
        self.config.output_dir = Some(output_dir);
        self
    }

    /// Forces a hardware backend instead of selecting one for the host.
    pub fn backend(mut self, backend: HardwareBackend) -> Self {
        self.config.backend_override = Some(backend);
        self
    }

    /// Sets the VAAPI render node.
    pub fn vaapi_device(mut self, device: impl Into<String>) -> Self {
        self.config.vaapi_device = device.into();
        self
    }

    /// Sets whether H.265 inputs are decoded with the backend's H.265 decoder.
    pub fn prefer_hevc_decode(mut self, prefer: bool) -> Self {
        self.config.prefer_hevc_decode = prefer;
        self
    }

    /// Sets whether ffmpeg/ffprobe availability is checked up front.
    pub fn ffmpeg_check(mut self, check: bool) -> Self {
        self.config.ffmpeg_check = check;
        self
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(self) -> CoreResult<Self> {
        self.apply_env_from(get_env_value)
    }

    /// Applies overrides read through `lookup`, which returns `None` for unset keys.
    pub fn apply_env_from<F>(mut self, lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(device) = lookup(super::ENV_VAAPI_DEVICE) {
            log::debug!("{} overrides VAAPI device: {}", super::ENV_VAAPI_DEVICE, device);
            self.config.vaapi_device = device;
        }
        if let Some(backend) = lookup(super::ENV_BACKEND) {
            self.config.backend_override = Some(backend.parse()?);
        }
        if let Some(dir) = lookup(super::ENV_OUTPUT_DIR) {
            self.config.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = lookup(super::ENV_PREFER_HEVC_DECODE) {
            self.config.prefer_hevc_decode = parse_bool(&value).ok_or_else(|| {
                CoreError::Config(format!(
                    "{} must be a boolean, got '{}'",
                    super::ENV_PREFER_HEVC_DECODE,
                    value
                ))
            })?;
        }
        Ok(self)
    }

    /// Builds the CoreConfig instance.
    pub fn build(self) -> CoreConfig {
        self.config
    }
}
