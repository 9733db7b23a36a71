//! Configuration structures and constants for the vrecode-core library.
//!
//! This module holds the knobs of a conversion run: where outputs go, which
//! hardware backend to use, and how the decode side is opened.

mod builder;
pub mod utils;

use crate::error::{CoreError, CoreResult};
use crate::hardware::{BackendSelection, DEFAULT_VAAPI_DEVICE, HardwareBackend};
use crate::media::VideoDescriptor;

use std::path::PathBuf;

pub use builder::CoreConfigBuilder;

// Environment variables

/// Overrides the VAAPI render node.
pub const ENV_VAAPI_DEVICE: &str = "VRECODE_VAAPI_DEVICE";

/// Forces a hardware backend (`vaapi` or `nvenc`) regardless of host.
pub const ENV_BACKEND: &str = "VRECODE_BACKEND";

/// Default output directory.
pub const ENV_OUTPUT_DIR: &str = "VRECODE_OUTPUT_DIR";

/// Enables or disables the H.265 hardware decode preference.
pub const ENV_PREFER_HEVC_DECODE: &str = "VRECODE_PREFER_HEVC_DECODE";

/// Main configuration structure for the vrecode-core library.
///
/// All fields have defaults; [`CoreConfigBuilder`] provides a fluent way to
/// override them and to apply environment overrides.
///
/// # Examples
///
/// ```rust
/// use vrecode_core::config::CoreConfigBuilder;
/// use vrecode_core::HardwareBackend;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .output_dir(PathBuf::from("/srv/converted"))
///     .backend(HardwareBackend::Vaapi)
///     .vaapi_device("/dev/dri/renderD129")
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Where outputs are written; the input's own directory when unset.
    pub output_dir: Option<PathBuf>,

    /// Backend to use instead of the one selected for the host.
    pub backend_override: Option<HardwareBackend>,

    /// Render node handed to the VAAPI backend.
    pub vaapi_device: String,

    /// Use the backend's H.265 decoder for H.265 inputs.
    pub prefer_hevc_decode: bool,

    /// Verify ffmpeg and ffprobe are installed before the first session.
    pub ffmpeg_check: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            backend_override: None,
            vaapi_device: DEFAULT_VAAPI_DEVICE.to_string(),
            prefer_hevc_decode: true,
            ffmpeg_check: true,
        }
    }
}

impl CoreConfig {
    /// Checks the configuration for values no conversion could use.
    pub fn validate(&self) -> CoreResult<()> {
        if self.vaapi_device.trim().is_empty() {
            return Err(CoreError::Config("VAAPI device path must not be empty".to_string()));
        }
        if let Some(dir) = &self.output_dir {
            if dir.as_os_str().is_empty() {
                return Err(CoreError::Config("output directory must not be empty".to_string()));
            }
        }
        Ok(())
    }

    /// The backend a transcode will use: the override when set, else the host's.
    pub fn backend_selection(&self) -> BackendSelection {
        match self.backend_override {
            Some(backend) => BackendSelection::Supported(backend),
            None => HardwareBackend::detect(),
        }
    }

    /// Output directory for `descriptor`: the configured one or the input's parent.
    pub fn output_dir_for(&self, descriptor: &VideoDescriptor) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(descriptor.parent_dir()))
    }
}
