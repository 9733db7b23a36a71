//! Hardware backend selection and configuration.
//!
//! Each supported host platform maps to exactly one hardware-accelerated
//! decode/encode configuration:
//!
//! | Host    | Backend | Decoder      | Encoder      |
//! |---------|---------|--------------|--------------|
//! | Linux   | VAAPI   | `hevc_vaapi` | `hevc_vaapi` |
//! | Windows | NVENC   | `hevc_cuvid` | `h264_nvenc` |
//!
//! Every other host is reported as [`BackendSelection::Unsupported`]. Option
//! strings are driver-specific and are treated as opaque data by the
//! orchestrator.

use crate::error::{CoreError, CoreResult};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Default VAAPI render node.
pub const DEFAULT_VAAPI_DEVICE: &str = "/dev/dri/renderD128";

/// A platform-specific hardware decode/encode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HardwareBackend {
    /// Video Acceleration API (Linux).
    Vaapi,
    /// NVIDIA NVDEC/NVENC (Windows).
    Nvenc,
}

/// Outcome of looking up the backend for a host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSelection {
    Supported(HardwareBackend),
    Unsupported { os: String },
}

impl BackendSelection {
    /// Converts to a result, mapping unsupported hosts to [`CoreError::UnsupportedPlatform`].
    pub fn into_result(self) -> CoreResult<HardwareBackend> {
        match self {
            BackendSelection::Supported(backend) => Ok(backend),
            BackendSelection::Unsupported { os } => Err(CoreError::UnsupportedPlatform(os)),
        }
    }
}

impl HardwareBackend {
    /// Every backend, in lookup order.
    pub const ALL: [HardwareBackend; 2] = [HardwareBackend::Vaapi, HardwareBackend::Nvenc];

    /// Looks up the backend for an `std::env::consts::OS` style platform name.
    #[must_use]
    pub fn select(os: &str) -> BackendSelection {
        Self::ALL
            .into_iter()
            .find(|backend| backend.platform() == os)
            .map_or_else(
                || BackendSelection::Unsupported { os: os.to_string() },
                BackendSelection::Supported,
            )
    }

    /// Looks up the backend for the running host.
    #[must_use]
    pub fn detect() -> BackendSelection {
        Self::select(env::consts::OS)
    }

    /// Host platform this backend is configured for.
    #[must_use]
    pub fn platform(self) -> &'static str {
        match self {
            HardwareBackend::Vaapi => "linux",
            HardwareBackend::Nvenc => "windows",
        }
    }

    /// Human-readable backend name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            HardwareBackend::Vaapi => "VAAPI",
            HardwareBackend::Nvenc => "NVENC",
        }
    }

    /// Hardware decoder used when the input is H.265.
    #[must_use]
    pub fn decoder_name(self) -> &'static str {
        match self {
            HardwareBackend::Vaapi => "hevc_vaapi",
            HardwareBackend::Nvenc => "hevc_cuvid",
        }
    }

    /// Hardware video encoder.
    #[must_use]
    pub fn encoder_name(self) -> &'static str {
        match self {
            HardwareBackend::Vaapi => "hevc_vaapi",
            HardwareBackend::Nvenc => "h264_nvenc",
        }
    }

    /// Whether the backend addresses a device node.
    #[must_use]
    pub fn uses_device(self) -> bool {
        matches!(self, HardwareBackend::Vaapi)
    }

    /// Arguments placed before the decode source's input.
    #[must_use]
    pub fn decode_hwaccel_args(self, device: &str) -> Vec<String> {
        match self {
            HardwareBackend::Vaapi => vec![
                "-hwaccel".into(),
                "vaapi".into(),
                "-hwaccel_device".into(),
                device.into(),
            ],
            HardwareBackend::Nvenc => vec!["-hwaccel".into(), "cuda".into()],
        }
    }

    /// Encoder options as `(key, value)` pairs, including pixel-format negotiation.
    #[must_use]
    pub fn encode_options(self, device: &str) -> Vec<(String, String)> {
        match self {
            HardwareBackend::Vaapi => vec![
                ("vaapi_device".into(), device.into()),
                ("vf".into(), "format=nv12,hwupload".into()),
            ],
            HardwareBackend::Nvenc => Vec::new(),
        }
    }

    /// Logs the selected backend at info level.
    pub fn log_capabilities(self, device: &str) {
        if self.uses_device() {
            log::info!("Hardware backend: {} ({}, device {})", self.name(), self.encoder_name(), device);
        } else {
            log::info!("Hardware backend: {} ({})", self.name(), self.encoder_name());
        }
    }
}

impl fmt::Display for HardwareBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HardwareBackend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vaapi" => Ok(HardwareBackend::Vaapi),
            "nvenc" => Ok(HardwareBackend::Nvenc),
            other => Err(CoreError::Config(format!(
                "unknown hardware backend '{other}' (expected 'vaapi' or 'nvenc')"
            ))),
        }
    }
}
