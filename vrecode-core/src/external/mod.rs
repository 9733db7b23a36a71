// ============================================================================
// vrecode-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Media prober, decode source and encode sink abstractions
//
// Decoding and encoding are delegated to an external media toolkit. This
// module defines the seams the core depends on (MediaProber, MediaToolkit,
// DecodeSource, EncodeSink) together with the value types that cross them.
// The shipped implementations drive ffprobe (through the `ffprobe` crate) and
// ffmpeg (through `ffmpeg-sidecar`).
//
// KEY COMPONENTS:
// - MediaProber: codec/container identification for one file
// - MediaToolkit: opens decode sources and encode sinks
// - DecodeSource / EncodeSink: the frame pipeline endpoints
// - Dependency checking for the ffmpeg binary

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::media::CodecId;

// ---- Standard library imports ----
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// ffmpeg-sidecar backed decode source and encode sink
pub mod ffmpeg_executor;

/// ffprobe backed media prober
pub mod ffprobe_executor;

/// Recording test doubles for the traits in this module
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

pub use ffmpeg_executor::{SidecarDecodeSource, SidecarEncodeSink, SidecarToolkit};
pub use ffprobe_executor::CrateFfprobeExecutor;

// ============================================================================
// VALUE TYPES
// ============================================================================

/// Stream identity extracted by a [`MediaProber`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub video_codec: CodecId,
    pub audio_codec: CodecId,
    /// Raw demuxer format name, e.g. `mov,mp4,m4a,3gp,3g2,mj2`.
    pub container_format: String,
}

/// Properties of an opened decode source that the encode sink inherits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamParameters {
    pub video_codec: CodecId,
    pub width: u32,
    pub height: u32,
    pub frame_rate: f64,
    /// Bits per second, when the container or stream declares one.
    pub video_bitrate: Option<u64>,
    /// Display aspect ratio as width / height.
    pub aspect_ratio: Option<f64>,
    /// Zero when the source has no audio.
    pub audio_channels: u32,
    pub sample_rate: Option<u32>,
    /// Extra audio options passed through to the encoder (e.g. `channel_layout`).
    pub audio_options: BTreeMap<String, String>,
}

/// One decoded unit travelling from the decode source to the encode sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Zero-based position in decode order.
    pub index: u64,
    pub width: u32,
    pub height: u32,
    /// Presentation time in seconds.
    pub timestamp: f32,
    pub data: Vec<u8>,
}

/// How a decode source should be opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Ask for H.265 decoding when the input is H.265.
    pub prefer_hevc: bool,
    /// Hardware decoder to use when the preference applies (e.g. `hevc_cuvid`).
    pub decoder: Option<String>,
    /// Opaque hardware acceleration arguments placed before the input.
    pub hwaccel_args: Vec<String>,
}

/// Everything an encode sink needs to produce the output container.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeSettings {
    pub width: u32,
    pub height: u32,
    pub audio_channels: u32,
    pub frame_rate: f64,
    pub video_bitrate: Option<u64>,
    pub aspect_ratio: Option<f64>,
    pub audio_options: BTreeMap<String, String>,
    pub sample_rate: Option<u32>,
    /// Hardware encoder name (e.g. `hevc_vaapi`, `h264_nvenc`).
    pub video_encoder: String,
    /// Opaque backend options rendered as `-key value` pairs.
    pub encoder_options: Vec<(String, String)>,
    /// Output container, always `mp4`.
    pub format: String,
    /// Output audio codec, always `aac`.
    pub audio_codec: String,
    /// File the sink reads the audio track from.
    pub audio_source: Option<PathBuf>,
}

// ============================================================================
// TRAITS
// ============================================================================

/// Identifies the codecs and container of a media file.
pub trait MediaProber {
    /// Probes `path`. Implementations release whatever they open before returning.
    fn probe(&self, path: &Path) -> CoreResult<ProbeReport>;
}

/// A pull-based stream of decoded frames.
pub trait DecodeSource {
    /// Parameters of the opened input.
    fn parameters(&self) -> &StreamParameters;

    /// Returns the next frame, or `None` once the input is exhausted.
    fn next_frame(&mut self) -> CoreResult<Option<Frame>>;

    /// Releases the source. Called exactly once per opened source.
    fn close(&mut self) -> CoreResult<()>;
}

/// A blocking frame consumer that writes the output container.
pub trait EncodeSink {
    /// Encodes one frame, blocking until the toolkit has accepted it.
    fn push(&mut self, frame: Frame) -> CoreResult<()>;

    /// Finalizes the container and releases the sink.
    fn close(&mut self) -> CoreResult<()>;
}

/// Factory for decode sources and encode sinks.
pub trait MediaToolkit {
    type Source: DecodeSource;
    type Sink: EncodeSink;

    fn open_source(&self, input: &Path, options: &DecodeOptions) -> CoreResult<Self::Source>;

    fn open_sink(&self, output: &Path, settings: &EncodeSettings) -> CoreResult<Self::Sink>;
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `<cmd_name> -version` with all output discarded.
///
/// # Returns
///
/// * `Ok(())` - If the command could be started
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
/// * `Err(CoreError::CommandStart)` - If the command exists but fails to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dependency_is_reported_by_name() {
        let err = check_dependency("vrecode-surely-not-installed").unwrap_err();
        assert!(matches!(err, CoreError::DependencyNotFound(ref name) if name == "vrecode-surely-not-installed"));
    }
}
