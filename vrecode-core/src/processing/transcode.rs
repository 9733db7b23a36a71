// ============================================================================
// vrecode-core/src/processing/transcode.rs
// ============================================================================
//
// TRANSCODE ORCHESTRATION: Fast copy or hardware re-encode
//
// Decides how a probed video becomes a browser-playable mp4 and drives the
// work to completion.
//
// WORKFLOW:
// 1. Reject descriptors that are not videos
// 2. Resolve and prepare the output path
// 3. Copy the bytes when codecs and container are already compatible
// 4. Otherwise select the host's hardware backend, open a decode source and
//    an encode sink, and stream frames one at a time until the source ends
// 5. Release the sink, then the source, whatever happened in step 4

// ---- Internal crate imports ----
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{
    DecodeOptions, DecodeSource, EncodeSettings, EncodeSink, MediaToolkit, StreamParameters,
};
use crate::hardware::{BackendSelection, HardwareBackend};
use crate::media::VideoDescriptor;
use crate::output_path::resolve_output_path;
use crate::processing::session::SessionGuard;
use crate::progress::{ProgressCallback, ProgressEvent};

// ---- External crate imports ----
use log::{debug, info};

// ---- Standard library imports ----
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Container every output is written in.
pub const OUTPUT_FORMAT: &str = "mp4";

/// Audio codec every transcoded output uses.
pub const OUTPUT_AUDIO_CODEC: &str = "aac";

// ============================================================================
// TYPES
// ============================================================================

/// Lifecycle of one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeState {
    Idle,
    Probed,
    FastCopy,
    HardwareTranscode,
    Done,
    Failed,
}

impl fmt::Display for TranscodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TranscodeState::Idle => "idle",
            TranscodeState::Probed => "probed",
            TranscodeState::FastCopy => "fast-copy",
            TranscodeState::HardwareTranscode => "hardware-transcode",
            TranscodeState::Done => "done",
            TranscodeState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How the output was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeMode {
    /// Byte-for-byte copy of a compatible source.
    FastCopy,
    /// Re-encoded with the given backend.
    HardwareTranscode(HardwareBackend),
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeOutcome {
    /// Absolute output path using `/` separators.
    pub output_path: String,
    pub mode: TranscodeMode,
    /// Frames pushed to the encode sink; zero for a fast copy.
    pub frames: u64,
    pub elapsed: Duration,
}

/// Logs state transitions for one input.
struct StateTracker<'a> {
    input: &'a str,
    state: TranscodeState,
}

impl<'a> StateTracker<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            state: TranscodeState::Idle,
        }
    }

    fn advance(&mut self, next: TranscodeState) {
        debug!("{}: {} -> {}", self.input, self.state, next);
        self.state = next;
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Converts `descriptor` into a browser-playable mp4 under `output_dir` using
/// the default configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use vrecode_core::{CrateFfprobeExecutor, NullProgressCallback, SidecarToolkit, VideoDescriptor, convert};
/// use std::path::Path;
///
/// let descriptor = VideoDescriptor::probe(Path::new("/videos/holiday.avi"), &CrateFfprobeExecutor::new());
/// let toolkit = SidecarToolkit::checked()?;
/// let outcome = convert(&descriptor, Path::new("/videos/out"), &toolkit, &NullProgressCallback)?;
/// println!("{}", outcome.output_path);
/// # Ok::<(), vrecode_core::CoreError>(())
/// ```
pub fn convert<T: MediaToolkit>(
    descriptor: &VideoDescriptor,
    output_dir: &Path,
    toolkit: &T,
    progress: &dyn ProgressCallback,
) -> CoreResult<TranscodeOutcome> {
    convert_with_config(descriptor, output_dir, toolkit, progress, &CoreConfig::default())
}

/// Like [`convert`], with backend selection and decode preferences taken from `config`.
pub fn convert_with_config<T: MediaToolkit>(
    descriptor: &VideoDescriptor,
    output_dir: &Path,
    toolkit: &T,
    progress: &dyn ProgressCallback,
    config: &CoreConfig,
) -> CoreResult<TranscodeOutcome> {
    convert_with_selection(
        descriptor,
        output_dir,
        toolkit,
        progress,
        config,
        config.backend_selection(),
    )
}

pub(crate) fn convert_with_selection<T: MediaToolkit>(
    descriptor: &VideoDescriptor,
    output_dir: &Path,
    toolkit: &T,
    progress: &dyn ProgressCallback,
    config: &CoreConfig,
    selection: BackendSelection,
) -> CoreResult<TranscodeOutcome> {
    let mut tracker = StateTracker::new(descriptor.absolute_path());
    let result = run(
        &mut tracker,
        descriptor,
        output_dir,
        toolkit,
        progress,
        config,
        selection,
    );
    match &result {
        Ok(outcome) => {
            tracker.advance(TranscodeState::Done);
            progress.on_progress(ProgressEvent::Complete {
                output_path: PathBuf::from(&outcome.output_path),
                frames: outcome.frames,
                elapsed: outcome.elapsed,
            });
        }
        Err(e) => {
            tracker.advance(TranscodeState::Failed);
            debug!("{}: {}", descriptor.absolute_path(), e);
        }
    }
    result
}

// ============================================================================
// PIPELINE
// ============================================================================

fn run<T: MediaToolkit>(
    tracker: &mut StateTracker<'_>,
    descriptor: &VideoDescriptor,
    output_dir: &Path,
    toolkit: &T,
    progress: &dyn ProgressCallback,
    config: &CoreConfig,
    selection: BackendSelection,
) -> CoreResult<TranscodeOutcome> {
    let start = Instant::now();

    if !descriptor.is_video() {
        return Err(CoreError::NotAVideo(descriptor.absolute_path().to_string()));
    }
    tracker.advance(TranscodeState::Probed);

    let output_path = resolve_output_path(output_dir, descriptor)?;
    let input_path = descriptor.source_path();

    if descriptor.can_play_in_browser_ignoring_extension() {
        tracker.advance(TranscodeState::FastCopy);
        progress.on_progress(ProgressEvent::FastCopy {
            input_path: input_path.clone(),
            output_path: PathBuf::from(&output_path),
        });
        let bytes = fs::copy(&input_path, &output_path)?;
        info!(
            "Copied {} -> {} ({})",
            input_path.display(),
            output_path,
            crate::utils::format_bytes(bytes)
        );
        return Ok(TranscodeOutcome {
            output_path,
            mode: TranscodeMode::FastCopy,
            frames: 0,
            elapsed: start.elapsed(),
        });
    }

    let backend = selection.into_result()?;
    tracker.advance(TranscodeState::HardwareTranscode);
    backend.log_capabilities(&config.vaapi_device);

    let decode_options = DecodeOptions {
        prefer_hevc: config.prefer_hevc_decode,
        decoder: Some(backend.decoder_name().to_string()),
        hwaccel_args: backend.decode_hwaccel_args(&config.vaapi_device),
    };
    let mut source = SessionGuard::source(toolkit.open_source(&input_path, &decode_options)?);

    let settings = encode_settings(
        source.get_mut().parameters(),
        backend,
        &config.vaapi_device,
        &input_path,
    );
    let mut sink = SessionGuard::sink(toolkit.open_sink(Path::new(&output_path), &settings)?);

    progress.on_progress(ProgressEvent::TranscodeStart {
        input_path: input_path.clone(),
        output_path: PathBuf::from(&output_path),
        backend: backend.name().to_string(),
        width: settings.width,
        height: settings.height,
    });

    let frames = pump_frames(source.get_mut(), sink.get_mut(), progress)?;

    sink.release();
    source.release();

    info!("Encoded {} frames into {}", frames, output_path);
    Ok(TranscodeOutcome {
        output_path,
        mode: TranscodeMode::HardwareTranscode(backend),
        frames,
        elapsed: start.elapsed(),
    })
}

/// Moves frames from `source` to `sink` one at a time until the source ends.
fn pump_frames<S: DecodeSource, K: EncodeSink>(
    source: &mut S,
    sink: &mut K,
    progress: &dyn ProgressCallback,
) -> CoreResult<u64> {
    let mut frames = 0u64;
    while let Some(frame) = source.next_frame()? {
        sink.push(frame)?;
        frames += 1;
        progress.on_progress(ProgressEvent::FrameEncoded { count: frames });
    }
    Ok(frames)
}

/// Encode settings inherited from the source, with the container and audio
/// codec forced to browser-compatible values.
pub fn encode_settings(
    parameters: &StreamParameters,
    backend: HardwareBackend,
    device: &str,
    audio_source: &Path,
) -> EncodeSettings {
    EncodeSettings {
        width: parameters.width,
        height: parameters.height,
        audio_channels: parameters.audio_channels,
        frame_rate: parameters.frame_rate,
        video_bitrate: parameters.video_bitrate,
        aspect_ratio: parameters.aspect_ratio,
        audio_options: parameters.audio_options.clone(),
        sample_rate: parameters.sample_rate,
        video_encoder: backend.encoder_name().to_string(),
        encoder_options: backend.encode_options(device),
        format: OUTPUT_FORMAT.to_string(),
        audio_codec: OUTPUT_AUDIO_CODEC.to_string(),
        audio_source: (parameters.audio_channels > 0).then(|| audio_source.to_path_buf()),
    }
}
