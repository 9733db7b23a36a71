//! FFprobe integration for codec identification and stream parameters.
//!
//! Each call runs one ffprobe process to completion, so nothing stays open
//! between calls.
use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::external::{MediaProber, ProbeReport, StreamParameters};
use crate::media::CodecId;
use crate::utils::{parse_frame_rate, parse_ratio};
use ffprobe::{FfProbe, FfProbeError, ffprobe};
use std::collections::BTreeMap;
use std::path::Path;

/// [`MediaProber`] backed by the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Reads the properties a decode source exposes to the encode sink.
    pub fn stream_parameters(&self, input_path: &Path) -> CoreResult<StreamParameters> {
        log::debug!(
            "Running ffprobe (via crate) for stream parameters on: {}",
            input_path.display()
        );
        let metadata = run_ffprobe(input_path, "stream parameters")?;
        stream_parameters_from(&metadata, input_path)
    }
}

impl MediaProber for CrateFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<ProbeReport> {
        log::debug!(
            "Running ffprobe (via crate) for codec identification on: {}",
            input_path.display()
        );
        let metadata = run_ffprobe(input_path, "codec identification")?;
        Ok(report_from(&metadata))
    }
}

fn run_ffprobe(input_path: &Path, context: &str) -> CoreResult<FfProbe> {
    ffprobe(input_path).map_err(|err| {
        log::debug!("ffprobe failed for {} on {}: {:?}", context, input_path.display(), err);
        map_ffprobe_error(err, context)
    })
}

fn codec_of(metadata: &FfProbe, codec_type: &str) -> CodecId {
    metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some(codec_type))
        .and_then(|s| s.codec_name.as_deref())
        .map(CodecId::from_ffprobe_name)
        .unwrap_or_default()
}

fn report_from(metadata: &FfProbe) -> ProbeReport {
    ProbeReport {
        video_codec: codec_of(metadata, "video"),
        audio_codec: codec_of(metadata, "audio"),
        container_format: metadata.format.format_name.clone(),
    }
}

fn stream_parameters_from(metadata: &FfProbe, input_path: &Path) -> CoreResult<StreamParameters> {
    let video_stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            CoreError::FfprobeParse(format!("No video stream found in {}", input_path.display()))
        })?;

    let width = video_stream.width.unwrap_or(0);
    let height = video_stream.height.unwrap_or(0);
    if width <= 0 || height <= 0 {
        return Err(CoreError::FfprobeParse(format!(
            "Invalid dimensions found in {}: width={}, height={}",
            input_path.display(),
            width,
            height
        )));
    }

    let frame_rate = parse_frame_rate(&video_stream.r_frame_rate)
        .or_else(|| parse_frame_rate(&video_stream.avg_frame_rate))
        .unwrap_or(0.0);

    let video_bitrate = video_stream
        .bit_rate
        .as_deref()
        .or(metadata.format.bit_rate.as_deref())
        .and_then(|b| b.parse::<u64>().ok());

    let aspect_ratio = video_stream
        .display_aspect_ratio
        .as_deref()
        .and_then(parse_ratio);

    let mut params = StreamParameters {
        video_codec: video_stream
            .codec_name
            .as_deref()
            .map(CodecId::from_ffprobe_name)
            .unwrap_or_default(),
        width: width as u32,
        height: height as u32,
        frame_rate,
        video_bitrate,
        aspect_ratio,
        ..Default::default()
    };

    if let Some(audio_stream) = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
    {
        params.audio_channels = audio_stream.channels.map_or(0, |c| c.max(0) as u32);
        params.sample_rate = audio_stream
            .sample_rate
            .as_deref()
            .and_then(|r| r.parse::<u32>().ok());
        let mut options = BTreeMap::new();
        if let Some(layout) = audio_stream.channel_layout.as_deref() {
            options.insert("channel_layout".to_string(), layout.to_string());
        }
        params.audio_options = options;
    }

    Ok(params)
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => {
            CoreError::FfprobeParse(format!("ffprobe {context} output deserialization: {err}"))
        }
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error during {context}: {err:?}")),
    }
}
