// ============================================================================
// vrecode-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Decode source and encode sink backed by ffmpeg-sidecar
//
// The decode source runs one ffmpeg process that writes raw RGB frames to
// stdout; ffmpeg-sidecar parses them into OutputFrame events which are handed
// out one at a time. The encode sink runs a second ffmpeg process that reads
// the same raw frames from stdin, muxes the audio track straight from the
// original input and writes the mp4.
//
// KEY COMPONENTS:
// - SidecarToolkit: MediaToolkit implementation
// - SidecarDecodeSource: pull-based frame reader
// - SidecarEncodeSink: blocking frame writer
// - decode_args / encode_args: ffmpeg argument construction

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error};
use crate::external::{
    CrateFfprobeExecutor, DecodeOptions, DecodeSource, EncodeSettings, EncodeSink, Frame,
    MediaToolkit, StreamParameters, check_dependency,
};
use crate::media::CodecId;

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use ffmpeg_sidecar::iter::FfmpegIterator;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ChildStdin;
use std::thread::JoinHandle;

/// Raw pixel format exchanged between the two ffmpeg processes.
const RAW_PIXEL_FORMAT: &str = "rgb24";

/// Frame rate assumed when the source does not declare one.
const FALLBACK_FRAME_RATE: f64 = 30.0;

// ============================================================================
// TOOLKIT
// ============================================================================

/// [`MediaToolkit`] that spawns ffmpeg processes through `ffmpeg-sidecar`.
#[derive(Debug, Clone, Default)]
pub struct SidecarToolkit {
    prober: CrateFfprobeExecutor,
}

impl SidecarToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Like [`SidecarToolkit::new`], but first verifies ffmpeg and ffprobe are installed.
    pub fn checked() -> CoreResult<Self> {
        check_dependency("ffmpeg")?;
        check_dependency("ffprobe")?;
        Ok(Self::new())
    }
}

impl MediaToolkit for SidecarToolkit {
    type Source = SidecarDecodeSource;
    type Sink = SidecarEncodeSink;

    fn open_source(&self, input: &Path, options: &DecodeOptions) -> CoreResult<Self::Source> {
        let parameters = self
            .prober
            .stream_parameters(input)
            .map_err(|e| CoreError::DecodeOpen(input.display().to_string(), e.to_string()))?;
        SidecarDecodeSource::spawn(input, options, parameters)
    }

    fn open_sink(&self, output: &Path, settings: &EncodeSettings) -> CoreResult<Self::Sink> {
        SidecarEncodeSink::spawn(output, settings)
    }
}

// ============================================================================
// DECODE SOURCE
// ============================================================================

/// Maps a backend decoder name to an ffmpeg `-c:v` decoder, if ffmpeg has one.
///
/// ffmpeg ships no `*_vaapi` decoders; VAAPI decoding is selected by the
/// `-hwaccel vaapi` arguments alone, with ffmpeg's native HEVC decoder.
pub fn ffmpeg_decoder(name: &str) -> Option<&str> {
    if name.is_empty() || name.ends_with("_vaapi") {
        None
    } else {
        Some(name)
    }
}

/// Builds the ffmpeg arguments for a decode source.
///
/// The hardware decoder is only forced when H.265 decoding is preferred, the
/// input actually is H.265 and ffmpeg has a decoder of that name. Autorotation
/// is disabled so frames keep the coded size the encode sink is configured with.
pub fn decode_args(input: &Path, options: &DecodeOptions, parameters: &StreamParameters) -> Vec<String> {
    let mut args: Vec<String> = options.hwaccel_args.clone();
    if options.prefer_hevc && parameters.video_codec == CodecId::Hevc {
        if let Some(decoder) = options.decoder.as_deref().and_then(ffmpeg_decoder) {
            args.extend(["-c:v".to_string(), decoder.to_string()]);
        }
    }
    args.extend([
        "-noautorotate".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
    ]);
    args.extend(
        ["-map", "0:v:0", "-an", "-sn", "-f", "rawvideo", "-pix_fmt", RAW_PIXEL_FORMAT, "-"]
            .iter()
            .map(|s| s.to_string()),
    );
    args
}

/// Pull-based frame reader over an ffmpeg child process.
pub struct SidecarDecodeSource {
    input: PathBuf,
    child: FfmpegChild,
    events: FfmpegIterator,
    parameters: StreamParameters,
    next_index: u64,
    exhausted: bool,
    exited: bool,
    closed: bool,
    last_error: Option<String>,
}

impl SidecarDecodeSource {
    fn spawn(input: &Path, options: &DecodeOptions, parameters: StreamParameters) -> CoreResult<Self> {
        let args = decode_args(input, options, &parameters);
        log::debug!("Running decode source: ffmpeg {}", args.join(" "));

        let mut cmd = FfmpegCommand::new();
        cmd.args(&args);
        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error("ffmpeg (decode source)", e))?;
        let events = match child.iter() {
            Ok(events) => events,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CoreError::DecodeOpen(input.display().to_string(), e.to_string()));
            }
        };

        Ok(Self {
            input: input.to_path_buf(),
            child,
            events,
            parameters,
            next_index: 0,
            exhausted: false,
            exited: false,
            closed: false,
            last_error: None,
        })
    }

    fn finish(&mut self) -> CoreResult<()> {
        self.exhausted = true;
        let status = self
            .child
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (decode source)", e))?;
        self.exited = true;
        if status.success() {
            Ok(())
        } else {
            Err(command_failed_error(
                "ffmpeg (decode source)",
                status,
                self.last_error.take().unwrap_or_default(),
            ))
        }
    }
}

impl DecodeSource for SidecarDecodeSource {
    fn parameters(&self) -> &StreamParameters {
        &self.parameters
    }

    fn next_frame(&mut self) -> CoreResult<Option<Frame>> {
        if self.exhausted {
            return Ok(None);
        }

        for event in self.events.by_ref() {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    let index = self.next_index;
                    self.next_index += 1;
                    return Ok(Some(Frame {
                        index,
                        width: frame.width,
                        height: frame.height,
                        timestamp: frame.timestamp,
                        data: frame.data,
                    }));
                }
                FfmpegEvent::Error(msg) | FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg) => {
                    log::warn!("ffmpeg decode ({}): {}", self.input.display(), msg);
                    self.last_error = Some(msg);
                }
                FfmpegEvent::Done => break,
                _ => {}
            }
        }

        log::debug!(
            "Decode source exhausted after {} frames: {}",
            self.next_index,
            self.input.display()
        );
        self.finish()?;
        Ok(None)
    }

    fn close(&mut self) -> CoreResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.exited {
            return Ok(());
        }
        // Stopped before end of stream: the process is still producing frames.
        if let Err(e) = self.child.kill() {
            log::debug!("ffmpeg decode source already stopped: {}", e);
        }
        self.child
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (decode source)", e))?;
        self.exited = true;
        Ok(())
    }
}

// ============================================================================
// ENCODE SINK
// ============================================================================

/// Builds the ffmpeg arguments for an encode sink writing `output`.
pub fn encode_args(output: &Path, settings: &EncodeSettings) -> Vec<String> {
    let frame_rate = if settings.frame_rate > 0.0 {
        settings.frame_rate
    } else {
        FALLBACK_FRAME_RATE
    };
    let audio_source = settings
        .audio_source
        .as_ref()
        .filter(|_| settings.audio_channels > 0);

    let mut args: Vec<String> = vec![
        "-y".into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        RAW_PIXEL_FORMAT.into(),
        "-s".into(),
        format!("{}x{}", settings.width, settings.height),
        "-r".into(),
        format!("{frame_rate}"),
        "-i".into(),
        "-".into(),
    ];
    if let Some(source) = audio_source {
        args.extend(["-i".to_string(), source.to_string_lossy().into_owned()]);
    }
    args.extend(["-map".to_string(), "0:v:0".to_string()]);
    if audio_source.is_some() {
        args.extend(["-map".to_string(), "1:a:0?".to_string()]);
    }

    for (key, value) in &settings.encoder_options {
        args.extend([format!("-{key}"), value.clone()]);
    }
    args.extend(["-c:v".to_string(), settings.video_encoder.clone()]);
    if let Some(bitrate) = settings.video_bitrate {
        args.extend(["-b:v".to_string(), bitrate.to_string()]);
    }
    if let Some(aspect) = settings.aspect_ratio {
        args.extend(["-aspect".to_string(), format!("{aspect:.6}")]);
    }

    if audio_source.is_some() {
        args.extend([
            "-c:a".to_string(),
            settings.audio_codec.clone(),
            "-ac".to_string(),
            settings.audio_channels.to_string(),
        ]);
        if let Some(rate) = settings.sample_rate {
            args.extend(["-ar".to_string(), rate.to_string()]);
        }
        for (key, value) in &settings.audio_options {
            args.extend([format!("-{key}"), value.clone()]);
        }
    }

    args.extend([
        "-f".to_string(),
        settings.format.clone(),
        output.to_string_lossy().into_owned(),
    ]);
    args
}

/// Rejects frames whose size differs from the raw size the sink was opened with.
///
/// The encoder reads stdin as a fixed `-s WxH` stream, so a mismatched frame
/// would shear every frame after it.
pub fn check_frame_size(expected: (u32, u32), frame: &Frame) -> CoreResult<()> {
    if (frame.width, frame.height) == expected {
        return Ok(());
    }
    Err(CoreError::Encode(format!(
        "frame {} is {}x{}, encoder expects {}x{}",
        frame.index, frame.width, frame.height, expected.0, expected.1
    )))
}

/// Blocking frame writer over an ffmpeg child process.
pub struct SidecarEncodeSink {
    output: PathBuf,
    frame_size: (u32, u32),
    child: FfmpegChild,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<String>>,
    frames: u64,
    closed: bool,
}

impl SidecarEncodeSink {
    fn spawn(output: &Path, settings: &EncodeSettings) -> CoreResult<Self> {
        let args = encode_args(output, settings);
        log::debug!("Running encode sink: ffmpeg {}", args.join(" "));

        let mut cmd = FfmpegCommand::new();
        cmd.args(&args);
        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error("ffmpeg (encode sink)", e))?;

        let Some(stdin) = child.take_stdin() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(CoreError::EncodeOpen(
                output.display().to_string(),
                "ffmpeg stdin unavailable".to_string(),
            ));
        };
        // Drained on its own thread so a chatty encoder never blocks on a full pipe.
        let stderr = child.take_stderr().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        Ok(Self {
            output: output.to_path_buf(),
            frame_size: (settings.width, settings.height),
            child,
            stdin: Some(stdin),
            stderr,
            frames: 0,
            closed: false,
        })
    }
}

impl EncodeSink for SidecarEncodeSink {
    fn push(&mut self, frame: Frame) -> CoreResult<()> {
        check_frame_size(self.frame_size, &frame)?;
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CoreError::Encode(format!("{} is already closed", self.output.display())))?;
        stdin.write_all(&frame.data).map_err(|e| {
            CoreError::Encode(format!(
                "failed to write frame {} to {}: {}",
                frame.index,
                self.output.display(),
                e
            ))
        })?;
        self.frames += 1;
        Ok(())
    }

    fn close(&mut self) -> CoreResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // EOF on stdin lets ffmpeg flush and write the moov atom.
        drop(self.stdin.take());

        let status = self
            .child
            .wait()
            .map_err(|e| command_wait_error("ffmpeg (encode sink)", e))?;
        let stderr = self
            .stderr
            .take()
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(command_failed_error("ffmpeg (encode sink)", status, stderr));
        }
        log::debug!("Encode sink finalized {} ({} frames)", self.output.display(), self.frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn settings() -> EncodeSettings {
        EncodeSettings {
            width: 1280,
            height: 720,
            audio_channels: 2,
            frame_rate: 25.0,
            video_bitrate: Some(2_500_000),
            aspect_ratio: Some(16.0 / 9.0),
            audio_options: BTreeMap::from([("channel_layout".to_string(), "stereo".to_string())]),
            sample_rate: Some(48_000),
            video_encoder: "hevc_vaapi".to_string(),
            encoder_options: vec![
                ("vaapi_device".to_string(), "/dev/dri/renderD128".to_string()),
                ("vf".to_string(), "format=nv12,hwupload".to_string()),
            ],
            format: "mp4".to_string(),
            audio_codec: "aac".to_string(),
            audio_source: Some(PathBuf::from("/in/clip.avi")),
        }
    }

    fn pair_after(args: &[String], flag: &str) -> Option<String> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    }

    #[test]
    fn encode_args_force_mp4_and_aac() {
        let args = encode_args(Path::new("/out/clip_recode.mp4"), &settings());

        assert_eq!(pair_after(&args, "-c:v").as_deref(), Some("hevc_vaapi"));
        assert_eq!(pair_after(&args, "-c:a").as_deref(), Some("aac"));
        assert_eq!(pair_after(&args, "-ac").as_deref(), Some("2"));
        assert_eq!(pair_after(&args, "-ar").as_deref(), Some("48000"));
        assert_eq!(pair_after(&args, "-s").as_deref(), Some("1280x720"));
        assert_eq!(pair_after(&args, "-b:v").as_deref(), Some("2500000"));
        assert_eq!(pair_after(&args, "-channel_layout").as_deref(), Some("stereo"));
        assert_eq!(pair_after(&args, "-vaapi_device").as_deref(), Some("/dev/dri/renderD128"));
        assert_eq!(args.last().map(String::as_str), Some("/out/clip_recode.mp4"));
        let fmt = args.len() - 3;
        assert_eq!(args[fmt], "-f");
        assert_eq!(args[fmt + 1], "mp4");
    }

    #[test]
    fn encode_args_skip_audio_for_silent_sources() {
        let mut s = settings();
        s.audio_channels = 0;
        s.frame_rate = 0.0;
        let args = encode_args(Path::new("/out/a_recode.mp4"), &s);

        assert!(!args.iter().any(|a| a == "-c:a"));
        assert!(!args.iter().any(|a| a == "1:a:0?"));
        assert_eq!(args.iter().filter(|a| *a == "-i").count(), 1);
        assert_eq!(pair_after(&args, "-r").as_deref(), Some("30"));
    }

    #[test]
    fn decode_args_only_force_hevc_decoder_for_hevc_input() {
        let options = DecodeOptions {
            prefer_hevc: true,
            decoder: Some("hevc_cuvid".to_string()),
            hwaccel_args: vec!["-hwaccel".to_string(), "cuda".to_string()],
        };
        let mut params = StreamParameters {
            video_codec: CodecId::Hevc,
            ..Default::default()
        };

        let args = decode_args(Path::new("/in/a.mkv"), &options, &params);
        assert_eq!(&args[..4], ["-hwaccel", "cuda", "-c:v", "hevc_cuvid"]);
        assert_eq!(pair_after(&args, "-i").as_deref(), Some("/in/a.mkv"));
        assert_eq!(args.last().map(String::as_str), Some("-"));

        params.video_codec = CodecId::Other("mpeg4".to_string());
        let args = decode_args(Path::new("/in/a.avi"), &options, &params);
        assert!(!args.iter().any(|a| a == "hevc_cuvid"));
        assert_eq!(pair_after(&args, "-pix_fmt").as_deref(), Some("rgb24"));
    }

    #[test]
    fn vaapi_hevc_input_relies_on_hwaccel() {
        let options = DecodeOptions {
            prefer_hevc: true,
            decoder: Some("hevc_vaapi".to_string()),
            hwaccel_args: vec![
                "-hwaccel".to_string(),
                "vaapi".to_string(),
                "-hwaccel_device".to_string(),
                "/dev/dri/renderD128".to_string(),
            ],
        };
        let params = StreamParameters {
            video_codec: CodecId::Hevc,
            ..Default::default()
        };

        let args = decode_args(Path::new("/in/phone.mov"), &options, &params);
        assert!(!args.iter().any(|a| a == "-c:v"));
        assert!(!args.iter().any(|a| a == "hevc_vaapi"));
        assert_eq!(
            &args[..6],
            ["-hwaccel", "vaapi", "-hwaccel_device", "/dev/dri/renderD128", "-noautorotate", "-i"]
        );
    }

    #[test]
    fn only_real_decoders_are_forced() {
        assert_eq!(ffmpeg_decoder("hevc_cuvid"), Some("hevc_cuvid"));
        assert_eq!(ffmpeg_decoder("hevc_vaapi"), None);
        assert_eq!(ffmpeg_decoder(""), None);
    }

    #[test]
    fn decode_keeps_coded_orientation() {
        let args = decode_args(
            Path::new("/in/portrait.mov"),
            &DecodeOptions::default(),
            &StreamParameters::default(),
        );
        let noautorotate = args.iter().position(|a| a == "-noautorotate");
        let input = args.iter().position(|a| a == "-i");
        assert!(matches!((noautorotate, input), (Some(n), Some(i)) if n < i));
    }

    #[test]
    fn frames_of_another_size_are_rejected() {
        let frame = |width: u32, height: u32| Frame {
            index: 7,
            width,
            height,
            timestamp: 0.28,
            data: Vec::new(),
        };

        assert!(check_frame_size((1920, 1080), &frame(1920, 1080)).is_ok());
        let err = check_frame_size((1920, 1080), &frame(1080, 1920)).unwrap_err();
        assert!(matches!(err, CoreError::Encode(_)));
        assert!(err.to_string().contains("1080x1920"));
    }
}
