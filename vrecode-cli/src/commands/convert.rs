//! Implementation of the default convert command.
//!
//! Probes each input, skips anything that is not a video, converts the rest
//! through vrecode-core and prints one output path per line.

use crate::cli::Cli;
use crate::cli_error;
use crate::error::{CliErrorContext, CliResult};
use crate::logging::get_timestamp;
use crate::progress::SpinnerProgress;

use vrecode_core::{
    CoreConfig, CoreConfigBuilder, CoreError, CrateFfprobeExecutor, SidecarToolkit,
    TranscodeMode, VideoDescriptor, check_dependency, convert_with_config, find_candidate_files,
    is_recode_output,
};

use log::{debug, error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Builds the core configuration: defaults, then environment, then flags.
pub fn build_config(cli: &Cli) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new()
        .apply_env()
        .cli_context("Reading VRECODE_* environment")?;
    if let Some(dir) = &cli.output_dir {
        builder = builder.output_dir(dir.clone());
    }
    if let Some(backend) = cli.backend {
        builder = builder.backend(backend);
    }
    if let Some(device) = &cli.vaapi_device {
        builder = builder.vaapi_device(device.clone());
    }
    let config = builder.build();
    config.validate()?;
    Ok(config)
}

/// Expands the input argument into the files to handle.
///
/// A directory yields its top-level files, minus earlier `*_recode.mp4`
/// outputs; an empty directory yields none.
pub fn collect_inputs(input: &Path) -> CliResult<Vec<PathBuf>> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }
    match find_candidate_files(input) {
        Ok(files) => {
            let (outputs, files): (Vec<_>, Vec<_>) =
                files.into_iter().partition(|path| is_recode_output(path));
            if !outputs.is_empty() {
                debug!("Skipping {} earlier output(s) in {}", outputs.len(), input.display());
            }
            info!("Found {} file(s) in {}", files.len(), input.display());
            Ok(files)
        }
        Err(CoreError::NoFilesFound(dir)) => {
            warn!("No files found in {}", dir);
            Ok(Vec::new())
        }
        Err(e) => Err(e).cli_with_context(|| format!("Listing {}", input.display())),
    }
}

/// Runs the command, writing output paths (or probe JSON) to `out`.
///
/// A missing or empty input argument is logged and treated as success.
pub fn run_convert<W: Write>(cli: &Cli, out: &mut W) -> CliResult<()> {
    let Some(input) = cli
        .input_path
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty())
    else {
        error!("No input path given");
        return Ok(());
    };

    let config = build_config(cli)?;
    let inputs = collect_inputs(input)?;
    let prober = CrateFfprobeExecutor::new();

    if cli.probe {
        for path in &inputs {
            let descriptor = VideoDescriptor::probe(path, &prober);
            let json = serde_json::to_string(&descriptor)
                .cli_with_context(|| format!("Serializing descriptor for {}", path.display()))?;
            writeln!(out, "{json}")?;
        }
        return Ok(());
    }

    debug!("Run {} with {:?}", get_timestamp(), config);
    let start = Instant::now();
    let toolkit = SidecarToolkit::new();
    let progress = SpinnerProgress::new();
    let mut tools_checked = !config.ffmpeg_check;
    let mut attempted = 0usize;
    let mut failures: Vec<CoreError> = Vec::new();

    for path in &inputs {
        let descriptor = VideoDescriptor::probe(path, &prober);
        if !descriptor.is_video() {
            info!(
                "Skipping: {}",
                CoreError::NotAVideo(descriptor.absolute_path().to_string())
            );
            continue;
        }
        if !tools_checked {
            check_dependency("ffmpeg")?;
            check_dependency("ffprobe")?;
            tools_checked = true;
        }

        attempted += 1;
        info!("Processing: {}", descriptor.absolute_path());
        let output_dir = config.output_dir_for(&descriptor);
        match convert_with_config(&descriptor, &output_dir, &toolkit, &progress, &config) {
            Ok(outcome) => {
                if outcome.mode == TranscodeMode::FastCopy {
                    debug!("{} was already browser-compatible", descriptor.file_name());
                }
                writeln!(out, "{}", outcome.output_path)?;
            }
            Err(e) => {
                error!("{}: {}", descriptor.absolute_path(), e);
                failures.push(e);
            }
        }
    }

    if attempted > 1 {
        info!(
            "Converted {} of {} file(s) in {}",
            attempted - failures.len(),
            attempted,
            vrecode_core::format_duration(start.elapsed())
        );
    }

    match (failures.len(), attempted) {
        (0, _) => Ok(()),
        (1, 1) => Err(failures.remove(0)),
        (failed, total) => Err(cli_error!("{} of {} conversions failed", failed, total)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsStr;
    use std::fs::{self, File};
    use tempfile::tempdir;
    use vrecode_core::HardwareBackend;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "vrecode",
            "a.avi",
            "--output-dir",
            "/srv/out",
            "--backend",
            "vaapi",
            "--vaapi-device",
            "/dev/dri/renderD129",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("/srv/out")));
        assert_eq!(config.backend_override, Some(HardwareBackend::Vaapi));
        assert_eq!(config.vaapi_device, "/dev/dri/renderD129");
    }

    #[test]
    fn empty_device_flag_is_rejected() {
        let cli = Cli::parse_from(["vrecode", "a.avi", "--vaapi-device", ""]);
        assert!(matches!(build_config(&cli), Err(CoreError::Config(_))));
    }

    #[test]
    fn directory_inputs_expand_to_sorted_files() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("b.avi")).unwrap();
        File::create(dir.path().join("a.mkv")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();

        let inputs = collect_inputs(dir.path()).unwrap();
        assert_eq!(inputs, [dir.path().join("a.mkv"), dir.path().join("b.avi")]);
    }

    #[test]
    fn earlier_outputs_are_not_converted_again() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.avi")).unwrap();
        File::create(dir.path().join("a_recode.mp4")).unwrap();

        let inputs = collect_inputs(dir.path()).unwrap();
        assert_eq!(inputs, [dir.path().join("a.avi")]);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        assert!(collect_inputs(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_input_argument_is_not_an_error() {
        let cli = Cli::parse_from(["vrecode"]);
        let mut out = Vec::new();
        run_convert(&cli, &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn missing_file_produces_no_output() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone.avi");
        let cli = Cli::parse_from([OsStr::new("vrecode"), missing.as_os_str()]);
        let mut out = Vec::new();
        run_convert(&cli, &mut out).unwrap();
        assert!(out.is_empty());
        assert!(!dir.path().join("gone_recode.mp4").exists());
    }

    #[test]
    fn probe_prints_descriptor_json() {
        let dir = tempdir().unwrap();
        let clip = dir.path().join("gone.avi");
        fs::write(&clip, b"junk").unwrap();
        let cli = Cli::parse_from([OsStr::new("vrecode"), clip.as_os_str(), OsStr::new("--probe")]);
        let mut out = Vec::new();
        run_convert(&cli, &mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["exists"], true);
        assert_eq!(json["simple_name"], "gone");
        assert_eq!(json["extension"], "avi");
    }
}
