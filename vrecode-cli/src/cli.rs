// vrecode-cli/src/cli.rs
//
// Defines the command-line argument structure using clap.

use clap::Parser;
use std::convert::Infallible;
use std::path::PathBuf;
use vrecode_core::HardwareBackend;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "vrecode: make videos playable in a browser",
    long_about = "Probes a video and, unless it already plays in a browser, re-encodes it \
                  to mp4 with the host's hardware encoder (VAAPI on Linux, NVENC on Windows). \
                  The path of every produced file is printed on stdout."
)]
pub struct Cli {
    /// Video file, or a directory whose top-level files are converted
    #[arg(value_name = "INPUT_PATH", value_parser = parse_input_path)]
    pub input_path: Option<PathBuf>,

    /// Directory where converted files are written (defaults to the input's directory)
    #[arg(short = 'o', long = "output-dir", value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Force a hardware backend instead of selecting one for this platform (vaapi, nvenc)
    #[arg(long, value_name = "BACKEND")]
    pub backend: Option<HardwareBackend>,

    /// VAAPI render node
    #[arg(long, value_name = "DEVICE")]
    pub vaapi_device: Option<String>,

    /// Print the probed descriptor as JSON instead of converting
    #[arg(long)]
    pub probe: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Accepts any string, including an empty one, which is reported later.
fn parse_input_path(value: &str) -> Result<PathBuf, Infallible> {
    Ok(PathBuf::from(value))
}
