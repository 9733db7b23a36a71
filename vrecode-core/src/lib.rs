//! Core library for turning arbitrary video files into browser-playable mp4s.
//!
//! A file is probed once into a [`VideoDescriptor`]. When its codecs and
//! container already suit a browser the bytes are copied; otherwise the video
//! is re-encoded with the hardware backend of the host platform (VAAPI on
//! Linux, NVENC on Windows) by streaming frames from a decode source into an
//! encode sink.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use vrecode_core::{
//!     CoreConfigBuilder, CrateFfprobeExecutor, LogProgressCallback, SidecarToolkit,
//!     VideoDescriptor, convert_with_config,
//! };
//! use std::path::Path;
//!
//! let config = CoreConfigBuilder::new().apply_env()?.build();
//! config.validate()?;
//!
//! let descriptor = VideoDescriptor::probe(Path::new("/videos/holiday.avi"), &CrateFfprobeExecutor::new());
//! if descriptor.can_play_in_browser() {
//!     println!("already playable");
//! } else if descriptor.is_video() {
//!     let toolkit = SidecarToolkit::checked()?;
//!     let output_dir = config.output_dir_for(&descriptor);
//!     let outcome = convert_with_config(
//!         &descriptor,
//!         &output_dir,
//!         &toolkit,
//!         &LogProgressCallback::default(),
//!         &config,
//!     )?;
//!     println!("{}", outcome.output_path);
//! }
//! # Ok::<(), vrecode_core::CoreError>(())
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod hardware;
pub mod media;
pub mod output_path;
pub mod processing;
pub mod progress;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use discovery::find_candidate_files;
pub use error::{CoreError, CoreResult};
pub use external::{
    CrateFfprobeExecutor, DecodeOptions, DecodeSource, EncodeSettings, EncodeSink, Frame,
    MediaProber, MediaToolkit, ProbeReport, SidecarToolkit, StreamParameters, check_dependency,
};
pub use hardware::{BackendSelection, HardwareBackend};
pub use media::{CodecId, VideoDescriptor};
pub use output_path::{compute_output_path, is_recode_output, resolve_output_path};
pub use processing::{
    SessionGuard, TranscodeMode, TranscodeOutcome, TranscodeState, convert, convert_with_config,
};
pub use progress::{LogProgressCallback, NullProgressCallback, ProgressCallback, ProgressEvent};
pub use utils::{format_bytes, format_duration};
