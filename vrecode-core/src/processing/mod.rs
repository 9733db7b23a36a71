//! Conversion orchestration.
//!
//! `transcode` drives a single conversion; `session` owns the decode source
//! and encode sink while frames are streamed.

/// Scoped release of decode sources and encode sinks
pub mod session;

/// Fast-copy or hardware re-encode of one probed video
pub mod transcode;

pub use session::SessionGuard;
pub use transcode::{
    TranscodeMode, TranscodeOutcome, TranscodeState, convert, convert_with_config, encode_settings,
};
