// ============================================================================
// vrecode-core/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Conversion Progress Callbacks and Events
//
// The orchestrator reports what it is doing through an injected callback so
// the library never draws anything itself. The CLI renders these events as a
// spinner; tests record them.
//
// KEY COMPONENTS:
// - ProgressEvent: Enum of conversion progress events
// - ProgressCallback: Trait for receiving progress events
// - NullProgressCallback: No-op implementation for when callbacks aren't needed
// - LogProgressCallback: Forwards events to the `log` facade

// ---- Standard library imports ----
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// PROGRESS EVENTS
// ============================================================================

/// Events reported while converting one file.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The source is already browser-compatible and is being copied.
    FastCopy {
        input_path: PathBuf,
        output_path: PathBuf,
    },

    /// A hardware transcode session is starting.
    TranscodeStart {
        input_path: PathBuf,
        output_path: PathBuf,
        /// Backend name, e.g. "VAAPI"
        backend: String,
        width: u32,
        height: u32,
    },

    /// One more frame has been accepted by the encode sink.
    FrameEncoded {
        /// Frames encoded so far
        count: u64,
    },

    /// The output file is complete.
    Complete {
        output_path: PathBuf,
        /// Frames encoded; zero for a fast copy
        frames: u64,
        elapsed: Duration,
    },
}

// ============================================================================
// PROGRESS CALLBACK
// ============================================================================

/// Trait for receiving progress events during a conversion.
pub trait ProgressCallback: Send + Sync {
    /// Called when a progress event occurs.
    fn on_progress(&self, event: ProgressEvent);
}

/// No-op implementation of ProgressCallback that does nothing.
#[derive(Debug, Clone, Default)]
pub struct NullProgressCallback;

impl ProgressCallback for NullProgressCallback {
    fn on_progress(&self, _event: ProgressEvent) {}
}

/// Reports milestones through the `log` facade.
///
/// Per-frame events are logged at trace level every `frame_interval` frames.
#[derive(Debug, Clone)]
pub struct LogProgressCallback {
    frame_interval: u64,
}

impl LogProgressCallback {
    pub fn new(frame_interval: u64) -> Self {
        Self {
            frame_interval: frame_interval.max(1),
        }
    }
}

impl Default for LogProgressCallback {
    fn default() -> Self {
        Self::new(500)
    }
}

impl ProgressCallback for LogProgressCallback {
    fn on_progress(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FastCopy {
                input_path,
                output_path,
            } => log::info!(
                "Copying browser-compatible {} -> {}",
                input_path.display(),
                output_path.display()
            ),
            ProgressEvent::TranscodeStart {
                input_path,
                output_path,
                backend,
                width,
                height,
            } => log::info!(
                "Transcoding {} -> {} ({}x{}, {})",
                input_path.display(),
                output_path.display(),
                width,
                height,
                backend
            ),
            ProgressEvent::FrameEncoded { count } => {
                if count % self.frame_interval == 0 {
                    log::trace!("Encoded {} frames", count);
                }
            }
            ProgressEvent::Complete {
                output_path,
                frames,
                elapsed,
            } => log::info!(
                "Finished {} ({} frames in {})",
                output_path.display(),
                frames,
                crate::utils::format_duration(elapsed)
            ),
        }
    }
}
