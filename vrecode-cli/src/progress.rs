// ============================================================================
// vrecode-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Terminal spinner for conversions
//
// SpinnerProgress renders vrecode-core progress events as an indicatif
// spinner on stderr. indicatif hides the spinner when stderr is not a
// terminal, so piped runs only see log lines.

// ---- External crate imports ----
use indicatif::{ProgressBar, ProgressStyle};
use vrecode_core::{ProgressCallback, ProgressEvent, format_duration};

// ---- Standard library imports ----
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg} [{elapsed_precise}] {pos} frames";

/// Spinner implementation of [`ProgressCallback`].
pub struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template(SPINNER_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { bar }
    }

    /// A spinner that never draws, for tests and non-interactive use.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressCallback for SpinnerProgress {
    fn on_progress(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::FastCopy { input_path, .. } => {
                self.bar.set_message(format!("Copying {}", input_path.display()));
                self.bar.tick();
            }
            ProgressEvent::TranscodeStart {
                input_path,
                backend,
                width,
                height,
                ..
            } => {
                self.bar.reset();
                self.bar.set_message(format!(
                    "{} {}x{} via {}",
                    input_path.display(),
                    width,
                    height,
                    backend
                ));
                self.bar.enable_steady_tick(Duration::from_millis(120));
            }
            ProgressEvent::FrameEncoded { count } => self.bar.set_position(count),
            ProgressEvent::Complete {
                output_path,
                frames,
                elapsed,
            } => {
                self.bar.finish_and_clear();
                log::info!(
                    "Wrote {} ({} frames, {})",
                    output_path.display(),
                    frames,
                    format_duration(elapsed)
                );
            }
        }
    }
}
