// ============================================================================
// vrecode-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the vrecode-core library
//
// A single error enum covers probing, path policy, backend selection and the
// frame pipeline. Probe failures never leave the probe module as errors (the
// descriptor degrades instead), and teardown failures are only logged.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Custom error types for vrecode-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("[{0}] is not a video file")]
    NotAVideo(String),

    #[error("[{0}] is a file and already exists")]
    OutputConflict(String),

    #[error("Unsupported platform for hardware transcoding: {0}")]
    UnsupportedPlatform(String),

    #[error("Failed to open decode source for {0}: {1}")]
    DecodeOpen(String, String),

    #[error("Failed to open encode sink for {0}: {1}")]
    EncodeOpen(String, String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Failed to execute {0}: {1}")]
    CommandStart(String, io::Error),

    #[error("Failed to wait for {0}: {1}")]
    CommandWait(String, io::Error),

    #[error("Command {0} failed with status {1}. Stderr: {2}")]
    CommandFailed(String, ExitStatus, String),

    #[error("Required external command '{0}' not found")]
    DependencyNotFound(String),

    #[error("ffprobe output parsing error: {0}")]
    FfprobeParse(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("No processable files found in {0}")]
    NoFilesFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for vrecode-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] for a tool that could not be spawned.
pub fn command_start_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(cmd.into(), err)
}

/// Builds a [`CoreError::CommandWait`] for a tool whose exit could not be collected.
pub fn command_wait_error(cmd: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(cmd.into(), err)
}

/// Builds a [`CoreError::CommandFailed`] for a tool that exited unsuccessfully.
pub fn command_failed_error(
    cmd: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed(cmd.into(), status, stderr.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_errors_name_the_offending_path() {
        let err = CoreError::NotAVideo("/in/notvideo.txt".to_string());
        assert_eq!(err.to_string(), "[/in/notvideo.txt] is not a video file");

        let err = CoreError::OutputConflict("/out".to_string());
        assert!(err.to_string().contains("/out"));
    }

    #[test]
    fn io_errors_convert_with_question_mark() {
        fn fails() -> CoreResult<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(CoreError::Io(_))));
    }
}
