// vrecode-cli/src/error.rs
//
// The CLI reports every failure as a vrecode-core CoreError. Errors raised
// outside the core (JSON encoding, directory listing, env parsing) are
// wrapped with a description of the step that failed.

use vrecode_core::{CoreError, CoreResult};

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = CoreResult<T>;

/// Prefixes an error with the CLI step that produced it.
pub trait CliErrorContext<T> {
    fn cli_context<C: fmt::Display>(self, context: C) -> CliResult<T>;

    /// Like [`CliErrorContext::cli_context`], building the message only on failure.
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E: fmt::Display> CliErrorContext<T> for Result<T, E> {
    fn cli_context<C: fmt::Display>(self, context: C) -> CliResult<T> {
        self.map_err(|e| CoreError::OperationFailed(format!("{context}: {e}")))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| CoreError::OperationFailed(format!("{}: {e}", f())))
    }
}

/// Creates an `OperationFailed` error with a formatted message.
#[macro_export]
macro_rules! cli_error {
    ($($arg:tt)*) => {
        ::vrecode_core::CoreError::OperationFailed(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_message() {
        let result: CoreResult<()> = Err(CoreError::Config("bad device".to_string()));
        let err = result.cli_context("Reading VRECODE_* environment").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Operation failed: Reading VRECODE_* environment: Invalid configuration: bad device"
        );
    }

    #[test]
    fn foreign_errors_are_wrapped_lazily() {
        let parsed = serde_json::from_str::<serde_json::Value>("{");
        let err = parsed.cli_with_context(|| "Decoding descriptor").unwrap_err();
        assert!(matches!(err, CoreError::OperationFailed(ref m) if m.starts_with("Decoding descriptor: ")));
    }

    #[test]
    fn cli_error_macro_formats() {
        let err = crate::cli_error!("{} of {} conversions failed", 1, 3);
        assert_eq!(err.to_string(), "Operation failed: 1 of 3 conversions failed");
    }
}
