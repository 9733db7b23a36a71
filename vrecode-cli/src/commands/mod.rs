//! Command implementations for the CLI.

/// Module containing the implementation of the default convert command.
/// Probes inputs and prints the path of each browser-playable output.
pub mod convert;
