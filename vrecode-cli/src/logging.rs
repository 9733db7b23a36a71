// ============================================================================
// vrecode-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger initialization for the CLI
//
// All diagnostics go to stderr so stdout carries nothing but output paths.
// RUST_LOG is honoured; without it the level is `info`, or `debug` with -v.

use log::LevelFilter;
use std::io::Write;

/// Default filter for the given verbosity.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initializes the global logger. Safe to call more than once; later calls are ignored.
pub fn init(verbose: bool) {
    let level = default_level(verbose);
    let env = env_logger::Env::default().default_filter_or(level.as_str());
    let result = env_logger::Builder::from_env(env)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .try_init();
    if result.is_ok() {
        log::debug!("Logger initialized with level: {}", level);
    }
}

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
