//! Configuration utility functions
//!
//! Helpers for reading configuration values from the environment.

/// Reads an environment variable, treating unset and blank values alike.
pub fn get_env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Interprets a boolean setting ("true"/"1"/"yes"/"on" and their negatives).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
