//! File discovery module for batch conversion.
//!
//! Lists candidate files in the top level of a directory. Whether a candidate
//! is actually a video is decided later by probing it, so no extension filter
//! is applied here.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Finds the regular files in the top level of `input_dir`, sorted by path.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - The candidate files
/// * `Err(CoreError::Io)` - If the directory cannot be read
/// * `Err(CoreError::NoFilesFound)` - If the directory has no regular files
///
/// # Examples
///
/// ```rust,no_run
/// use vrecode_core::find_candidate_files;
/// use std::path::Path;
///
/// match find_candidate_files(Path::new("/path/to/videos")) {
///     Ok(files) => println!("Found {} candidates", files.len()),
///     Err(e) => println!("Error finding files: {}", e),
/// }
/// ```
pub fn find_candidate_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.is_file().then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound(input_dir.display().to_string()));
    }
    files.sort();
    log::debug!("Found {} candidate files in {}", files.len(), input_dir.display());
    Ok(files)
}
