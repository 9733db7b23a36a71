//! Output path policy.
//!
//! Every converted file is written as `<output_dir>/<simple_name>_recode.mp4`.
//! The directory is validated and created here; the returned path is absolute
//! and always uses `/` as its separator.

use crate::error::{CoreError, CoreResult};
use crate::media::VideoDescriptor;
use crate::utils::to_forward_slashes;

use std::fs;
use std::path::Path;

/// Suffix appended to the source's simple name.
pub const OUTPUT_SUFFIX: &str = "_recode";

/// Extension of every produced file.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Computes the destination path without touching the filesystem.
///
/// Relative directories are resolved against the current working directory.
pub fn compute_output_path(output_dir: &Path, simple_name: &str) -> CoreResult<String> {
    let dir = std::path::absolute(output_dir).map_err(|e| {
        CoreError::PathError(format!(
            "cannot resolve output directory '{}': {}",
            output_dir.display(),
            e
        ))
    })?;
    let file_name = format!("{simple_name}{OUTPUT_SUFFIX}.{OUTPUT_EXTENSION}");
    Ok(to_forward_slashes(&dir.join(file_name).to_string_lossy()))
}

/// True when `path` is named like a file this crate produced (`*_recode.mp4`).
pub fn is_recode_output(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|name| name.ends_with(&format!("{OUTPUT_SUFFIX}.{OUTPUT_EXTENSION}")))
}

/// Validates `output_dir`, creates it when missing, and returns the output path
/// for `descriptor`.
///
/// Fails with [`CoreError::OutputConflict`] when `output_dir` is an existing
/// regular file; nothing is created in that case.
pub fn resolve_output_path(output_dir: &Path, descriptor: &VideoDescriptor) -> CoreResult<String> {
    if output_dir.is_file() {
        return Err(CoreError::OutputConflict(
            to_forward_slashes(&output_dir.to_string_lossy()),
        ));
    }
    if !output_dir.exists() {
        log::debug!("Creating output directory: {}", output_dir.display());
        fs::create_dir_all(output_dir)?;
    }
    compute_output_path(output_dir, descriptor.simple_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockProber;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn output_path_is_deterministic_and_uses_forward_slashes() {
        let dir = tempdir().unwrap();
        let first = compute_output_path(dir.path(), "holiday").unwrap();
        let second = compute_output_path(dir.path(), "holiday").unwrap();

        assert_eq!(first, second);
        assert!(first.ends_with("/holiday_recode.mp4"));
        assert!(!first.contains('\\'));
        assert!(Path::new(&first).is_absolute());
    }

    #[test]
    fn relative_directories_are_made_absolute() {
        let path = compute_output_path(Path::new("converted"), "clip").unwrap();
        let expected = to_forward_slashes(
            &std::env::current_dir()
                .unwrap()
                .join("converted")
                .join("clip_recode.mp4")
                .to_string_lossy(),
        );
        assert_eq!(path, expected);
    }

    #[test]
    fn missing_directory_is_created() {
        let root = tempdir().unwrap();
        let input = root.path().join("movie.mkv");
        File::create(&input).unwrap();
        let descriptor = VideoDescriptor::probe(&input, &MockProber::new());

        let out_dir = root.path().join("nested").join("out");
        let path = resolve_output_path(&out_dir, &descriptor).unwrap();

        assert!(out_dir.is_dir());
        assert!(path.ends_with("/nested/out/movie_recode.mp4"));
    }

    #[test]
    fn regular_file_as_directory_is_a_conflict() {
        let root = tempdir().unwrap();
        let input = root.path().join("movie.mkv");
        File::create(&input).unwrap();
        let blocker = root.path().join("out");
        File::create(&blocker).unwrap();
        let descriptor = VideoDescriptor::probe(&input, &MockProber::new());

        let err = resolve_output_path(&blocker, &descriptor).unwrap_err();

        assert!(matches!(err, CoreError::OutputConflict(_)));
        assert!(blocker.is_file());
        assert!(!root.path().join("out").join("movie_recode.mp4").exists());
    }

    #[test]
    fn recode_outputs_are_recognised_by_name() {
        assert!(is_recode_output(Path::new("/out/movie_recode.mp4")));
        assert!(is_recode_output(Path::new("CLIP_RECODE.MP4")));
        assert!(!is_recode_output(Path::new("/out/movie.mp4")));
        assert!(!is_recode_output(Path::new("/out/movie_recode.mkv")));
        assert!(!is_recode_output(Path::new("/")));
    }
}
