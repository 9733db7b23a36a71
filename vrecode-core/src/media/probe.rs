// ============================================================================
// vrecode-core/src/media/probe.rs
// ============================================================================
//
// FORMAT PROBE: Builds a VideoDescriptor for one path
//
// Probing is a best-effort classification step. Paths that are not regular
// files are never handed to the prober, and prober failures are logged and
// absorbed: the descriptor keeps its codec fields at the `None` sentinel and
// is therefore judged "not a video" downstream.

use crate::external::{MediaProber, ProbeReport};
use crate::media::codec::CodecId;

use log::{debug, warn};
use serde::Serialize;

use std::path::{Path, PathBuf};

/// Immutable identity and probed metadata of one input file.
///
/// Created once per request through [`VideoDescriptor::probe`]; there are no
/// setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoDescriptor {
    exists: bool,
    is_regular_file: bool,
    absolute_path: String,
    parent_dir: String,
    file_name: String,
    simple_name: String,
    extension: String,
    video_codec: CodecId,
    audio_codec: CodecId,
    container_format: Option<String>,
}

impl VideoDescriptor {
    /// Probes `path` and returns its descriptor. Never fails.
    ///
    /// The prober is invoked at most once, and only when `path` is an
    /// existing regular file.
    pub fn probe<P: MediaProber + ?Sized>(path: &Path, prober: &P) -> Self {
        let mut descriptor = Self::identify(path);
        if !descriptor.is_regular_file {
            debug!(
                "Skipping probe for {}: not a regular file (exists: {})",
                descriptor.absolute_path, descriptor.exists
            );
            return descriptor;
        }

        match prober.probe(Path::new(&descriptor.absolute_path)) {
            Ok(report) => descriptor.apply(report),
            Err(e) => {
                warn!("{} -> error: {}", descriptor.absolute_path, e);
            }
        }
        descriptor
    }

    /// Filesystem identity only; codec fields stay at their sentinels.
    fn identify(path: &Path) -> Self {
        let absolute = absolutize(path);
        let file_name = absolute
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent_dir = absolute
            .parent()
            .map(|parent| parent.to_string_lossy().into_owned())
            .unwrap_or_default();
        let is_regular_file = absolute.is_file();
        // Only regular files have an extension; anything else keeps its whole name.
        let (simple_name, extension) = if is_regular_file {
            split_file_name(&file_name)
        } else {
            (file_name.clone(), String::new())
        };

        Self {
            exists: absolute.exists(),
            is_regular_file,
            absolute_path: absolute.to_string_lossy().into_owned(),
            parent_dir,
            file_name,
            simple_name,
            extension,
            video_codec: CodecId::None,
            audio_codec: CodecId::None,
            container_format: None,
        }
    }

    fn apply(&mut self, report: ProbeReport) {
        debug!(
            "Probed {}: video={}, audio={}, format={}",
            self.absolute_path, report.video_codec, report.audio_codec, report.container_format
        );
        self.video_codec = report.video_codec;
        self.audio_codec = report.audio_codec;
        self.container_format = Some(report.container_format);
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn is_regular_file(&self) -> bool {
        self.is_regular_file
    }

    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }

    pub fn parent_dir(&self) -> &str {
        &self.parent_dir
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name without its final extension.
    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    /// Final extension without the dot; empty when the name has none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn video_codec(&self) -> &CodecId {
        &self.video_codec
    }

    pub fn audio_codec(&self) -> &CodecId {
        &self.audio_codec
    }

    /// Raw demuxer format identifier, unset when probing did not happen or failed.
    pub fn container_format(&self) -> Option<&str> {
        self.container_format.as_deref()
    }

    /// Location of the source bytes, rebuilt from the parent directory and name.
    pub fn source_path(&self) -> PathBuf {
        Path::new(&self.parent_dir).join(&self.file_name)
    }
}

/// Splits a file name into `(simple_name, extension)` at the last dot.
///
/// The dot only counts when it is neither the first nor the last character,
/// so dotfiles and trailing-dot names have no extension.
#[must_use]
pub fn split_file_name(file_name: &str) -> (String, String) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx < file_name.len() - 1 => (
            file_name[..idx].to_string(),
            file_name[idx + 1..].to_string(),
        ),
        _ => (file_name.to_string(), String::new()),
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::mocks::MockProber;
    use std::fs;
    use tempfile::tempdir;

    fn rejoin(simple: &str, ext: &str) -> String {
        if ext.is_empty() {
            simple.to_string()
        } else {
            format!("{simple}.{ext}")
        }
    }

    #[test]
    fn split_uses_last_inner_dot() {
        assert_eq!(
            split_file_name("clip.mkv"),
            ("clip".to_string(), "mkv".to_string())
        );
        assert_eq!(
            split_file_name("my.holiday.clip.MP4"),
            ("my.holiday.clip".to_string(), "MP4".to_string())
        );
    }

    #[test]
    fn split_ignores_leading_and_trailing_dots() {
        assert_eq!(split_file_name(".hidden"), (".hidden".to_string(), String::new()));
        assert_eq!(split_file_name("clip."), ("clip.".to_string(), String::new()));
        assert_eq!(split_file_name("noext"), ("noext".to_string(), String::new()));
        assert_eq!(split_file_name(""), (String::new(), String::new()));
    }

    #[test]
    fn split_always_reconstructs_the_name() {
        for name in ["a.b", "a.b.c", ".a", "a.", "..", "...x", "x..", "plain", "ü.mkv"] {
            let (simple, ext) = split_file_name(name);
            assert_eq!(rejoin(&simple, &ext), name, "name: {name:?}");
        }
    }

    #[test]
    fn missing_path_is_never_probed() {
        let dir = tempdir().unwrap();
        let prober = MockProber::new();

        let descriptor = VideoDescriptor::probe(&dir.path().join("absent.mkv"), &prober);

        assert!(!descriptor.exists());
        assert!(!descriptor.is_regular_file());
        assert!(descriptor.video_codec().is_none());
        assert!(descriptor.container_format().is_none());
        assert_eq!(prober.probe_count(), 0);
    }

    #[test]
    fn directory_is_never_probed() {
        let dir = tempdir().unwrap();
        let prober = MockProber::new();

        let descriptor = VideoDescriptor::probe(dir.path(), &prober);

        assert!(descriptor.exists());
        assert!(!descriptor.is_regular_file());
        assert!(descriptor.audio_codec().is_none());
        assert_eq!(prober.probe_count(), 0);
    }

    #[test]
    fn directory_with_a_video_name_has_no_extension() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("folder.mp4");
        fs::create_dir(&folder).unwrap();

        let descriptor = VideoDescriptor::probe(&folder, &MockProber::new());

        assert_eq!(descriptor.file_name(), "folder.mp4");
        assert_eq!(descriptor.simple_name(), "folder.mp4");
        assert_eq!(descriptor.extension(), "");
        assert!(!descriptor.is_mp4_extension());
    }

    #[test]
    fn regular_file_takes_probe_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.mkv");
        fs::write(&path, b"bytes").unwrap();
        let prober = MockProber::new();
        prober.expect_report(
            &path,
            ProbeReport {
                video_codec: CodecId::H264,
                audio_codec: CodecId::Aac,
                container_format: "matroska,webm".to_string(),
            },
        );

        let descriptor = VideoDescriptor::probe(&path, &prober);

        assert!(descriptor.is_regular_file());
        assert_eq!(descriptor.simple_name(), "clip");
        assert_eq!(descriptor.extension(), "mkv");
        assert_eq!(descriptor.video_codec(), &CodecId::H264);
        assert_eq!(descriptor.audio_codec(), &CodecId::Aac);
        assert_eq!(descriptor.container_format(), Some("matroska,webm"));
        assert_eq!(descriptor.source_path(), path);
        assert_eq!(prober.probe_count(), 1);
    }

    #[test]
    fn probe_failure_degrades_to_not_a_video() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.mp4");
        fs::write(&path, b"").unwrap();
        let prober = MockProber::new(); // no expectation: probe fails

        let descriptor = VideoDescriptor::probe(&path, &prober);

        assert!(descriptor.is_regular_file());
        assert!(descriptor.video_codec().is_none());
        assert!(descriptor.audio_codec().is_none());
        assert!(descriptor.container_format().is_none());
        assert_eq!(prober.probe_count(), 1);
    }

    #[test]
    fn serializes_with_lowercase_codecs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.avi");
        fs::write(&path, b"bytes").unwrap();
        let prober = MockProber::new();
        prober.expect_report(
            &path,
            ProbeReport {
                video_codec: CodecId::Hevc,
                audio_codec: CodecId::None,
                container_format: "avi".to_string(),
            },
        );

        let json = serde_json::to_value(VideoDescriptor::probe(&path, &prober)).unwrap();

        assert_eq!(json["video_codec"], "hevc");
        assert_eq!(json["audio_codec"], "none");
        assert_eq!(json["container_format"], "avi");
        assert_eq!(json["is_regular_file"], true);
    }
}
