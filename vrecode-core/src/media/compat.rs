//! Browser compatibility rules over a [`VideoDescriptor`].
//!
//! Extension and codec/container identity are judged separately: a file with
//! a misleading extension but browser-ready streams can be fast-copied to a
//! `.mp4` name, while the strict answer requires both.

use crate::media::codec::CodecId;
use crate::media::probe::VideoDescriptor;

/// Extension a directly servable file must carry.
pub const BROWSER_EXTENSION: &str = "mp4";

/// Demuxer alias list reported for the MOV/MP4/M4A/3GP/3G2/MJ2 family.
pub const BROWSER_CONTAINER_FORMAT: &str = "mov,mp4,m4a,3gp,3g2,mj2";

impl VideoDescriptor {
    /// True when the file carries a video stream.
    pub fn is_video(&self) -> bool {
        !self.video_codec().is_none()
    }

    /// True when the file carries an audio stream.
    pub fn has_audio(&self) -> bool {
        !self.audio_codec().is_none()
    }

    /// True when the extension is `mp4`, ignoring case.
    pub fn is_mp4_extension(&self) -> bool {
        self.extension().eq_ignore_ascii_case(BROWSER_EXTENSION)
    }

    /// True when the streams and container are browser-ready, whatever the extension.
    pub fn can_play_in_browser_ignoring_extension(&self) -> bool {
        if !self.is_video() {
            return false;
        }
        if self.has_audio() && *self.audio_codec() != CodecId::Aac {
            return false;
        }
        if *self.video_codec() != CodecId::H264 {
            return false;
        }
        self.container_format() == Some(BROWSER_CONTAINER_FORMAT)
    }

    /// True when the file can be served to a browser exactly as it is.
    pub fn can_play_in_browser(&self) -> bool {
        self.is_mp4_extension() && self.can_play_in_browser_ignoring_extension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::ProbeReport;
    use crate::external::mocks::MockProber;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn probed(
        dir: &TempDir,
        name: &str,
        video: CodecId,
        audio: CodecId,
        container: &str,
    ) -> VideoDescriptor {
        let path = dir.path().join(name);
        fs::write(&path, b"x").unwrap();
        let prober = MockProber::new();
        prober.expect_report(
            &path,
            ProbeReport {
                video_codec: video,
                audio_codec: audio,
                container_format: container.to_string(),
            },
        );
        VideoDescriptor::probe(&path, &prober)
    }

    #[test]
    fn h264_aac_mp4_plays_directly() {
        let dir = tempdir().unwrap();
        let d = probed(&dir, "clip.MP4", CodecId::H264, CodecId::Aac, BROWSER_CONTAINER_FORMAT);
        assert!(d.is_video());
        assert!(d.has_audio());
        assert!(d.is_mp4_extension());
        assert!(d.can_play_in_browser());
    }

    #[test]
    fn silent_h264_is_accepted() {
        let dir = tempdir().unwrap();
        let d = probed(&dir, "clip.mp4", CodecId::H264, CodecId::None, BROWSER_CONTAINER_FORMAT);
        assert!(!d.has_audio());
        assert!(d.can_play_in_browser());
    }

    #[test]
    fn wrong_extension_only_fails_strict_check() {
        let dir = tempdir().unwrap();
        let d = probed(&dir, "clip.mkv", CodecId::H264, CodecId::Aac, BROWSER_CONTAINER_FORMAT);
        assert!(d.can_play_in_browser_ignoring_extension());
        assert!(!d.can_play_in_browser());
    }

    #[test]
    fn each_rule_can_reject() {
        let dir = tempdir().unwrap();
        let cases = [
            ("a.mp4", CodecId::Hevc, CodecId::Aac, BROWSER_CONTAINER_FORMAT),
            ("b.mp4", CodecId::H264, CodecId::Other("mp3".into()), BROWSER_CONTAINER_FORMAT),
            ("c.mp4", CodecId::H264, CodecId::Aac, "matroska,webm"),
            ("d.mp4", CodecId::H264, CodecId::Aac, "mov,mp4"),
            ("e.mp4", CodecId::None, CodecId::Aac, BROWSER_CONTAINER_FORMAT),
        ];
        for (name, video, audio, container) in cases {
            let d = probed(&dir, name, video, audio, container);
            assert!(!d.can_play_in_browser_ignoring_extension(), "{name}");
            assert!(!d.can_play_in_browser(), "{name}");
        }
    }

    #[test]
    fn strict_check_matches_its_definition_over_all_combinations() {
        let dir = tempdir().unwrap();
        let videos = [CodecId::None, CodecId::H264, CodecId::Hevc, CodecId::Other("vp9".into())];
        let audios = [CodecId::None, CodecId::Aac, CodecId::Other("opus".into())];
        let containers = [BROWSER_CONTAINER_FORMAT, "matroska,webm", "avi", ""];
        let extensions = ["mp4", "MP4", "mkv", ""];

        let mut n = 0;
        for video in &videos {
            for audio in &audios {
                for container in containers {
                    for ext in extensions {
                        n += 1;
                        let name = if ext.is_empty() {
                            format!("f{n}")
                        } else {
                            format!("f{n}.{ext}")
                        };
                        let d = probed(&dir, &name, video.clone(), audio.clone(), container);
                        let expected = ext.eq_ignore_ascii_case("mp4")
                            && *video == CodecId::H264
                            && (*audio == CodecId::None || *audio == CodecId::Aac)
                            && container == BROWSER_CONTAINER_FORMAT;
                        assert_eq!(d.can_play_in_browser(), expected, "{name} {video} {audio} {container}");
                    }
                }
            }
        }
    }
}
