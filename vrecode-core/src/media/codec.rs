//! Codec identifiers as reported by the media prober.

use serde::Serialize;
use std::fmt;

/// Identity of the codec carried by one stream.
///
/// `None` is the sentinel for "no such stream" (or "could not be probed").
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecId {
    #[default]
    None,
    H264,
    Hevc,
    Aac,
    /// Any codec the compatibility rules do not single out, by ffprobe name.
    Other(String),
}

impl CodecId {
    /// Maps an ffprobe `codec_name` to a codec identifier.
    ///
    /// Empty names map to the `None` sentinel.
    #[must_use]
    pub fn from_ffprobe_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" => CodecId::None,
            "h264" | "avc" | "avc1" => CodecId::H264,
            "hevc" | "h265" => CodecId::Hevc,
            "aac" => CodecId::Aac,
            other => CodecId::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, CodecId::None)
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecId::None => write!(f, "none"),
            CodecId::H264 => write!(f, "h264"),
            CodecId::Hevc => write!(f, "hevc"),
            CodecId::Aac => write!(f, "aac"),
            CodecId::Other(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_ffprobe_names() {
        assert_eq!(CodecId::from_ffprobe_name("h264"), CodecId::H264);
        assert_eq!(CodecId::from_ffprobe_name("HEVC"), CodecId::Hevc);
        assert_eq!(CodecId::from_ffprobe_name("aac"), CodecId::Aac);
        assert_eq!(
            CodecId::from_ffprobe_name("mpeg4"),
            CodecId::Other("mpeg4".to_string())
        );
        assert!(CodecId::from_ffprobe_name("  ").is_none());
    }

    #[test]
    fn displays_ffprobe_style_names() {
        assert_eq!(CodecId::H264.to_string(), "h264");
        assert_eq!(CodecId::Other("vp9".to_string()).to_string(), "vp9");
        assert_eq!(CodecId::None.to_string(), "none");
    }
}
