pub mod config;
pub mod output;
pub mod shell;
pub mod summarize;
pub mod youtube;

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("video id pattern is valid"));

/// An 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single captioned segment
#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    pub text: String,
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
}

/// Transcript for a video as returned by a transcript service
#[derive(Debug, Clone)]
pub struct Transcript {
    pub video_id: VideoId,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Segment texts in order, joined with single spaces
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Extract the video ID from a YouTube URL.
///
/// Takes the first `v=` or `/` that is immediately followed by 11 ID characters,
/// so trailing query parameters are ignored. Returns `None` when no such run exists.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    VIDEO_ID_RE
        .captures(input)
        .map(|caps| VideoId(caps[1].to_string()))
}

/// Standard thumbnail location for a video
pub fn thumbnail_url(video_id: &VideoId) -> String {
    format!("https://img.youtube.com/vi/{video_id}/0.jpg")
}

#[cfg(test)]
pub(crate) fn video_id(s: &str) -> VideoId {
    VideoId(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(input: &str) -> Option<String> {
        extract_video_id(input).map(|id| id.to_string())
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extracted("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extracted("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extracted("https://www.youtube.com/watch?v=dQw4w9WgXcQXYZ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_v_param_not_first() {
        assert_eq!(
            extracted("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(extracted("https://youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
        assert_eq!(
            extracted("https://youtu.be/dQw4w9WgXcQ?si=abcdef"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_embed_and_shorts_urls() {
        assert_eq!(
            extracted("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extracted("https://www.youtube.com/shorts/a-b_c1D2e3F"),
            Some("a-b_c1D2e3F".to_string())
        );
    }

    #[test]
    fn test_bare_id_has_no_marker() {
        assert_eq!(extracted("dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(extracted("not a url at all"), None);
        assert_eq!(extracted("https://www.youtube.com/watch?v=short"), None);
        assert_eq!(extracted("https://example.com/"), None);
        assert_eq!(extracted("v=ab$cdefghijk"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extracted(""), None);
    }

    #[test]
    fn test_thumbnail_url() {
        assert_eq!(
            thumbnail_url(&video_id("dQw4w9WgXcQ")),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/0.jpg"
        );
    }

    #[test]
    fn test_segments_from_service_json() {
        let segments: Vec<Segment> = serde_json::from_str(r#"[{"text":"Hello"},{"text":"world"}]"#).unwrap();
        let transcript = Transcript {
            video_id: video_id("dQw4w9WgXcQ"),
            segments,
        };
        assert_eq!(transcript.text(), "Hello world");
    }
}
