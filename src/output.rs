use crate::VideoId;

pub const NOTES_HEADING: &str = "## 📌 Detailed Notes:";
pub const PROMPT: &str = "🔗 Enter YouTube Video URL: ";
pub const BUSY_MESSAGE: &str = "Fetching transcript and generating summary...";

pub fn render_thumbnail(video_id: &VideoId) -> String {
    format!("🖼  Thumbnail: {}", crate::thumbnail_url(video_id))
}

/// Render the summary under the notes heading, verbatim
pub fn render_notes(summary: &str) -> String {
    format!("{NOTES_HEADING}\n\n{}", summary.trim_end())
}

pub fn render_warning(message: &str) -> String {
    format!("⚠️  {message}")
}

pub fn render_error(message: &str) -> String {
    format!("❌ {message}")
}
