use std::sync::LazyLock;

use log::{debug, info, warn};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::{Segment, Transcript, VideoId};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

static FORMATTING_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("formatting tag pattern is valid"));

/// Why a transcript could not be produced. The display text is what the user sees.
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Transcripts are disabled for this video.")]
    TranscriptsDisabled { video_id: String },

    #[error("The video is unavailable.")]
    VideoUnavailable { video_id: String },

    #[error("No transcript text was returned for this video.")]
    Empty { video_id: String },

    #[error("An error occurred: video is unplayable: {reason}")]
    Unplayable { video_id: String, reason: String },

    #[error("An error occurred: {0}")]
    Request(#[from] reqwest::Error),

    #[error("An error occurred: {0}")]
    Malformed(String),
}

/// A source of video transcripts
#[allow(async_fn_in_trait)]
pub trait TranscriptFetcher {
    async fn fetch(&self, video_id: &VideoId) -> Result<Transcript, TranscriptError>;
}

/// Fetch a transcript and join its segments into one space-separated string
pub async fn retrieve_transcript<F: TranscriptFetcher>(fetcher: &F, video_id: &VideoId) -> Result<String, TranscriptError> {
    let transcript = fetcher.fetch(video_id).await?;
    let text = transcript.text();
    if text.trim().is_empty() {
        return Err(TranscriptError::Empty {
            video_id: video_id.to_string(),
        });
    }
    info!(
        "Transcript for {video_id}: {} segments, {} chars",
        transcript.segments.len(),
        text.len()
    );
    Ok(text)
}

#[derive(Debug, Deserialize)]
struct InnerTubePlayerResponse {
    #[serde(rename = "playabilityStatus")]
    playability_status: Option<PlayabilityStatus>,
    captions: Option<CaptionsData>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionsData {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    player_captions_tracklist_renderer: Option<CaptionTracklistRenderer>,
}

#[derive(Debug, Deserialize)]
struct CaptionTracklistRenderer {
    #[serde(rename = "captionTracks")]
    caption_tracks: Option<Vec<CaptionTrack>>,
}

#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

/// Transcript fetcher backed by YouTube's InnerTube player API
pub struct InnerTubeFetcher {
    client: reqwest::Client,
    lang: String,
}

impl InnerTubeFetcher {
    pub fn new(client: reqwest::Client, lang: impl Into<String>) -> Self {
        Self {
            client,
            lang: lang.into(),
        }
    }

    async fn get_text(&self, url: &str) -> Result<String, TranscriptError> {
        let text = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }
}

impl TranscriptFetcher for InnerTubeFetcher {
    async fn fetch(&self, video_id: &VideoId) -> Result<Transcript, TranscriptError> {
        // Step 1: Fetch the watch page to get the InnerTube API key
        let watch_url = format!("https://www.youtube.com/watch?v={video_id}");
        debug!("Fetching watch page: {watch_url}");
        let page_html = self.get_text(&watch_url).await?;
        let api_key = extract_api_key(&page_html)?;
        debug!("Extracted InnerTube API key: {api_key}");

        // Step 2: Call InnerTube player endpoint
        let player_url = format!("https://www.youtube.com/youtubei/v1/player?key={api_key}&prettyPrint=false");
        let body = serde_json::json!({
            "context": {
                "client": {
                    "hl": self.lang,
                    "gl": "US",
                    "clientName": "WEB",
                    "clientVersion": "2.20241126.01.00"
                }
            },
            "videoId": video_id.as_str()
        });

        let resp: InnerTubePlayerResponse = self
            .client
            .post(&player_url)
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let track = select_track(video_id, resp, &self.lang)?;
        debug!("Using caption track: lang={}", track.language_code);

        // Step 3: Fetch the caption XML
        let caption_xml = self.get_text(&track.base_url).await?;
        let segments = parse_caption_xml(&caption_xml)?;

        Ok(Transcript {
            video_id: video_id.clone(),
            segments,
        })
    }
}

/// Classify the player response and pick the caption track to download
fn select_track(video_id: &VideoId, resp: InnerTubePlayerResponse, lang: &str) -> Result<CaptionTrack, TranscriptError> {
    if let Some(ps) = &resp.playability_status {
        check_playability(video_id, ps)?;
    }

    let tracks = resp
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .and_then(|r| r.caption_tracks)
        .unwrap_or_default();

    // Fall back to the first available track when the preferred language is missing
    let track = tracks
        .iter()
        .find(|t| t.language_code == lang)
        .or_else(|| tracks.first())
        .cloned();

    track.ok_or_else(|| {
        warn!("No caption tracks for {video_id}");
        TranscriptError::TranscriptsDisabled {
            video_id: video_id.to_string(),
        }
    })
}

fn check_playability(video_id: &VideoId, ps: &PlayabilityStatus) -> Result<(), TranscriptError> {
    let status = ps.status.as_deref().unwrap_or("OK");
    if status == "OK" {
        return Ok(());
    }

    let reason = ps.reason.clone().unwrap_or_default();
    warn!("Video {video_id} not playable: status={status} reason={reason}");

    if status == "ERROR" && reason.to_lowercase().contains("unavailable") {
        return Err(TranscriptError::VideoUnavailable {
            video_id: video_id.to_string(),
        });
    }

    Err(TranscriptError::Unplayable {
        video_id: video_id.to_string(),
        reason: if reason.is_empty() { status.to_string() } else { reason },
    })
}

fn extract_api_key(html: &str) -> Result<String, TranscriptError> {
    let patterns = [r#""INNERTUBE_API_KEY"\s*:\s*"([^"]+)""#, r#"innertubeApiKey\s*[=:]\s*"([^"]+)""#];

    for pattern in patterns {
        let re = Regex::new(pattern).map_err(|e| TranscriptError::Malformed(e.to_string()))?;
        if let Some(caps) = re.captures(html) {
            return Ok(caps[1].to_string());
        }
    }

    Err(TranscriptError::Malformed(
        "could not extract InnerTube API key from watch page".to_string(),
    ))
}

fn parse_caption_xml(xml: &str) -> Result<Vec<Segment>, TranscriptError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<(f64, f64)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = 0.0;
                let mut dur = 0.0;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value);
                    match attr.key.as_ref() {
                        b"start" => start = value.parse().unwrap_or(0.0),
                        b"dur" => dur = value.parse().unwrap_or(0.0),
                        _ => {}
                    }
                }
                current = Some((start, dur));
            }
            Ok(Event::Text(ref e)) => {
                if let Some((start, duration)) = current.take() {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let decoded = html_escape::decode_html_entities(&raw_text);
                    // Captions can carry <i>/<b>/<font> markup once entities are decoded
                    let text = FORMATTING_TAG_RE.replace_all(&decoded, "").trim().to_string();
                    if !text.is_empty() {
                        segments.push(Segment { text, start, duration });
                    }
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TranscriptError::Malformed(format!("error parsing caption XML: {e}"))),
            _ => {}
        }
    }

    Ok(segments)
}
