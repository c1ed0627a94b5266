use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::config::SummarizerConfig;

/// Instruction template prepended to the transcript text
pub const DEFAULT_PROMPT: &str = "\
You are a helpful assistant that summarizes YouTube videos.
Given a transcript, your task is to summarize it clearly and concisely in bullet points.
Make sure the summary:
- Covers the key ideas, arguments, and conclusions.
- Keeps things simple, avoiding technical jargon.
- Uses bullet points only.
- Does not exceed 250 words.

Here is the transcript text:
";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Summary generation failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Summary generation failed: Gemini API returned {status}: {body}")]
    Api { status: reqwest::StatusCode, body: String },

    #[error("Summary generation failed: the prompt was blocked ({0})")]
    Blocked(String),

    #[error("Summary generation failed: the model returned no text")]
    EmptyResponse,
}

/// Something that turns transcript text into a summary
#[allow(async_fn_in_trait)]
pub trait Summarizer {
    async fn summarize(&self, transcript_text: &str) -> Result<String, SummaryError>;
}

/// Combine the instruction template with the transcript
pub fn build_prompt(template: &str, transcript_text: &str) -> String {
    format!("{template}{transcript_text}")
}

/// Summarizer backed by the Gemini `generateContent` endpoint
pub struct GeminiSummarizer {
    client: reqwest::Client,
    config: SummarizerConfig,
}

impl GeminiSummarizer {
    pub fn new(client: reqwest::Client, config: SummarizerConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl Summarizer for GeminiSummarizer {
    async fn summarize(&self, transcript_text: &str) -> Result<String, SummaryError> {
        let prompt = build_prompt(&self.config.prompt, transcript_text);
        debug!(
            "Summarizing via Gemini with model {} ({} prompt chars)",
            self.config.model,
            prompt.len()
        );

        let body = serde_json::json!({
            "contents": [
                {
                    "parts": [{"text": prompt}]
                }
            ]
        });

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("Gemini API returned {status}");
            return Err(SummaryError::Api { status, body });
        }

        let response: GenerateContentResponse = resp.json().await?;
        let text = extract_gemini_text(response)?;
        info!("Summary received: {} chars", text.len());
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

fn extract_gemini_text(response: GenerateContentResponse) -> Result<String, SummaryError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(SummaryError::Blocked(reason));
        }
        return Err(SummaryError::EmptyResponse);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(SummaryError::EmptyResponse);
    }
    Ok(text)
}
