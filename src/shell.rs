//! Interactive front end: read a URL, run extract → transcript → summary, render the result.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::output;
use crate::summarize::{SummaryError, Summarizer};
use crate::youtube::{TranscriptError, TranscriptFetcher, retrieve_transcript};
use crate::{VideoId, extract_video_id};

pub const MISSING_URL_WARNING: &str = "Please enter a YouTube link.";
pub const INVALID_URL_WARNING: &str = "Could not extract video ID. Please check the URL.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    AwaitingInput,
    Processing,
    Displaying,
}

/// What happened to one submission
#[derive(Debug)]
pub enum Outcome {
    MissingUrl,
    InvalidUrl,
    TranscriptFailed(TranscriptError),
    SummaryFailed(SummaryError),
    Notes { video_id: VideoId, summary: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Notes { .. })
    }
}

pub struct Shell<F, S, W> {
    fetcher: F,
    summarizer: S,
    out: W,
    show_progress: bool,
    state: State,
}

impl<F, S, W> Shell<F, S, W>
where
    F: TranscriptFetcher,
    S: Summarizer,
    W: Write,
{
    pub fn new(fetcher: F, summarizer: S, out: W) -> Self {
        Self {
            fetcher,
            summarizer,
            out,
            show_progress: true,
            state: State::Idle,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    #[cfg(test)]
    fn state(&self) -> State {
        self.state
    }

    #[cfg(test)]
    fn writer(&self) -> &W {
        &self.out
    }

    fn transition(&mut self, next: State) {
        debug!("Shell state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run one submission to completion and render its outcome
    pub async fn submit(&mut self, input: &str) -> io::Result<Outcome> {
        self.transition(State::AwaitingInput);
        let outcome = self.process(input.trim()).await?;
        self.transition(State::Displaying);
        self.display(&outcome)?;
        self.out.flush()?;
        self.transition(State::Idle);
        Ok(outcome)
    }

    async fn process(&mut self, url: &str) -> io::Result<Outcome> {
        if url.is_empty() {
            return Ok(Outcome::MissingUrl);
        }

        let Some(video_id) = extract_video_id(url) else {
            warn!("Could not extract video ID from: {url}");
            return Ok(Outcome::InvalidUrl);
        };
        info!("Processing video {video_id}");

        // The thumbnail goes out before any network call
        writeln!(self.out, "{}", output::render_thumbnail(&video_id))?;
        self.out.flush()?;
        self.transition(State::Processing);

        let spinner = create_spinner(output::BUSY_MESSAGE, self.show_progress);
        let outcome = match retrieve_transcript(&self.fetcher, &video_id).await {
            Err(e) => {
                warn!("Transcript failed for {video_id}: {e}");
                Outcome::TranscriptFailed(e)
            }
            Ok(text) => match self.summarizer.summarize(&text).await {
                Ok(summary) => Outcome::Notes { video_id, summary },
                Err(e) => {
                    warn!("Summary failed for {video_id}: {e}");
                    Outcome::SummaryFailed(e)
                }
            },
        };
        spinner.finish_and_clear();
        Ok(outcome)
    }

    fn display(&mut self, outcome: &Outcome) -> io::Result<()> {
        let rendered = match outcome {
            Outcome::MissingUrl => output::render_warning(MISSING_URL_WARNING),
            Outcome::InvalidUrl => output::render_warning(INVALID_URL_WARNING),
            Outcome::TranscriptFailed(e) => output::render_error(&e.to_string()),
            Outcome::SummaryFailed(e) => output::render_error(&e.to_string()),
            Outcome::Notes { summary, .. } => output::render_notes(summary),
        };
        writeln!(self.out, "{rendered}")
    }

    /// Treat each input line as a submission until end of input.
    ///
    /// Lines are decoded lossily so a line that is not UTF-8 fails on its own
    /// as an unparseable URL. Returns the number of submissions that produced notes.
    pub async fn run<R: BufRead>(&mut self, mut input: R, prompt: bool) -> io::Result<usize> {
        let mut succeeded = 0;
        let mut buf = Vec::new();
        loop {
            if prompt {
                write!(self.out, "{}", output::PROMPT)?;
                self.out.flush()?;
            }
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if self.submit(&line).await?.is_success() {
                succeeded += 1;
            }
            if prompt {
                writeln!(self.out)?;
            }
        }
        Ok(succeeded)
    }
}

fn create_spinner(msg: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
