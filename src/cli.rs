use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytnotes",
    about = "YouTube video to bullet-point notes",
    version
)]
pub struct Cli {
    /// YouTube video URL (prompts for URLs on stdin if omitted)
    pub url: Option<String>,

    /// Gemini model for summarization
    #[arg(short, long)]
    pub model: Option<String>,

    /// Preferred caption language
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Config file (default: ~/.config/ytnotes/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Don't show the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Show resolved configuration
    #[arg(short, long)]
    pub verbose: bool,
}
