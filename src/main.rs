use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use eyre::{Result, WrapErr};
use log::info;

mod cli;

use cli::Cli;
use ytnotes::config::{Config, SummarizerConfig};
use ytnotes::shell::Shell;
use ytnotes::summarize::GeminiSummarizer;
use ytnotes::youtube::InnerTubeFetcher;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).wrap_err_with(|| format!("failed to create {}", log_dir.display()))?;
    let log_file = log_dir.join("ytnotes.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytnotes")
        .join("logs")
}

fn build_after_help() -> String {
    format!(
        "\nREQUIRED ENVIRONMENT:\n  {}  API key for the Gemini summarization service (also read from {})\n\nConfig file: {}\nLogs are written to: {}",
        ytnotes::config::API_KEY_VAR,
        ytnotes::config::DOTENV_FILE,
        ytnotes::config::config_path().display(),
        log_dir().join("ytnotes.log").display()
    )
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    let config = Config::load(cli.config.as_deref())?;
    let summarizer_config = SummarizerConfig::from_env(&config, cli.model.as_deref())?;
    let lang = cli.lang.clone().unwrap_or_else(|| config.lang().to_string());

    if cli.verbose {
        eprintln!("Model: {}", summarizer_config.model);
        eprintln!("Caption language: {lang}");
        eprintln!("API base: {}", summarizer_config.api_base);
    }
    info!("Using model {} and caption language {lang}", summarizer_config.model);

    let client = reqwest::Client::new();
    let fetcher = InnerTubeFetcher::new(client.clone(), lang);
    let summarizer = GeminiSummarizer::new(client, summarizer_config);

    let show_progress = !cli.no_progress && io::stderr().is_terminal();
    let mut shell = Shell::new(fetcher, summarizer, io::stdout().lock()).with_progress(show_progress);

    if let Some(ref url) = cli.url {
        let outcome = shell.submit(url).await?;
        if !outcome.is_success() {
            return Ok(ExitCode::FAILURE);
        }
    } else {
        let prompt = io::stdin().is_terminal();
        let succeeded = shell.run(io::stdin().lock(), prompt).await?;
        info!("Session finished: {succeeded} notes generated");
    }

    Ok(ExitCode::SUCCESS)
}
