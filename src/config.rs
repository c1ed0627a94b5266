use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr, bail};
use log::debug;
use serde::Deserialize;

use crate::summarize::{DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_PROMPT};

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const DOTENV_FILE: &str = ".env";
pub const DEFAULT_LANG: &str = "en";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: Option<String>,
    pub lang: Option<String>,
    pub prompt: Option<String>,
    pub prompt_file: Option<PathBuf>,
    pub api_base: Option<String>,
}

impl Config {
    /// Load config from `path`, or from ~/.config/ytnotes/config.toml if it exists.
    ///
    /// An explicitly given path must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (config_path(), false),
        };

        if !path.exists() {
            if explicit {
                bail!("config file not found: {}", path.display());
            }
            debug!("No config file found at {}", path.display());
            return Ok(Config::default());
        }

        debug!("Loading config from {}", path.display());
        let content =
            std::fs::read_to_string(&path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content).wrap_err_with(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Instruction template: `prompt_file` wins over inline `prompt`, then the built-in one
    pub fn prompt_template(&self) -> Result<String> {
        if let Some(ref file) = self.prompt_file {
            debug!("Reading prompt template from {}", file.display());
            return std::fs::read_to_string(file)
                .wrap_err_with(|| format!("failed to read prompt file {}", file.display()));
        }
        Ok(self.prompt.clone().unwrap_or_else(|| DEFAULT_PROMPT.to_string()))
    }

    pub fn lang(&self) -> &str {
        self.lang.as_deref().unwrap_or(DEFAULT_LANG)
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytnotes")
        .join("config.toml")
}

/// Everything the summarizer needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub api_key: String,
    pub model: String,
    pub prompt: String,
    pub api_base: String,
}

impl SummarizerConfig {
    /// Resolve from the config file, an optional model override and the API key.
    ///
    /// A missing or blank key is an error here rather than on the first request.
    pub fn resolve(config: &Config, model_override: Option<&str>, api_key: Option<String>) -> Result<Self> {
        let api_key = match api_key {
            Some(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => bail!("{API_KEY_VAR} environment variable not set (required for summarization)"),
        };

        let model = model_override
            .map(str::to_string)
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            model,
            prompt: config.prompt_template()?,
            api_base: config.api_base.clone().unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }

    /// Resolve with the key from the process environment, falling back to `./.env`
    pub fn from_env(config: &Config, model_override: Option<&str>) -> Result<Self> {
        Self::resolve(config, model_override, lookup_var(API_KEY_VAR, Path::new(DOTENV_FILE)))
    }
}

/// Read `name` from the environment, or from the dotenv file at `dotenv_path`.
///
/// The environment wins; the file is only parsed when the variable is unset.
pub fn lookup_var(name: &str, dotenv_path: &Path) -> Option<String> {
    if let Ok(value) = std::env::var(name) {
        return Some(value);
    }

    let entries = match dotenvy::from_path_iter(dotenv_path) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No dotenv file at {}: {e}", dotenv_path.display());
            return None;
        }
    };

    let value = entries
        .filter_map(|entry| entry.ok())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value);
    if value.is_some() {
        debug!("Read {name} from {}", dotenv_path.display());
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
model = "gemini-2.5-flash"
lang = "es"
prompt = "Summarize:\n"
api_base = "http://localhost:8080"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(config.lang(), "es");
        assert_eq!(config.prompt.as_deref(), Some("Summarize:\n"));
        assert_eq!(config.api_base.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.model.is_none());
        assert_eq!(config.lang(), DEFAULT_LANG);
        assert_eq!(config.prompt_template().unwrap(), DEFAULT_PROMPT);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let missing = std::env::temp_dir().join("ytnotes-does-not-exist").join("config.toml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_and_prompt_file() {
        let dir = std::env::temp_dir().join(format!("ytnotes-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let prompt_path = dir.join("prompt.txt");
        std::fs::write(&prompt_path, "From file:\n").unwrap();
        let config_path = dir.join("config.toml");
        std::fs::write(
            &config_path,
            format!("prompt = \"inline\"\nprompt_file = {:?}\n", prompt_path.display().to_string()),
        )
        .unwrap();

        let config = Config::load(Some(&config_path)).unwrap();
        assert_eq!(config.prompt_template().unwrap(), "From file:\n");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_lookup_var_reads_dotenv_file() {
        let dir = std::env::temp_dir().join(format!("ytnotes-dotenv-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let dotenv = dir.join(".env");
        std::fs::write(&dotenv, "OTHER=1\nYTNOTES_TEST_ONLY_IN_DOTENV=from-dotenv\n").unwrap();

        assert_eq!(
            lookup_var("YTNOTES_TEST_ONLY_IN_DOTENV", &dotenv).as_deref(),
            Some("from-dotenv")
        );
        assert_eq!(lookup_var("YTNOTES_TEST_MISSING_EVERYWHERE", &dotenv), None);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_lookup_var_without_dotenv_file() {
        let missing = std::env::temp_dir().join("ytnotes-no-dotenv-here").join(".env");
        assert_eq!(lookup_var("YTNOTES_TEST_MISSING_EVERYWHERE", &missing), None);
    }

    #[test]
    fn test_resolve_requires_api_key() {
        let config = Config::default();
        let err = SummarizerConfig::resolve(&config, None, None).unwrap_err();
        assert!(err.to_string().contains(API_KEY_VAR));
        assert!(SummarizerConfig::resolve(&config, None, Some("  ".to_string())).is_err());
    }

    #[test]
    fn test_resolve_precedence() {
        let config = Config {
            model: Some("from-file".to_string()),
            ..Default::default()
        };

        let resolved = SummarizerConfig::resolve(&config, None, Some("key".to_string())).unwrap();
        assert_eq!(resolved.model, "from-file");
        assert_eq!(resolved.api_base, DEFAULT_API_BASE);
        assert_eq!(resolved.prompt, DEFAULT_PROMPT);

        let resolved = SummarizerConfig::resolve(&config, Some("from-flag"), Some("key".to_string())).unwrap();
        assert_eq!(resolved.model, "from-flag");

        let resolved = SummarizerConfig::resolve(&Config::default(), None, Some("key".to_string())).unwrap();
        assert_eq!(resolved.model, DEFAULT_MODEL);
    }
}
