//! Configuration loading for gcm-gen.
//!
//! The configuration lives in `$HOME/.config/gcm-gen/config.json` (or the path
//! named by `GCM_GEN_CONFIG`). A default file is written on first use. An
//! optional `prompt.md` next to it overrides the `prompt` key.

pub mod editor;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::provider::ProviderKind;

pub use editor::open_in_editor;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV_VAR: &str = "GCM_GEN_CONFIG";

/// Environment variable consulted when `chatgpt.api_key` is empty.
pub const OPENAI_API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Default maximum diff length in characters before truncation.
pub const DEFAULT_MAX_DIFF_LENGTH: usize = 10_000;

pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_CHATGPT_BASE_URL: &str = "https://api.openai.com";

const CONFIG_FILE_NAME: &str = "config.json";
const PROMPT_FILE_NAME: &str = "prompt.md";

/// Default system prompt written to a fresh config.
pub const DEFAULT_PROMPT: &str = "Generate a git commit message based on the following rules:

1. First line:
    - Use imperative mood (Add not Added)
    - Max 50 characters
    - Format: [type] - [ticket] [description]
    - [ticket] is optional and can be built from the branch name look for the pattern '/(?:#(\\d+)|([A-Z]+-\\d+))/i'
    - [type] from branch patterns using emojis only (no branch pattern match):
        feature/* → ✨
        [bugfix,hotfix]/* → 🐛
        release/* → 🔖
        default → 🤖

2. Optional body (if changes are complex):
    - Leave one blank line after subject
    - Create a new line at 72 characters
    - Explain the type of change in the first line
    - Explain what and why, not how
    - Add BREAKING CHANGE: for breaking changes";

/// Settings for the local Ollama provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OllamaSettings {
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            base_url: default_ollama_base_url(),
        }
    }
}

/// Settings for the remote ChatGPT provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatGptSettings {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_chatgpt_base_url")]
    pub base_url: String,
}

impl Default for ChatGptSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            api_key: String::new(),
            base_url: default_chatgpt_base_url(),
        }
    }
}

/// Resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub provider: String,
    /// Paths excluded from the diff, in order.
    #[serde(default)]
    pub ignore_files: Vec<String>,
    #[serde(default)]
    pub ollama: OllamaSettings,
    #[serde(default)]
    pub chatgpt: ChatGptSettings,
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_max_diff_length")]
    pub max_diff_length: usize,
    /// Fail the run when `git commit` exits non-zero.
    #[serde(default)]
    pub strict_commit: bool,
    /// HTTP timeout for provider calls. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: "chatgpt".to_string(),
            ignore_files: [
                "vendor",
                "node_modules",
                "package-lock.json",
                "yarn.lock",
                "composer.lock",
                "dist",
                "build",
                "public",
                "storage",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            ollama: OllamaSettings::default(),
            chatgpt: ChatGptSettings::default(),
            prompt: DEFAULT_PROMPT.to_string(),
            max_diff_length: DEFAULT_MAX_DIFF_LENGTH,
            strict_commit: false,
            request_timeout_secs: None,
        }
    }
}

fn default_ollama_base_url() -> String {
    DEFAULT_OLLAMA_BASE_URL.to_string()
}

fn default_chatgpt_base_url() -> String {
    DEFAULT_CHATGPT_BASE_URL.to_string()
}

fn default_max_diff_length() -> usize {
    DEFAULT_MAX_DIFF_LENGTH
}

impl Config {
    /// Model configured for the given provider.
    pub fn model_for(&self, kind: ProviderKind) -> Result<&str, ConfigError> {
        let model = match kind {
            ProviderKind::Ollama => self.ollama.model.trim(),
            ProviderKind::ChatGpt => self.chatgpt.model.trim(),
        };
        if model.is_empty() {
            return Err(ConfigError::MissingModel(kind, kind.config_key()));
        }
        Ok(model)
    }

    /// ChatGPT API key, falling back to `OPENAI_API_KEY`.
    pub fn chatgpt_api_key(&self) -> Result<String, ConfigError> {
        let configured = self.chatgpt.api_key.trim();
        if !configured.is_empty() {
            return Ok(configured.to_string());
        }

        match env::var(OPENAI_API_KEY_ENV_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Copy of the config with the API key masked, for display.
    pub fn redacted(&self) -> Config {
        let mut copy = self.clone();
        if !copy.chatgpt.api_key.is_empty() {
            copy.chatgpt.api_key = "********".to_string();
        }
        copy
    }

    /// Load the config from the default location, creating it if missing.
    pub fn load() -> Result<(Self, ConfigPaths), ConfigError> {
        let paths = ConfigPaths::resolve()?;
        let config = Self::load_from_paths(&paths)?;
        Ok((config, paths))
    }

    /// Load the config from explicit paths, creating the config file if missing.
    pub fn load_from_paths(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        let mut config = if paths.config_file.exists() {
            Self::load_from_path(&paths.config_file)?
        } else {
            info!("No config at {}, writing defaults", paths.config_file.display());
            let config = Config::default();
            config.write_to(&paths.config_file)?;
            config
        };

        if paths.prompt_file.exists() {
            debug!("Using prompt file {}", paths.prompt_file.display());
            config.prompt = fs::read_to_string(&paths.prompt_file)
                .map_err(|source| ConfigError::ReadFailed {
                    path: paths.prompt_file.clone(),
                    source,
                })?
                .trim()
                .to_string();
        }

        Ok(config)
    }

    /// Parse a config file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::SerializeFailed)?;
        write_file(path, &format!("{content}\n"))
    }
}

/// Where the config and prompt files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
    pub prompt_file: PathBuf,
}

impl ConfigPaths {
    /// Resolve from `GCM_GEN_CONFIG`, else `$HOME/.config/gcm-gen/`.
    pub fn resolve() -> Result<Self, ConfigError> {
        match env::var(CONFIG_PATH_ENV_VAR) {
            Ok(v) if !v.is_empty() => Ok(Self::for_config_file(PathBuf::from(v))),
            _ => {
                let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
                Ok(Self::in_dir(&home.join(".config").join("gcm-gen")))
            }
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config_file: dir.join(CONFIG_FILE_NAME),
            prompt_file: dir.join(PROMPT_FILE_NAME),
        }
    }

    /// The prompt file sits next to the given config file.
    pub fn for_config_file(config_file: PathBuf) -> Self {
        let prompt_file = config_file
            .parent()
            .map(|dir| dir.join(PROMPT_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(PROMPT_FILE_NAME));
        Self {
            config_file,
            prompt_file,
        }
    }

    /// Ensure the prompt file exists, seeding it with `prompt`.
    pub fn ensure_prompt_file(&self, prompt: &str) -> Result<(), ConfigError> {
        if self.prompt_file.exists() {
            return Ok(());
        }
        write_file(&self.prompt_file, &format!("{prompt}\n"))
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, content).map_err(|source| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}
