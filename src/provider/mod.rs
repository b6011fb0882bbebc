//! Text-generation providers.
//!
//! Each provider owns its endpoint, authentication, request shape and the rule
//! for pulling the message text out of the response. The pipeline only sees
//! the [`MessageGenerator`] trait; [`from_config`] picks the implementation.

pub mod chatgpt;
pub mod ollama;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::Config;
use crate::error::{ConfigError, ProviderError};

pub use chatgpt::ChatGptClient;
pub use ollama::{OLLAMA_PARSE_ERROR_SENTINEL, OllamaClient};

/// Supported providers, selected by the `provider` config key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    ChatGpt,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "Ollama",
            ProviderKind::ChatGpt => "ChatGPT",
        }
    }

    /// Key used for this provider in the config file.
    pub fn config_key(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::ChatGpt => "chatgpt",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "chatgpt" => Ok(ProviderKind::ChatGpt),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// Everything a provider needs to produce one commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_prompt: String,
    pub branch_name: String,
    pub diff: String,
}

/// Chat message in the request body shared by both providers.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// A provider that turns a [`GenerationRequest`] into message text.
///
/// One attempt per call; errors are final.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

/// Build the generator named by `config.provider`.
///
/// Pure mapping: no network traffic happens here, so an unknown provider or a
/// missing API key is reported before any request is sent.
pub fn from_config(config: &Config) -> Result<Box<dyn MessageGenerator>, ConfigError> {
    let kind: ProviderKind = config.provider.parse()?;
    let timeout = config.request_timeout();

    match kind {
        ProviderKind::Ollama => Ok(Box::new(OllamaClient::new(
            http_client(timeout)?,
            config.ollama.base_url.clone(),
        ))),
        ProviderKind::ChatGpt => Ok(Box::new(ChatGptClient::new(
            http_client(timeout)?,
            config.chatgpt.base_url.clone(),
            config.chatgpt_api_key()?,
        ))),
    }
}

fn http_client(timeout: Option<Duration>) -> Result<Client, ConfigError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(ConfigError::HttpClient)
}

/// Join `path` onto `base_url`, tolerating a trailing slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
