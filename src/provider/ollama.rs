//! Ollama chat API client.

use std::io::{self, IsTerminal};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ChatMessage, GenerationRequest, MessageGenerator, ProviderKind, endpoint};
use crate::error::ProviderError;
use crate::spinner::Spinner;

/// Returned instead of an error when the reply has no message content.
pub const OLLAMA_PARSE_ERROR_SENTINEL: &str = "Error: Unable to parse response";

const CHAT_PATH: &str = "/api/chat";

/// Request body for `POST /api/chat`.
#[derive(Serialize, Debug)]
pub struct OllamaChatRequest {
    pub model: String,
    pub stream: bool,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize, Debug)]
struct OllamaChatResponse {
    message: Option<OllamaResponseMessage>,
}

#[derive(Deserialize, Debug)]
struct OllamaResponseMessage {
    content: Option<String>,
}

/// Client for a local (or self-hosted) Ollama server.
pub struct OllamaClient {
    client: Client,
    base_url: String,
    show_progress: bool,
}

impl OllamaClient {
    /// Progress is shown only when stdout is a terminal.
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url,
            show_progress: io::stdout().is_terminal(),
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Streaming off; system prompt, then branch name, then diff.
    pub fn build_request(request: &GenerationRequest) -> OllamaChatRequest {
        OllamaChatRequest {
            model: request.model.clone(),
            stream: false,
            messages: vec![
                ChatMessage::system(request.system_prompt.clone()),
                ChatMessage::user(format!(
                    "Here is the current branch name: {}",
                    request.branch_name
                )),
                ChatMessage::user(format!("Here is the `git diff` output: {}", request.diff)),
            ],
        }
    }

    /// Message content from a reply body, or the sentinel when absent.
    pub fn extract_content(body: &str) -> String {
        match serde_json::from_str::<OllamaChatResponse>(body) {
            Ok(OllamaChatResponse {
                message:
                    Some(OllamaResponseMessage {
                        content: Some(content),
                    }),
            }) => content,
            Ok(_) => {
                warn!("Ollama response has no message content");
                OLLAMA_PARSE_ERROR_SENTINEL.to_string()
            }
            Err(e) => {
                warn!("Failed to parse Ollama response: {e}");
                OLLAMA_PARSE_ERROR_SENTINEL.to_string()
            }
        }
    }

    async fn send(&self, url: &str, body: &OllamaChatRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| network_error(&e))?;

        if !status.is_success() {
            return Err(ProviderError::HttpStatus {
                provider: ProviderKind::Ollama,
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

fn network_error(e: &reqwest::Error) -> ProviderError {
    ProviderError::Network {
        provider: ProviderKind::Ollama,
        message: e.to_string(),
    }
}

#[async_trait]
impl MessageGenerator for OllamaClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let url = endpoint(&self.base_url, CHAT_PATH);
        let body = Self::build_request(request);

        info!(url = %url, model = %request.model, "Sending request to Ollama");
        debug!(
            diff_len = request.diff.len(),
            branch = %request.branch_name,
            "Built Ollama chat request"
        );

        let spinner = self.show_progress.then(|| {
            Spinner::start(
                format!("Generating commit message with {}...", request.model),
                io::stdout(),
            )
        });

        let result = self.send(&url, &body).await;

        // The indicator's line must be gone before anything else is printed.
        if let Some(spinner) = spinner {
            spinner.stop().await;
        }

        let text = result?;
        Ok(Self::extract_content(&text))
    }
}
