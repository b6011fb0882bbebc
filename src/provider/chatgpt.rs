//! OpenAI chat completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ChatMessage, GenerationRequest, MessageGenerator, ProviderKind, endpoint};
use crate::error::ProviderError;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Request body for `POST /v1/chat/completions`.
#[derive(Serialize, Debug)]
pub struct ChatGptRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize, Debug)]
struct ChatGptResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize, Debug)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for the OpenAI chat completions API, authenticated with a bearer token.
pub struct ChatGptClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ChatGptClient {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// System prompt, then the diff verbatim. The branch name is not sent.
    pub fn build_request(request: &GenerationRequest) -> ChatGptRequest {
        ChatGptRequest {
            model: request.model.clone(),
            messages: vec![
                ChatMessage::system(request.system_prompt.clone()),
                ChatMessage::user(request.diff.clone()),
            ],
        }
    }

    /// Content of the first choice. Anything missing is an error.
    pub fn extract_content(body: &str) -> Result<String, ProviderError> {
        let response: ChatGptResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::InvalidResponse {
                provider: ProviderKind::ChatGpt,
                message: e.to_string(),
            })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(ProviderError::MissingContent {
                provider: ProviderKind::ChatGpt,
            })
    }
}

fn network_error(e: &reqwest::Error) -> ProviderError {
    ProviderError::Network {
        provider: ProviderKind::ChatGpt,
        message: e.to_string(),
    }
}

#[async_trait]
impl MessageGenerator for ChatGptClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ChatGpt
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let url = endpoint(&self.base_url, COMPLETIONS_PATH);
        let body = Self::build_request(request);

        info!(url = %url, model = %request.model, "Sending request to ChatGPT");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| network_error(&e))?;

        if !status.is_success() {
            return Err(ProviderError::HttpStatus {
                provider: ProviderKind::ChatGpt,
                status: status.as_u16(),
                body: text,
            });
        }

        debug!(response_len = text.len(), "Received ChatGPT response");
        Self::extract_content(&text)
    }
}
