//! Error types for gcm-gen modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

use crate::provider::ProviderKind;

/// Errors from reading the staged diff.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("No staged changes found. Please stage your changes using 'git add' first.")]
    NoStagedChanges,

    #[error("Failed to run git diff: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git diff exited with {}: {stderr}",
             .code.map_or("unknown status".to_string(), |c| format!("code {c}")))]
    GitFailed { code: Option<i32>, stderr: String },
}

/// Errors from creating the commit.
///
/// Only surfaced when strict commit checking is enabled; otherwise the
/// commit is fire-and-forget.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error("Failed to run git commit: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git commit exited with {}: {stderr}",
             .code.map_or("unknown status".to_string(), |c| format!("code {c}")))]
    NonZeroExit { code: Option<i32>, stderr: String },
}

/// Errors from a text-generation provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{provider} API request failed: {message}")]
    Network {
        provider: ProviderKind,
        message: String,
    },

    #[error("{provider} API returned HTTP {status}: {body}")]
    HttpStatus {
        provider: ProviderKind,
        status: u16,
        body: String,
    },

    #[error("{provider} returned an invalid response: {message}")]
    InvalidResponse {
        provider: ProviderKind,
        message: String,
    },

    #[error("{provider} response has no message content")]
    MissingContent { provider: ProviderKind },

    #[error("{provider} returned an empty commit message")]
    EmptyMessage { provider: ProviderKind },
}

/// Errors from loading or resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown provider '{0}'. Supported providers: ollama, chatgpt")]
    UnknownProvider(String),

    #[error("No model configured for provider {0}. Set '{1}.model' in the config file.")]
    MissingModel(ProviderKind, &'static str),

    #[error(
        "ChatGPT API key not found. Set 'chatgpt.api_key' in the config file or the OPENAI_API_KEY environment variable"
    )]
    MissingApiKey,

    #[error("Failed to determine home directory")]
    HomeDirNotFound,

    #[error("Failed to read config file {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error(
        "Failed to open editor '{editor}'. Please make sure your EDITOR environment variable is set correctly."
    )]
    EditorFailed {
        editor: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

/// Errors from delivering text to the system clipboard.
///
/// These never escape the clipboard sink; they select the fallback path.
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("Failed to launch {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write to {program}: {source}")]
    WriteFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}", .code.map_or("unknown status".to_string(), |c| format!("code {c}")))]
    NonZeroExit { program: String, code: Option<i32> },

    #[error("Failed to prepare temporary file: {0}")]
    TempFile(#[source] std::io::Error),
}

/// Fatal errors from a generation pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Commit(#[from] CommitError),
}
