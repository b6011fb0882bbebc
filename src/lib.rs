//! gcm-gen - generate git commit messages from the staged diff with an LLM.
//!
//! # Overview
//!
//! gcm-gen reads the staged diff, sends it with the branch name and a system
//! prompt to Ollama or ChatGPT, and hands the reply to the clipboard. It can
//! optionally commit with the generated message.

pub mod clipboard;
pub mod config;
pub mod error;
pub mod git;
pub mod output;
pub mod pipeline;
pub mod provider;
pub mod spinner;

// Re-export commonly used types
pub use clipboard::{Clipboard, Platform, SystemClipboard};
pub use config::{Config, ConfigPaths};
pub use error::{ClipboardError, CommitError, ConfigError, DiffError, PipelineError, ProviderError};
pub use git::{GitRepo, Vcs};
pub use output::{Output, Terminal};
pub use pipeline::{GenerationPipeline, Outcome};
pub use provider::{GenerationRequest, MessageGenerator, ProviderKind};
