//! Commit message generation pipeline.
//!
//! Staged diff → provider → backtick stripping → optional commit → display
//! and clipboard. An empty diff stops the run with a warning; any provider
//! failure stops it with an error before anything is committed or copied.

use tracing::{debug, info};

use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::error::{PipelineError, ProviderError};
use crate::git::Vcs;
use crate::output::Output;
use crate::provider::{self, GenerationRequest, MessageGenerator};

/// Warning shown when the staged diff is empty after normalization.
pub const EMPTY_DIFF_WARNING: &str = "Warning: No changes detected in staged files.";

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to describe; no provider call, commit or clipboard write happened.
    EmptyDiff,
    /// The message was shown and handed to the clipboard.
    Delivered { message: String, committed: bool },
}

/// Remove every backtick from a provider reply.
pub fn strip_backticks(message: &str) -> String {
    message.replace('`', "")
}

pub struct GenerationPipeline<'a> {
    config: &'a Config,
    vcs: &'a dyn Vcs,
    clipboard: &'a dyn Clipboard,
    output: &'a dyn Output,
}

impl<'a> GenerationPipeline<'a> {
    pub fn new(
        config: &'a Config,
        vcs: &'a dyn Vcs,
        clipboard: &'a dyn Clipboard,
        output: &'a dyn Output,
    ) -> Self {
        Self {
            config,
            vcs,
            clipboard,
            output,
        }
    }

    /// Run with the provider named in the config.
    pub async fn run(&self, commit: bool) -> Result<Outcome, PipelineError> {
        let Some(diff) = self.fetch_diff()? else {
            return Ok(Outcome::EmptyDiff);
        };

        let generator = provider::from_config(self.config)?;
        self.generate_and_deliver(generator.as_ref(), diff, commit)
            .await
    }

    /// Run with an already-built generator.
    pub async fn run_with(
        &self,
        generator: &dyn MessageGenerator,
        commit: bool,
    ) -> Result<Outcome, PipelineError> {
        let Some(diff) = self.fetch_diff()? else {
            return Ok(Outcome::EmptyDiff);
        };

        self.generate_and_deliver(generator, diff, commit).await
    }

    /// Show the system prompt and the diff a provider would receive.
    pub fn preview(&self) -> Result<(), PipelineError> {
        let diff = self.vcs.staged_diff(self.config.max_diff_length)?;

        self.output.render("Debug mode enabled");
        self.output.render(&format!("{} {}", self.config.prompt, diff));
        Ok(())
    }

    /// Staged diff, or `None` (after warning) when it is empty.
    fn fetch_diff(&self) -> Result<Option<String>, PipelineError> {
        let diff = self.vcs.staged_diff(self.config.max_diff_length)?;

        if diff.is_empty() {
            self.output.render(EMPTY_DIFF_WARNING);
            return Ok(None);
        }

        debug!(diff_len = diff.len(), "Fetched staged diff");
        Ok(Some(diff))
    }

    async fn generate_and_deliver(
        &self,
        generator: &dyn MessageGenerator,
        diff: String,
        commit: bool,
    ) -> Result<Outcome, PipelineError> {
        let kind = generator.kind();
        let request = GenerationRequest {
            model: self.config.model_for(kind)?.to_string(),
            system_prompt: self.config.prompt.clone(),
            branch_name: self.vcs.current_branch(),
            diff,
        };

        info!(provider = %kind, model = %request.model, "Generating commit message");
        let raw = generator.generate(&request).await?;

        let message = strip_backticks(&raw);
        if message.trim().is_empty() {
            return Err(ProviderError::EmptyMessage { provider: kind }.into());
        }

        if commit {
            self.vcs.commit(&message)?;
        }

        self.output.render(&message);
        self.output.render("Copying to clipboard...");
        self.clipboard.copy(&message);

        Ok(Outcome::Delivered {
            message,
            committed: commit,
        })
    }
}
