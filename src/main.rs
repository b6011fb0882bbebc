//! gcm-gen - CLI entry point.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gcm_gen::config::open_in_editor;
use gcm_gen::pipeline::Outcome;
use gcm_gen::{Config, GenerationPipeline, GitRepo, Output, SystemClipboard, Terminal};

/// Generate git commit messages from the staged diff using an LLM.
#[derive(Parser, Debug)]
#[command(name = "gcm-gen")]
#[command(about = "Generate git commit messages from staged changes using an LLM")]
#[command(version, arg_required_else_help = true)]
struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Fail when `git commit` fails instead of ignoring it
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a commit message
    #[command(visible_alias = "g")]
    Generate,

    /// Generate a commit message and commit
    #[command(visible_alias = "c")]
    Commit,

    /// Show the prompt and diff that would be sent
    #[command(visible_alias = "d")]
    Debug,

    /// Show current configuration
    Config {
        /// Open configuration in the default editor
        #[arg(short, long)]
        edit: bool,
    },

    /// Show current prompt
    Prompt {
        /// Open the prompt in the default editor
        #[arg(short, long)]
        edit: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let terminal = Terminal;
    match run(cli, &terminal).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&terminal, &e);
            ExitCode::FAILURE
        }
    }
}

/// Print the error, then each cause on its own line.
fn report_error(output: &dyn Output, error: &anyhow::Error) {
    output.error(&format!("Error: {error}"));
    for cause in error.chain().skip(1) {
        output.error(&format!("  Caused by: {cause}"));
    }
}

/// Stderr so logs never mix with the generated message. `RUST_LOG` wins.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

async fn run(cli: Cli, terminal: &Terminal) -> Result<()> {
    let (mut config, paths) = Config::load().context("Failed to load configuration")?;
    if cli.strict {
        config.strict_commit = true;
    }

    match cli.command {
        Command::Generate => generate(&config, terminal, false).await,
        Command::Commit => generate(&config, terminal, true).await,
        Command::Debug => {
            let repo = GitRepo::from_config(&config);
            let clipboard = SystemClipboard::new(terminal);
            GenerationPipeline::new(&config, &repo, &clipboard, terminal).preview()?;
            Ok(())
        }
        Command::Config { edit: true } => {
            open_in_editor(&paths.config_file)?;
            Ok(())
        }
        Command::Config { edit: false } => {
            let json = serde_json::to_string_pretty(&config.redacted())
                .context("Failed to format configuration")?;
            terminal.render(&format!("Config file: {}", paths.config_file.display()));
            terminal.render(&json);
            Ok(())
        }
        Command::Prompt { edit: true } => {
            paths.ensure_prompt_file(&config.prompt)?;
            open_in_editor(&paths.prompt_file)?;
            Ok(())
        }
        Command::Prompt { edit: false } => {
            terminal.render("Current Prompt:");
            terminal.render(&config.prompt);
            Ok(())
        }
    }
}

async fn generate(config: &Config, terminal: &Terminal, commit: bool) -> Result<()> {
    let repo = GitRepo::from_config(config);
    let clipboard = SystemClipboard::new(terminal);
    let pipeline = GenerationPipeline::new(config, &repo, &clipboard, terminal);

    match pipeline.run(commit).await? {
        Outcome::EmptyDiff => tracing::debug!("Nothing to generate"),
        Outcome::Delivered { committed, .. } => {
            tracing::debug!(committed, "Commit message delivered");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use gcm_gen::{PipelineError, ProviderError, ProviderKind};

    #[derive(Default)]
    struct RecordingOutput {
        errors: Mutex<Vec<String>>,
    }

    impl Output for RecordingOutput {
        fn render(&self, _text: &str) {}

        fn error(&self, text: &str) {
            self.errors.lock().unwrap().push(text.to_string());
        }
    }

    #[test]
    fn test_provider_error_has_single_prefix() {
        let output = RecordingOutput::default();
        let error = anyhow::Error::from(PipelineError::from(ProviderError::Network {
            provider: ProviderKind::Ollama,
            message: "connection refused".to_string(),
        }));

        report_error(&output, &error);

        let errors = output.errors.lock().unwrap();
        assert_eq!(errors[0], "Error: Ollama API request failed: connection refused");
        assert!(errors.iter().all(|line| !line.contains("Error: Error")));
    }

    #[test]
    fn test_http_status_error_has_single_prefix() {
        let output = RecordingOutput::default();
        let error = anyhow::Error::from(PipelineError::from(ProviderError::HttpStatus {
            provider: ProviderKind::ChatGpt,
            status: 401,
            body: "unauthorized".to_string(),
        }));

        report_error(&output, &error);

        let errors = output.errors.lock().unwrap();
        assert_eq!(errors[0], "Error: ChatGPT API returned HTTP 401: unauthorized");
    }

    #[test]
    fn test_context_causes_are_listed() {
        let output = RecordingOutput::default();
        let error = anyhow::Error::from(gcm_gen::ConfigError::HomeDirNotFound)
            .context("Failed to load configuration");

        report_error(&output, &error);

        let errors = output.errors.lock().unwrap();
        assert_eq!(
            *errors,
            vec![
                "Error: Failed to load configuration",
                "  Caused by: Failed to determine home directory"
            ]
        );
    }
}
