//! Opening config files in the user's editor.

use std::env;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::ConfigError;

const DEFAULT_EDITOR: &str = "nano";

/// Editor command from `EDITOR`, defaulting to nano.
pub fn editor_command() -> String {
    match env::var("EDITOR") {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => DEFAULT_EDITOR.to_string(),
    }
}

/// Open `path` in the editor and wait for it to exit.
///
/// `EDITOR` may carry arguments (`code --wait`); they are split on whitespace.
pub fn open_in_editor(path: &Path) -> Result<(), ConfigError> {
    let editor = editor_command();
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(DEFAULT_EDITOR);

    debug!("Opening {} with {}", path.display(), editor);

    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|source| ConfigError::EditorFailed {
            editor: editor.clone(),
            source: Some(source),
        })?;

    if !status.success() {
        return Err(ConfigError::EditorFailed {
            editor,
            source: None,
        });
    }

    Ok(())
}
