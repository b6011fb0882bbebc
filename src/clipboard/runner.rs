//! External clipboard utilities.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::ClipboardError;

/// What a clipboard utility receives on stdin.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Text(&'a str),
    File(&'a Path),
}

/// Runs clipboard utilities. Split out so dispatch can be tested without them.
pub trait CommandRunner: Send + Sync {
    /// Whether `program` is on the PATH.
    fn command_exists(&self, program: &str) -> bool;

    /// Run `program` with `payload` on stdin and wait for it.
    fn pipe(&self, program: &str, args: &[&str], payload: Payload<'_>)
    -> Result<(), ClipboardError>;
}

/// Runs the real utilities.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn command_exists(&self, program: &str) -> bool {
        // `which` crate instead of shelling out to which/where
        which::which(program).is_ok()
    }

    fn pipe(
        &self,
        program: &str,
        args: &[&str],
        payload: Payload<'_>,
    ) -> Result<(), ClipboardError> {
        let stdin = match payload {
            Payload::Text(_) => Stdio::piped(),
            Payload::File(path) => Stdio::from(File::open(path).map_err(ClipboardError::TempFile)?),
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(stdin)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| ClipboardError::SpawnFailed {
                program: program.to_string(),
                source,
            })?;

        if let Payload::Text(text) = payload
            && let Some(mut pipe) = child.stdin.take()
        {
            // Dropping the handle closes stdin so the utility sees EOF.
            if let Err(source) = pipe.write_all(text.as_bytes()) {
                drop(pipe);
                let _ = child.wait();
                return Err(ClipboardError::WriteFailed {
                    program: program.to_string(),
                    source,
                });
            }
        }

        let status = child.wait().map_err(|source| ClipboardError::WriteFailed {
            program: program.to_string(),
            source,
        })?;
        debug!(program, code = ?status.code(), "Clipboard utility finished");

        if !status.success() {
            return Err(ClipboardError::NonZeroExit {
                program: program.to_string(),
                code: status.code(),
            });
        }

        Ok(())
    }
}
