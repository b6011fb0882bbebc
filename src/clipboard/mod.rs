//! Best-effort delivery of the commit message to the system clipboard.
//!
//! Dispatch is by host OS:
//! - macOS: pipe to `pbcopy`
//! - Linux: pipe to `xclip`, else `xsel`
//! - Windows: write a temp file and feed it to `clip`
//!
//! Every failure falls back to printing the text, so nothing escapes
//! [`Clipboard::copy`].

pub mod runner;

use std::io::Write;

use tracing::{debug, warn};

use crate::error::ClipboardError;
use crate::output::Output;

pub use runner::{CommandRunner, Payload, SystemRunner};

/// Host operating system families with distinct clipboard utilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
    Other(String),
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os.to_lowercase().as_str() {
            "macos" | "darwin" => Platform::MacOs,
            "linux" => Platform::Linux,
            "windows" | "win32" | "winnt" => Platform::Windows,
            other => Platform::Other(other.to_string()),
        }
    }
}

/// Somewhere to put the finished message.
#[cfg_attr(test, mockall::automock)]
pub trait Clipboard: Send + Sync {
    /// Copy `text`. Never fails; falls back to showing the text.
    fn copy(&self, text: &str);
}

/// Clipboard backed by the platform's command-line utilities.
pub struct SystemClipboard<'a> {
    platform: Platform,
    runner: Box<dyn CommandRunner + 'a>,
    output: &'a dyn Output,
}

impl<'a> SystemClipboard<'a> {
    pub fn new(output: &'a dyn Output) -> Self {
        Self::with_runner(Platform::current(), SystemRunner, output)
    }

    pub fn with_runner(
        platform: Platform,
        runner: impl CommandRunner + 'a,
        output: &'a dyn Output,
    ) -> Self {
        Self {
            platform,
            runner: Box::new(runner),
            output,
        }
    }

    fn try_copy(&self, text: &str) -> Result<(), ClipboardError> {
        match &self.platform {
            Platform::MacOs => self.copy_macos(text),
            Platform::Linux => self.copy_linux(text),
            Platform::Windows => self.copy_windows(text),
            Platform::Other(os) => {
                self.output.error(&format!("Unsupported OS: {os}"));
                self.output.render(text);
                Ok(())
            }
        }
    }

    fn copy_macos(&self, text: &str) -> Result<(), ClipboardError> {
        match self.runner.pipe("pbcopy", &[], Payload::Text(text)) {
            // pbcopy failing to launch is not reported and the text is not shown.
            Err(ClipboardError::SpawnFailed { program, source }) => {
                debug!("Failed to launch {program}: {source}");
                Ok(())
            }
            other => other,
        }
    }

    fn copy_linux(&self, text: &str) -> Result<(), ClipboardError> {
        let (program, args): (&str, &[&str]) = if self.runner.command_exists("xclip") {
            ("xclip", &["-selection", "clipboard"])
        } else if self.runner.command_exists("xsel") {
            ("xsel", &["--clipboard", "--input"])
        } else {
            self.output.error("Neither xclip nor xsel is installed");
            self.display(text);
            return Ok(());
        };

        debug!(program, "Copying with linux clipboard utility");
        self.runner.pipe(program, args, Payload::Text(text))
    }

    fn copy_windows(&self, text: &str) -> Result<(), ClipboardError> {
        let mut file = tempfile::Builder::new()
            .prefix("clip")
            .tempfile()
            .map_err(ClipboardError::TempFile)?;
        file.write_all(text.as_bytes())
            .and_then(|()| file.flush())
            .map_err(ClipboardError::TempFile)?;

        let result = self.runner.pipe("clip", &[], Payload::File(file.path()));

        // Removed whether or not clip succeeded.
        if let Err(e) = file.close() {
            debug!("Failed to remove clipboard temp file: {e}");
        }

        result
    }

    fn display(&self, text: &str) {
        self.output.render("Output:");
        self.output.render(text);
    }
}

impl Clipboard for SystemClipboard<'_> {
    fn copy(&self, text: &str) {
        match self.try_copy(text) {
            Ok(()) => debug!(platform = ?self.platform, "Clipboard delivery finished"),
            Err(e) => {
                warn!("Clipboard copy failed: {e}");
                self.output
                    .error(&format!("Failed to copy to clipboard: {e}"));
                self.display(text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingOutput {
        rendered: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl RecordingOutput {
        fn rendered(&self) -> Vec<String> {
            self.rendered.lock().unwrap().clone()
        }

        fn errors(&self) -> Vec<String> {
            self.errors.lock().unwrap().clone()
        }
    }

    impl Output for RecordingOutput {
        fn render(&self, text: &str) {
            self.rendered.lock().unwrap().push(text.to_string());
        }

        fn error(&self, text: &str) {
            self.errors.lock().unwrap().push(text.to_string());
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct PipeCall {
        program: String,
        args: Vec<String>,
        text: String,
        file: Option<PathBuf>,
    }

    enum Outcome {
        Ok,
        SpawnFails,
        ExitsNonZero,
    }

    struct FakeRunner<'a> {
        installed: Vec<&'static str>,
        outcome: Outcome,
        calls: &'a Mutex<Vec<PipeCall>>,
    }

    impl CommandRunner for FakeRunner<'_> {
        fn command_exists(&self, program: &str) -> bool {
            self.installed.iter().any(|p| *p == program)
        }

        fn pipe(
            &self,
            program: &str,
            args: &[&str],
            payload: Payload<'_>,
        ) -> Result<(), ClipboardError> {
            let (text, file) = match payload {
                Payload::Text(text) => (text.to_string(), None),
                Payload::File(path) => (
                    std::fs::read_to_string(path).unwrap(),
                    Some(path.to_path_buf()),
                ),
            };
            self.calls.lock().unwrap().push(PipeCall {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                text,
                file,
            });

            match self.outcome {
                Outcome::Ok => Ok(()),
                Outcome::SpawnFails => Err(ClipboardError::SpawnFailed {
                    program: program.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                }),
                Outcome::ExitsNonZero => Err(ClipboardError::NonZeroExit {
                    program: program.to_string(),
                    code: Some(1),
                }),
            }
        }
    }

    fn copy_with(
        platform: Platform,
        installed: Vec<&'static str>,
        outcome: Outcome,
        text: &str,
    ) -> (RecordingOutput, Vec<PipeCall>) {
        let output = RecordingOutput::default();
        let calls = Mutex::new(Vec::new());
        {
            let runner = FakeRunner {
                installed,
                outcome,
                calls: &calls,
            };
            let clipboard = SystemClipboard::with_runner(platform, runner, &output);
            clipboard.copy(text);
        }
        let calls = calls.into_inner().unwrap();
        (output, calls)
    }

    #[test]
    fn test_platform_from_os() {
        assert_eq!(Platform::from_os("macos"), Platform::MacOs);
        assert_eq!(Platform::from_os("Darwin"), Platform::MacOs);
        assert_eq!(Platform::from_os("linux"), Platform::Linux);
        assert_eq!(Platform::from_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_os("WINNT"), Platform::Windows);
        assert_eq!(
            Platform::from_os("freebsd"),
            Platform::Other("freebsd".to_string())
        );
    }

    #[test]
    fn test_macos_pipes_to_pbcopy() {
        let (output, calls) = copy_with(Platform::MacOs, vec![], Outcome::Ok, "feat: add x");

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "pbcopy");
        assert_eq!(calls[0].text, "feat: add x");
        assert!(output.rendered().is_empty());
        assert!(output.errors().is_empty());
    }

    #[test]
    fn test_macos_launch_failure_is_silent() {
        let (output, calls) = copy_with(Platform::MacOs, vec![], Outcome::SpawnFails, "msg");

        assert_eq!(calls.len(), 1);
        assert!(output.rendered().is_empty());
        assert!(output.errors().is_empty());
    }

    #[test]
    fn test_macos_nonzero_exit_falls_back_to_display() {
        let (output, _) = copy_with(Platform::MacOs, vec![], Outcome::ExitsNonZero, "msg");

        assert_eq!(output.errors().len(), 1);
        assert!(output.errors()[0].starts_with("Failed to copy to clipboard"));
        assert_eq!(output.rendered(), vec!["Output:", "msg"]);
    }

    #[test]
    fn test_linux_prefers_xclip() {
        let (output, calls) = copy_with(Platform::Linux, vec!["xclip", "xsel"], Outcome::Ok, "msg");

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "xclip");
        assert_eq!(calls[0].args, vec!["-selection", "clipboard"]);
        assert_eq!(calls[0].text, "msg");
        assert!(output.errors().is_empty());
    }

    #[test]
    fn test_linux_falls_back_to_xsel() {
        let (_, calls) = copy_with(Platform::Linux, vec!["xsel"], Outcome::Ok, "msg");

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "xsel");
        assert_eq!(calls[0].args, vec!["--clipboard", "--input"]);
    }

    #[test]
    fn test_linux_without_utilities_displays_text() {
        let (output, calls) = copy_with(Platform::Linux, vec![], Outcome::Ok, "msg");

        assert!(calls.is_empty());
        assert_eq!(output.errors(), vec!["Neither xclip nor xsel is installed"]);
        assert_eq!(output.rendered(), vec!["Output:", "msg"]);
    }

    #[test]
    fn test_linux_pipe_failure_displays_text() {
        let (output, _) = copy_with(Platform::Linux, vec!["xclip"], Outcome::SpawnFails, "msg");

        assert_eq!(output.errors().len(), 1);
        assert_eq!(output.rendered(), vec!["Output:", "msg"]);
    }

    #[test]
    fn test_windows_pipes_temp_file_and_removes_it() {
        let (output, calls) = copy_with(Platform::Windows, vec![], Outcome::Ok, "fix: y");

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "clip");
        assert_eq!(calls[0].text, "fix: y");
        let file = calls[0].file.clone().unwrap();
        assert!(!file.exists(), "temp file should be removed");
        assert!(output.errors().is_empty());
    }

    #[test]
    fn test_windows_removes_temp_file_when_clip_fails() {
        let (output, calls) = copy_with(Platform::Windows, vec![], Outcome::ExitsNonZero, "fix: y");

        let file = calls[0].file.clone().unwrap();
        assert!(!file.exists(), "temp file should be removed");
        assert_eq!(output.rendered(), vec!["Output:", "fix: y"]);
    }

    #[test]
    fn test_unsupported_os_displays_text() {
        let (output, calls) = copy_with(
            Platform::Other("haiku".to_string()),
            vec!["xclip"],
            Outcome::Ok,
            "msg",
        );

        assert!(calls.is_empty());
        assert_eq!(output.errors(), vec!["Unsupported OS: haiku"]);
        assert_eq!(output.rendered(), vec!["msg"]);
    }
}
