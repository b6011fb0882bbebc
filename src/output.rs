//! Where user-facing text goes.
//!
//! The pipeline and clipboard sink never print directly; they call
//! [`Output::render`] for normal text and [`Output::error`] for failures.

use crossterm::style::Stylize;

pub trait Output: Send + Sync {
    /// Show text to the user.
    fn render(&self, text: &str);

    /// Show an error to the user.
    fn error(&self, text: &str);
}

/// Prints to stdout, errors in red to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct Terminal;

impl Output for Terminal {
    fn render(&self, text: &str) {
        println!("{text}");
    }

    fn error(&self, text: &str) {
        eprintln!("{}", text.red().bold());
    }
}
