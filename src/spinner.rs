//! In-place progress indicator shown while a provider call is in flight.
//!
//! The indicator runs as a tokio task and is stopped through a oneshot
//! channel. [`Spinner::stop`] waits for the task to clear its line before
//! returning, so nothing the caller prints afterwards is interleaved with a
//! frame.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// Glyphs cycled by the indicator.
pub const FRAMES: [&str; 8] = ["⠋", "⠙", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Delay between frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(80);

pub struct Spinner {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start animating `message` on `writer`. Must be called inside a tokio runtime.
    pub fn start<W>(message: impl Into<String>, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let message = message.into();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut writer = writer;
            let mut ticker = tokio::time::interval(FRAME_INTERVAL);

            for frame in FRAMES.iter().cycle() {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if let Err(e) = draw_frame(&mut writer, frame, &message) {
                            debug!("Progress indicator write failed: {e}");
                            break;
                        }
                    }
                }
            }

            if let Err(e) = clear_line(&mut writer) {
                debug!("Progress indicator clear failed: {e}");
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Signal the indicator to stop and wait until its line is cleared.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            debug!("Progress indicator task failed: {e}");
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        // Dropped without stop(): still signal the task, but nobody waits.
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn draw_frame<W: Write>(writer: &mut W, frame: &str, message: &str) -> io::Result<()> {
    queue!(
        writer,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(frame.green()),
        Print(" "),
        Print(message.dark_grey())
    )?;
    writer.flush()
}

fn clear_line<W: Write>(writer: &mut W) -> io::Result<()> {
    queue!(writer, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    writer.flush()
}
