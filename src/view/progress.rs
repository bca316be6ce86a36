use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::terminal::{self, Clear, ClearType};
use tokio::task::JoinHandle;

use super::terminal::Painter;
use crate::model::Theme;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Live status line updated while sequences stream in.
pub trait ProgressIndicator {
    fn set_text(&mut self, text: &str);
    fn append_text(&mut self, text: &str);
    fn clear_text(&mut self);
    /// Halt without a final status line.
    fn stop(&mut self);
    fn success(&mut self, message: &str);
    fn fail(&mut self, message: &str);
}

impl<P: ProgressIndicator + ?Sized> ProgressIndicator for &mut P {
    fn set_text(&mut self, text: &str) {
        (**self).set_text(text);
    }

    fn append_text(&mut self, text: &str) {
        (**self).append_text(text);
    }

    fn clear_text(&mut self) {
        (**self).clear_text();
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn success(&mut self, message: &str) {
        (**self).success(message);
    }

    fn fail(&mut self, message: &str) {
        (**self).fail(message);
    }
}

#[derive(Debug, Default)]
struct SpinnerState {
    text: String,
    frame: usize,
}

/// Animated single-line spinner driven by a tokio interval task.
///
/// Only the last line of the text is drawn, cut to the terminal width.
/// When stdout is not a terminal nothing animates and only the final
/// success or failure line is printed. An interactive spinner must be
/// started from inside a tokio runtime.
pub struct Spinner {
    state: Arc<Mutex<SpinnerState>>,
    task: Option<JoinHandle<()>>,
    painter: Painter,
    interactive: bool,
}

impl Spinner {
    pub fn start(text: &str, painter: Painter, interactive: bool) -> Self {
        let state = Arc::new(Mutex::new(SpinnerState {
            text: text.to_string(),
            frame: 0,
        }));
        if !interactive {
            return Self {
                state,
                task: None,
                painter,
                interactive,
            };
        }

        let shared = Arc::clone(&state);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(FRAME_INTERVAL);
            loop {
                ticker.tick().await;
                let line = {
                    let mut state = lock(&shared);
                    state.frame = (state.frame + 1) % FRAMES.len();
                    status_line(FRAMES[state.frame], &state.text, terminal_width())
                };
                let _ = draw(&painter.fg(&line, Theme::TITLE), true);
            }
        });

        Self {
            state,
            task: Some(task),
            painter,
            interactive,
        }
    }

    fn halt(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = draw("", true);
        }
    }

    fn finish(&mut self, symbol: &str, message: &str, color: crossterm::style::Color) {
        self.halt();
        let line = self.painter.fg(&format!("{} {}", symbol, message), color);
        let _ = draw(&format!("{}\n", line), self.interactive);
    }
}

impl ProgressIndicator for Spinner {
    fn set_text(&mut self, text: &str) {
        lock(&self.state).text = text.to_string();
    }

    fn append_text(&mut self, text: &str) {
        lock(&self.state).text.push_str(text);
    }

    fn clear_text(&mut self) {
        lock(&self.state).text.clear();
    }

    fn stop(&mut self) {
        self.halt();
    }

    fn success(&mut self, message: &str) {
        self.finish("✔", message, Theme::SUCCESS);
    }

    fn fail(&mut self, message: &str) {
        self.finish("✖", message, Theme::ERROR);
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.halt();
    }
}

fn lock(state: &Mutex<SpinnerState>) -> MutexGuard<'_, SpinnerState> {
    // A poisoned spinner only ever holds display text.
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn terminal_width() -> usize {
    terminal::size().map(|(w, _)| w as usize).unwrap_or(80)
}

/// `<frame> <last line of text>` limited to `width` characters.
fn status_line(frame: &str, text: &str, width: usize) -> String {
    let last = text.lines().last().unwrap_or("").trim_end();
    let budget = width.saturating_sub(frame.chars().count() + 2);
    let visible: String = if last.chars().count() > budget {
        // Keep the tail: that's where new deltas land.
        let skip = last.chars().count() - budget;
        last.chars().skip(skip).collect()
    } else {
        last.to_string()
    };
    format!("{} {}", frame, visible)
}

fn draw(line: &str, clear: bool) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if clear {
        queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    }
    out.write_all(line.as_bytes())?;
    out.flush()
}
