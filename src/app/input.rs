use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use futures_util::StreamExt;

/// Single-line editor with history recall.
/// Pure data; all terminal I/O lives in [`read_line`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    buffer: Vec<char>,
    /// Cursor position in chars, `0..=buffer.len()`.
    cursor: usize,
    /// Oldest first.
    history: Vec<String>,
    /// Entry currently recalled, `None` while editing a fresh line.
    history_pos: Option<usize>,
    /// Line being typed before history navigation started.
    draft: Vec<char>,
}

/// What the caller should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    Continue,
    Submit(String),
    /// Ctrl-C or Ctrl-D on an empty line.
    Quit,
}

impl LineEditor {
    pub fn new(history: Vec<String>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    pub fn line(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_line(&mut self, chars: Vec<char>) {
        self.cursor = chars.len();
        self.buffer = chars;
    }
}

/// Pure editor state transition.
/// Takes current editor + keyboard event, returns new editor and action.
pub fn handle_key(mut editor: LineEditor, key: KeyEvent) -> (LineEditor, EditorAction) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => return (editor, EditorAction::Quit),
        KeyCode::Char('d') if ctrl => {
            if editor.buffer.is_empty() {
                return (editor, EditorAction::Quit);
            }
            delete_forward(&mut editor);
        }
        KeyCode::Char('a') if ctrl => editor.cursor = 0,
        KeyCode::Char('e') if ctrl => editor.cursor = editor.buffer.len(),
        KeyCode::Char('u') if ctrl => {
            editor.buffer.drain(..editor.cursor);
            editor.cursor = 0;
        }
        KeyCode::Char(c) if !ctrl => {
            editor.buffer.insert(editor.cursor, c);
            editor.cursor += 1;
        }
        KeyCode::Backspace => {
            if editor.cursor > 0 {
                editor.cursor -= 1;
                editor.buffer.remove(editor.cursor);
            }
        }
        KeyCode::Delete => delete_forward(&mut editor),
        KeyCode::Left => editor.cursor = editor.cursor.saturating_sub(1),
        KeyCode::Right => editor.cursor = (editor.cursor + 1).min(editor.buffer.len()),
        KeyCode::Home => editor.cursor = 0,
        KeyCode::End => editor.cursor = editor.buffer.len(),
        KeyCode::Up => history_back(&mut editor),
        KeyCode::Down => history_forward(&mut editor),
        KeyCode::Enter => {
            let line = editor.line();
            return (LineEditor::new(editor.history), EditorAction::Submit(line));
        }
        _ => {}
    }
    (editor, EditorAction::Continue)
}

fn delete_forward(editor: &mut LineEditor) {
    if editor.cursor < editor.buffer.len() {
        editor.buffer.remove(editor.cursor);
    }
}

fn history_back(editor: &mut LineEditor) {
    let next = match editor.history_pos {
        None if editor.history.is_empty() => return,
        None => {
            editor.draft = editor.buffer.clone();
            editor.history.len() - 1
        }
        Some(0) => return,
        Some(pos) => pos - 1,
    };
    editor.history_pos = Some(next);
    let chars = editor.history[next].chars().collect();
    editor.set_line(chars);
}

fn history_forward(editor: &mut LineEditor) {
    let Some(pos) = editor.history_pos else {
        return;
    };
    if pos + 1 < editor.history.len() {
        editor.history_pos = Some(pos + 1);
        let chars = editor.history[pos + 1].chars().collect();
        editor.set_line(chars);
    } else {
        editor.history_pos = None;
        let draft = std::mem::take(&mut editor.draft);
        editor.set_line(draft);
    }
}

/// Restores cooked mode on every exit path.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Outcome of one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    Quit,
}

/// Read one line from the terminal in raw mode.
///
/// `prompt` is printed as is; `prompt_width` is its visible width (without
/// color escapes) for cursor placement.
///
/// # Imperative Shell
pub async fn read_line(
    prompt: &str,
    prompt_width: usize,
    history: &[String],
) -> io::Result<ReadOutcome> {
    let _raw = RawModeGuard::enable()?;
    let mut events = EventStream::new();
    let mut editor = LineEditor::new(history.to_vec());
    let mut out = io::stdout();
    redraw(&mut out, prompt, prompt_width, &editor)?;

    while let Some(event) = events.next().await {
        let Event::Key(key) = event? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let (next, action) = handle_key(editor, key);
        editor = next;
        match action {
            EditorAction::Continue => redraw(&mut out, prompt, prompt_width, &editor)?,
            EditorAction::Submit(line) => {
                out.write_all(b"\r\n")?;
                out.flush()?;
                return Ok(ReadOutcome::Line(line));
            }
            EditorAction::Quit => {
                out.write_all(b"\r\n")?;
                out.flush()?;
                return Ok(ReadOutcome::Quit);
            }
        }
    }
    Ok(ReadOutcome::Quit)
}

fn redraw(out: &mut impl Write, prompt: &str, width: usize, editor: &LineEditor) -> io::Result<()> {
    let column = u16::try_from(width + editor.cursor()).unwrap_or(u16::MAX);
    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    out.write_all(prompt.as_bytes())?;
    out.write_all(editor.line().as_bytes())?;
    queue!(out, MoveToColumn(column))?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(mut editor: LineEditor, text: &str) -> LineEditor {
        for c in text.chars() {
            editor = handle_key(editor, key(KeyCode::Char(c))).0;
        }
        editor
    }

    fn history() -> Vec<String> {
        vec!["first".to_string(), "second".to_string()]
    }

    #[test]
    fn typing_and_submit() {
        let editor = type_str(LineEditor::default(), "hello");
        let (editor, action) = handle_key(editor, key(KeyCode::Enter));
        assert_eq!(action, EditorAction::Submit("hello".into()));
        assert_eq!(editor.line(), "");
    }

    #[test]
    fn cursor_movement_and_insert() {
        let editor = type_str(LineEditor::default(), "ac");
        let (editor, _) = handle_key(editor, key(KeyCode::Left));
        let editor = type_str(editor, "b");
        assert_eq!(editor.line(), "abc");
        assert_eq!(editor.cursor(), 2);
    }

    #[test]
    fn backspace_and_delete() {
        let editor = type_str(LineEditor::default(), "abcd");
        let (editor, _) = handle_key(editor, key(KeyCode::Backspace));
        let (editor, _) = handle_key(editor, key(KeyCode::Home));
        let (editor, _) = handle_key(editor, key(KeyCode::Delete));
        assert_eq!(editor.line(), "bc");
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let (editor, action) = handle_key(LineEditor::default(), key(KeyCode::Backspace));
        assert_eq!(action, EditorAction::Continue);
        assert_eq!(editor.line(), "");
    }

    #[test]
    fn multibyte_chars_edit_cleanly() {
        let editor = type_str(LineEditor::default(), "héé");
        let (editor, _) = handle_key(editor, key(KeyCode::Backspace));
        assert_eq!(editor.line(), "hé");
    }

    #[test]
    fn up_recalls_newest_first() {
        let editor = LineEditor::new(history());
        let (editor, _) = handle_key(editor, key(KeyCode::Up));
        assert_eq!(editor.line(), "second");
        let (editor, _) = handle_key(editor, key(KeyCode::Up));
        assert_eq!(editor.line(), "first");
        let (editor, _) = handle_key(editor, key(KeyCode::Up));
        assert_eq!(editor.line(), "first");
    }

    #[test]
    fn down_returns_to_draft() {
        let editor = type_str(LineEditor::new(history()), "dra");
        let (editor, _) = handle_key(editor, key(KeyCode::Up));
        let (editor, _) = handle_key(editor, key(KeyCode::Down));
        assert_eq!(editor.line(), "dra");
        assert_eq!(editor.cursor(), 3);
    }

    #[test]
    fn up_with_empty_history_is_noop() {
        let editor = type_str(LineEditor::default(), "x");
        let (editor, _) = handle_key(editor, key(KeyCode::Up));
        assert_eq!(editor.line(), "x");
    }

    #[test]
    fn ctrl_c_quits() {
        let editor = type_str(LineEditor::default(), "half");
        let (_, action) = handle_key(editor, ctrl('c'));
        assert_eq!(action, EditorAction::Quit);
    }

    #[test]
    fn ctrl_d_quits_only_on_empty_line() {
        let (_, action) = handle_key(LineEditor::default(), ctrl('d'));
        assert_eq!(action, EditorAction::Quit);

        let editor = type_str(LineEditor::default(), "ab");
        let (editor, _) = handle_key(editor, key(KeyCode::Home));
        let (editor, action) = handle_key(editor, ctrl('d'));
        assert_eq!(action, EditorAction::Continue);
        assert_eq!(editor.line(), "b");
    }

    #[test]
    fn ctrl_u_kills_to_start() {
        let editor = type_str(LineEditor::default(), "abcd");
        let (editor, _) = handle_key(editor, key(KeyCode::Left));
        let (editor, _) = handle_key(editor, ctrl('u'));
        assert_eq!(editor.line(), "d");
        assert_eq!(editor.cursor(), 0);
    }
}
