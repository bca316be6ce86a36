use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;

use crate::error::SessionError;
use crate::model::ChatSession;
use crate::paths::Paths;

/// Most prompts kept in the input history file.
pub const MAX_HISTORY_SIZE: usize = 30;

const LOG_TITLE: &str = "AI Agents Studio - Terminal Chat History";
const DEFAULT_AGENT: &str = "Main AI Supervisor";

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    // Color escapes, plus bare `[NNm` fragments left behind by partial writes.
    Regex::new(r"\x1b\[[0-9;]*m|\[[0-9]+m").expect("ansi regex must compile")
});

// ============================================================================
// FUNCTIONAL CORE: Pure functions for history and log formatting
// ============================================================================

/// Parse history file contents: one entry per line, blanks dropped.
pub fn parse_history(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Add `entry` as the newest item, dropping an older copy and anything past
/// [`MAX_HISTORY_SIZE`]. Blank entries leave the history untouched.
pub fn push_history(history: &[String], entry: &str) -> Vec<String> {
    if entry.trim().is_empty() {
        return history.to_vec();
    }
    let mut next: Vec<String> = history
        .iter()
        .filter(|item| item.as_str() != entry)
        .cloned()
        .collect();
    next.push(entry.to_string());
    let excess = next.len().saturating_sub(MAX_HISTORY_SIZE);
    next.drain(..excess);
    next
}

pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

fn iso(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Plain-text chat log: header, then one section per exchange.
pub fn render_chat_log(session: &ChatSession, generated: DateTime<Utc>) -> String {
    let mut out = String::new();
    out.push_str(LOG_TITLE);
    out.push('\n');
    out.push_str(&format!("Generated: {}\n", iso(&generated)));
    out.push_str(&format!("Total Entries: {}\n", session.len()));
    out.push_str(&"=".repeat(80));
    out.push_str("\n\n");

    for exchange in session.exchanges() {
        out.push_str(&format!("[{}]\n", iso(&exchange.timestamp)));
        out.push_str(&format!("User ({}): {}\n", exchange.user, exchange.prompt));
        out.push_str(&format!(
            "Agent: {}\n",
            exchange.agent.as_deref().unwrap_or(DEFAULT_AGENT)
        ));
        out.push_str(&format!("Response: {}\n", strip_ansi(&exchange.response)));
        out.push_str(&"-".repeat(40));
        out.push_str("\n\n");
    }
    out
}

// ============================================================================
// IMPERATIVE SHELL: File I/O
// ============================================================================

fn io_error(path: &Path, source: std::io::Error) -> SessionError {
    SessionError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Load the input history. A missing file is an empty history.
pub fn load_history(path: &Path) -> Result<Vec<String>, SessionError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(parse_history(&content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(io_error(path, e)),
    }
}

/// Record `entry` and rewrite the history file.
///
/// The updated history is returned even when the write fails, so the
/// running session keeps navigating it.
pub fn save_to_history(
    path: &Path,
    history: &[String],
    entry: &str,
) -> (Vec<String>, Result<(), SessionError>) {
    let next = push_history(history, entry);
    if next.len() == history.len() && next.as_slice() == history {
        return (next, Ok(()));
    }
    let mut content = next.join("\n");
    content.push('\n');
    let written = fs::write(path, content).map_err(|e| io_error(path, e));
    (next, written)
}

/// Write the chat log under `paths.log_dir`, creating it if needed.
pub fn save_chat_history(
    paths: &Paths,
    session: &ChatSession,
    now: DateTime<Utc>,
) -> Result<PathBuf, SessionError> {
    if session.is_empty() {
        return Err(SessionError::Empty);
    }
    fs::create_dir_all(&paths.log_dir).map_err(|e| io_error(&paths.log_dir, e))?;

    let file = paths.chat_log_file(now.naive_utc());
    fs::write(&file, render_chat_log(session, now)).map_err(|e| io_error(&file, e))?;
    tracing::info!(path = %file.display(), entries = session.len(), "chat history saved");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChatExchange;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn parse_history_drops_blank_lines() {
        assert_eq!(parse_history("a\n\n  \nb\n"), vec!["a", "b"]);
    }

    #[test]
    fn push_history_dedupes_and_moves_to_end() {
        let history = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(push_history(&history, "a"), vec!["b", "c", "a"]);
    }

    #[test]
    fn push_history_caps_size() {
        let history: Vec<String> = (0..MAX_HISTORY_SIZE).map(|i| i.to_string()).collect();
        let next = push_history(&history, "new");
        assert_eq!(next.len(), MAX_HISTORY_SIZE);
        assert_eq!(next.first().map(String::as_str), Some("1"));
        assert_eq!(next.last().map(String::as_str), Some("new"));
    }

    #[test]
    fn push_history_ignores_blank() {
        let history = vec!["a".to_string()];
        assert_eq!(push_history(&history, "   "), history);
    }

    #[test]
    fn strip_ansi_removes_color_codes() {
        assert_eq!(strip_ansi("\x1b[1;31mred\x1b[0m and [39mplain"), "red and plain");
    }

    #[test]
    fn chat_log_layout() {
        let mut session = ChatSession::new();
        session.record(
            ChatExchange::new(at(0), "ana".into(), "hi".into(), "\x1b[32mhello\x1b[0m".into())
                .with_agent(Some("planner".into())),
        );
        session.record(ChatExchange::new(at(5), "ana".into(), "bye".into(), "ciao".into()));

        let log = render_chat_log(&session, at(10));
        let expected = format!(
            "{}\nGenerated: 2023-11-14T22:13:30.000Z\nTotal Entries: 2\n{}\n\n\
             [2023-11-14T22:13:20.000Z]\nUser (ana): hi\nAgent: planner\nResponse: hello\n{}\n\n\
             [2023-11-14T22:13:25.000Z]\nUser (ana): bye\nAgent: Main AI Supervisor\nResponse: ciao\n{}\n\n",
            LOG_TITLE,
            "=".repeat(80),
            "-".repeat(40),
            "-".repeat(40)
        );
        assert_eq!(log, expected);
    }
}
