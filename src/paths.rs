use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

/// Resolved on-disk locations used by the chat client.
/// Pure data structure with no I/O.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Prompt history, one entry per line.
    /// Example: <working_dir>/.terminal_history
    pub history_file: PathBuf,

    /// Directory receiving saved chat logs.
    /// Example: <working_dir>/logs/terminal/
    pub log_dir: PathBuf,
}

impl Paths {
    /// Resolves all paths relative to the given working directory.
    ///
    /// Does NOT create directories or verify file existence; that is the
    /// caller's responsibility.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use agent_chat::paths::Paths;
    ///
    /// let paths = Paths::resolve(Path::new("/home/user/project"));
    ///
    /// assert_eq!(
    ///     paths.history_file,
    ///     Path::new("/home/user/project/.terminal_history")
    /// );
    /// ```
    pub fn resolve(working_dir: &Path) -> Self {
        Self {
            history_file: working_dir.join(".terminal_history"),
            log_dir: working_dir.join("logs").join("terminal"),
        }
    }

    /// `<log_dir>/<YYYY-MM-DD>_<HH-MM-SS>_chat_history.log`
    pub fn chat_log_file(&self, at: NaiveDateTime) -> PathBuf {
        self.log_dir.join(format!(
            "{}_chat_history.log",
            at.format("%Y-%m-%d_%H-%M-%S")
        ))
    }
}
