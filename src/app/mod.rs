pub mod commands;
pub mod input;

pub use commands::{parse_command, reset_message, ChatCommand};
pub use input::{handle_key, read_line, EditorAction, LineEditor, ReadOutcome};

use std::future::Future;
use std::io::{self, IsTerminal, Write};

use chrono::Utc;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{ApiClient, AskReply, AskRequest, NewThreadRequest, StreamConfig};
use crate::error::{ChatError, SessionError, StreamError};
use crate::model::{ChatExchange, ChatSession, Theme};
use crate::paths::Paths;
use crate::session;
use crate::stream::{self, RunOptions};
use crate::view::{Painter, ProgressIndicator, Spinner, TerminalRenderer};

/// Thread id that asks the backend for a fresh thread.
pub const NEW_THREAD: &str = "new";

/// How the chat loop talks to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMode {
    /// Streamed conversation on one thread.
    Chat { thread_id: String },
    /// Independent single questions.
    Ask,
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub mode: ChatMode,
    pub initial_message: Option<String>,
    pub color: bool,
}

/// Interactive chat session: prompt, commands, turns.
pub struct ChatApp {
    client: ApiClient,
    paths: Paths,
    options: AppOptions,
    painter: Painter,
    user_name: String,
    /// Stdout is a terminal: spinners animate and status lines are cleared.
    interactive: bool,
    chat: ChatSession,
    history: Vec<String>,
}

impl ChatApp {
    pub fn new(client: ApiClient, paths: Paths, options: AppOptions, user_name: String) -> Self {
        let painter = Painter::new(options.color);
        Self {
            client,
            paths,
            options,
            painter,
            user_name,
            interactive: io::stdout().is_terminal(),
            chat: ChatSession::new(),
            history: Vec::new(),
        }
    }

    /// Prompt loop. Returns when the user exits.
    pub async fn run(mut self) -> Result<(), ChatError> {
        if let ChatMode::Chat { ref thread_id } = self.options.mode {
            println!(
                "\n{}",
                self.painter.bold(&format!("🧵 Thread ID: {}", thread_id), Theme::ERROR)
            );
        }
        self.print_banner();

        self.history = match session::load_history(&self.paths.history_file) {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "history not loaded");
                println!(
                    "{}",
                    self.painter.fg("Warning: Could not load history file", Theme::WARNING)
                );
                Vec::new()
            }
        };

        let mut pending = self.options.initial_message.take();
        let prefix = format!("{}: ", self.user_name);

        loop {
            let prompt = match pending.take() {
                Some(message) => {
                    println!(
                        "{}{}",
                        self.painter.bold(&prefix, Theme::PROMPT),
                        self.painter.fg(&message, Theme::LABEL_TEXT)
                    );
                    message
                }
                None => {
                    let styled = self.painter.bold(&prefix, Theme::PROMPT);
                    let width = prefix.chars().count();
                    match read_line(&styled, width, &self.history).await? {
                        ReadOutcome::Line(line) => line,
                        ReadOutcome::Quit => {
                            self.goodbye();
                            return Ok(());
                        }
                    }
                }
            };

            if prompt.trim().is_empty() {
                println!("{}", self.painter.fg("Please enter a prompt.", Theme::WARNING));
                continue;
            }

            if let Some(command) = parse_command(&prompt) {
                if self.handle_command(command)? {
                    return Ok(());
                }
                continue;
            }

            let (history, written) =
                session::save_to_history(&self.paths.history_file, &self.history, &prompt);
            self.history = history;
            if let Err(e) = written {
                warn!(error = %e, "history not saved");
                println!(
                    "{}",
                    self.painter.fg("Warning: Could not save to history file", Theme::WARNING)
                );
            }

            let cancel = CancellationToken::new();
            let watcher = spawn_interrupt_watcher(cancel.clone());
            let result = self.turn(&prompt, &cancel).await;
            watcher.abort();

            match result {
                Ok(()) => println!("\n"),
                Err(e) if e.is_cancelled() => {
                    println!("{}", self.painter.fg("\n⚠️  Request was cancelled", Theme::WARNING));
                }
                Err(e) => {
                    eprintln!(
                        "{} {}",
                        self.painter.bold("\nAn error occurred:", Theme::ERROR),
                        e
                    );
                }
            }
        }
    }

    /// Returns true when the loop should end.
    fn handle_command(&mut self, command: ChatCommand) -> Result<bool, ChatError> {
        match command {
            ChatCommand::Exit => {
                self.goodbye();
                Ok(true)
            }
            ChatCommand::Save => {
                match session::save_chat_history(&self.paths, &self.chat, Utc::now()) {
                    Ok(path) => {
                        println!(
                            "{}",
                            self.painter.fg(
                                &format!("✅ Chat history saved to: {}", path.display()),
                                Theme::SUCCESS
                            )
                        );
                        println!(
                            "{}",
                            self.painter.fg(
                                &format!("📝 Total entries saved: {}", self.chat.len()),
                                Theme::TITLE
                            )
                        );
                    }
                    Err(SessionError::Empty) => println!(
                        "{}",
                        self.painter.fg(
                            "⚠️  No chat history to save yet. Start chatting first!",
                            Theme::WARNING
                        )
                    ),
                    Err(e) => eprintln!(
                        "{} {}",
                        self.painter.fg("❌ Error saving chat history:", Theme::ERROR),
                        e
                    ),
                }
                Ok(false)
            }
            ChatCommand::Reset => {
                let cleared = self.chat.clear();
                clear_screen()?;
                self.print_banner();
                println!("{}", self.painter.fg(&reset_message(cleared), Theme::SUCCESS));
                println!(
                    "{}",
                    self.painter.fg("🆕 Starting fresh chat session...\n", Theme::TITLE)
                );
                Ok(false)
            }
        }
    }

    async fn turn(&mut self, prompt: &str, cancel: &CancellationToken) -> Result<(), ChatError> {
        let mut spinner = Spinner::start("AI: Thinking...", self.painter, self.interactive);
        let result = match self.options.mode {
            ChatMode::Ask => self.ask_turn(prompt, &mut spinner, cancel).await,
            ChatMode::Chat { .. } => self.chat_turn(prompt, &mut spinner, cancel).await,
        };
        if result.is_err() {
            spinner.fail("Request failed");
        }
        result
    }

    async fn ask_turn(
        &mut self,
        prompt: &str,
        spinner: &mut Spinner,
        cancel: &CancellationToken,
    ) -> Result<(), ChatError> {
        spinner.set_text("AI: Processing...");
        let response = or_cancel(cancel, self.client.ask(&AskRequest::single(prompt))).await?;
        spinner.success("Response received");

        let Some(reply) = AskReply::from_response(&response) else {
            debug!("ask response carried no message");
            return Ok(());
        };
        println!("{}", self.painter.bold("AI:", Theme::TITLE));
        println!("{}", self.painter.fg(&reply.content, Theme::LABEL_TEXT));

        self.chat.record(
            ChatExchange::new(
                Utc::now(),
                self.user_name.clone(),
                prompt.to_string(),
                reply.content,
            )
            .with_agent(reply.agent_name),
        );
        Ok(())
    }

    async fn chat_turn(
        &mut self,
        prompt: &str,
        spinner: &mut Spinner,
        cancel: &CancellationToken,
    ) -> Result<(), ChatError> {
        let thread_id = self.ensure_thread(spinner, cancel).await?;

        spinner.set_text("AI: Connecting...");
        let config = StreamConfig::new(&thread_id, prompt, &self.user_name);
        let response = or_cancel(cancel, self.client.stream_chat(&config)).await?;
        spinner.success("Connected");

        let mut progress = Spinner::start("", self.painter, self.interactive);
        let renderer = TerminalRenderer::stdout(self.options.color, self.interactive);
        let outcome = stream::run(
            response.bytes_stream(),
            renderer,
            &mut progress,
            RunOptions::new(Some(self.chat.next_index())),
            cancel,
        )
        .await;
        progress.stop();
        let outcome = outcome?;

        let content = outcome.content.trim();
        if !content.is_empty() {
            let agent = Some(outcome.agent_name.clone());
            self.chat.record(
                ChatExchange::new(
                    Utc::now(),
                    self.user_name.clone(),
                    prompt.to_string(),
                    content.to_string(),
                )
                .with_agent(agent),
            );
        }
        Ok(())
    }

    /// Thread id for this turn, creating one on the backend when asked to.
    async fn ensure_thread(
        &mut self,
        spinner: &mut Spinner,
        cancel: &CancellationToken,
    ) -> Result<String, ChatError> {
        let ChatMode::Chat { ref thread_id } = self.options.mode else {
            return Ok(String::new());
        };
        if thread_id != NEW_THREAD {
            return Ok(thread_id.clone());
        }

        spinner.set_text("AI: Creating new thread...");
        let request = NewThreadRequest {
            user_id: self.user_name.clone(),
        };
        let created = or_cancel(cancel, self.client.create_new_thread(&request)).await?;
        println!("{}", self.painter.dim(&format!("🧵 Thread: {}", created.thread_id)));
        self.options.mode = ChatMode::Chat {
            thread_id: created.thread_id.clone(),
        };
        Ok(created.thread_id)
    }

    fn print_banner(&self) {
        for line in banner_lines(&self.painter) {
            println!("{}", line);
        }
    }

    fn goodbye(&self) {
        println!("{}", self.painter.bold("👋 Goodbye!", Theme::TITLE));
    }
}

pub fn banner_lines(painter: &Painter) -> Vec<String> {
    let mut lines = vec![painter.bold("🤖 AI Chat CLI", Theme::TITLE)];
    lines.extend(
        [
            "Use ↑/↓ arrow keys to navigate history.",
            "Type 'exit' or press Ctrl+C to quit.",
            "Type '/save' to save chat history to log file.",
            "Type '/reset' to clear chat history and cli.",
        ]
        .iter()
        .map(|line| painter.fg(line, Theme::LABEL_TEXT)),
    );
    lines
}

/// Login name for the prompt: `$USER`, then `whoami`, then `You`.
pub fn user_name() -> String {
    let from_env = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|name| !name.trim().is_empty());
    if let Some(name) = from_env {
        return name.trim().to_string();
    }
    std::process::Command::new("whoami")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "You".to_string())
}

fn clear_screen() -> io::Result<()> {
    let mut out = io::stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    out.flush()
}

/// Cancel `token` on Ctrl-C while a turn is running.
fn spawn_interrupt_watcher(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling turn");
            token.cancel();
        }
    })
}

/// Await `future` unless `cancel` fires first.
async fn or_cancel<T, E, F>(cancel: &CancellationToken, future: F) -> Result<T, ChatError>
where
    F: Future<Output = Result<T, E>>,
    ChatError: From<E>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StreamError::Cancelled.into()),
        result = future => result.map_err(ChatError::from),
    }
}
