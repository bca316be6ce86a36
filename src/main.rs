use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::{eyre, Result, WrapErr};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use agent_chat::api::ApiClient;
use agent_chat::app::{user_name, AppOptions, ChatApp, ChatMode};
use agent_chat::config::Config;
use agent_chat::paths::Paths;

#[derive(Debug, Parser)]
#[command(
    name = "agent-chat",
    about = "Interactive command-line interface for AI agents",
    version,
    after_help = "Commands during chat:\n  exit     Exit the cli\n  /save    Save chat history to a timestamped log file\n  /reset   Clear chat history and the screen"
)]
struct Cli {
    /// Pre-defined message to send without prompting.
    #[arg(short, long, value_name = "TEXT")]
    message: Option<String>,

    /// Single questions without a conversation thread.
    #[arg(short, long)]
    ask_mode: bool,

    /// Reuse an existing thread id (`new` asks the backend for one).
    #[arg(long, value_name = "ID", conflicts_with = "ask_mode")]
    thread: Option<String>,

    /// Disable colors and JSON highlighting.
    #[arg(long)]
    no_color: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = fmt().with_env_filter(env_filter);

    let result = match log_file {
        Some(path) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;
            subscriber
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => subscriber.with_writer(std::io::stderr).try_init(),
    };
    result.map_err(|err| eyre!("failed to init tracing: {err}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre panic handler for better error messages
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let config = Config::from_env().wrap_err("❌ Environment validation failed")?;
    let client = ApiClient::new(&config)?;
    let paths = Paths::resolve(&std::env::current_dir()?);

    let mode = if cli.ask_mode {
        ChatMode::Ask
    } else {
        ChatMode::Chat {
            thread_id: cli
                .thread
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        }
    };
    info!(?mode, base_url = %config.base_url, "starting chat");

    let options = AppOptions {
        mode,
        initial_message: cli.message,
        color: !cli.no_color,
    };
    ChatApp::new(client, paths, options, user_name()).run().await?;
    Ok(())
}
