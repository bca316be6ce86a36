/// In-chat commands recognised before a prompt is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    Exit,
    Save,
    Reset,
}

/// Match a prompt against the command words, case-insensitively.
/// Anything else is a prompt for the agents.
pub fn parse_command(prompt: &str) -> Option<ChatCommand> {
    match prompt.trim().to_lowercase().as_str() {
        "exit" | "/exit" => Some(ChatCommand::Exit),
        "save" | "/save" => Some(ChatCommand::Save),
        "reset" | "/reset" | "clear" | "/clear" => Some(ChatCommand::Reset),
        _ => None,
    }
}

/// Confirmation printed after a reset.
pub fn reset_message(cleared: usize) -> String {
    if cleared > 0 {
        format!("✅ Chat session reset! Cleared {} previous entries.", cleared)
    } else {
        "✅ Chat session reset!".to_string()
    }
}
