pub mod chat;
pub mod event;
pub mod ids;
pub mod theme;

pub use chat::{ChatExchange, ChatSession};
pub use event::StreamEvent;
pub use ids::{SequenceId, ToolCallId};
pub use theme::{AgentStyle, Theme};
