use std::fmt;
use std::time::Duration;

use serde_json::Value;

use super::format::format_duration;

/// Shown in place of an empty body.
pub const EMPTY_BODY: &str = "No message provided";

/// Annotation after the agent label in a block header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEvent {
    Reasoning,
    ToolCall(String),
    /// `None` when the tool-end had no matching start.
    ToolEnd(Option<String>),
    StructuredOutput,
}

impl fmt::Display for BlockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockEvent::Reasoning => write!(f, "reasoning"),
            BlockEvent::ToolCall(name) => write!(f, "tool-call: {}", name),
            BlockEvent::ToolEnd(Some(name)) => write!(f, "tool-end: {}", name),
            BlockEvent::ToolEnd(None) => write!(f, "tool-end: unknown"),
            BlockEvent::StructuredOutput => write!(f, "structured-output"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Normal,
    /// Secondary content such as reasoning.
    Muted,
}

/// One flushed unit of output: header, body, footer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderBlock {
    pub agent: String,
    pub index: Option<usize>,
    pub event: Option<BlockEvent>,
    pub duration: Option<Duration>,
    pub body: String,
    pub tone: Tone,
}

impl RenderBlock {
    pub fn new(agent: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            index: None,
            event: None,
            duration: None,
            body: body.into(),
            tone: Tone::Normal,
        }
    }

    pub fn with_index(mut self, index: Option<usize>) -> Self {
        self.index = index;
        self
    }

    pub fn with_event(mut self, event: BlockEvent) -> Self {
        self.event = Some(event);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn muted(mut self) -> Self {
        self.tone = Tone::Muted;
        self
    }

    /// Header text after the agent label, e.g. ` [2] tool-end: search (1.5s)`.
    pub fn header_tail(&self) -> String {
        let mut tail = String::new();
        if let Some(index) = self.index {
            tail.push_str(&format!(" [{}]", index));
        }
        if let Some(ref event) = self.event {
            tail.push_str(&format!(" {}", event));
        }
        if let Some(duration) = self.duration {
            tail.push_str(&format!(" ({})", format_duration(duration)));
        }
        tail
    }

    pub fn formatted_body(&self) -> FormattedBody {
        format_body(&self.body)
    }
}

/// Body after the shared formatting rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedBody {
    pub text: String,
    /// Pretty-printed JSON (eligible for highlighting).
    pub is_json: bool,
}

/// Pretty-print JSON bodies, unwrapping one level of string encoding;
/// anything that is not JSON is returned verbatim (trimmed).
pub fn format_body(message: &str) -> FormattedBody {
    let safe = message.trim();
    if safe.is_empty() {
        return FormattedBody {
            text: EMPTY_BODY.to_string(),
            is_json: false,
        };
    }

    let value = match serde_json::from_str::<Value>(safe) {
        Ok(Value::String(inner)) => {
            serde_json::from_str::<Value>(&inner).unwrap_or(Value::String(inner))
        }
        Ok(value) => value,
        Err(_) => {
            return FormattedBody {
                text: safe.to_string(),
                is_json: false,
            }
        }
    };

    match serde_json::to_string_pretty(&value) {
        Ok(text) => FormattedBody {
            text,
            is_json: true,
        },
        Err(_) => FormattedBody {
            text: safe.to_string(),
            is_json: false,
        },
    }
}

/// Serialize a payload the way tool blocks carry it before formatting.
/// A missing payload gives an empty body, shown as `EMPTY_BODY`.
pub fn payload_body(payload: Option<&Value>) -> String {
    payload
        .and_then(|value| serde_json::to_string(value).ok())
        .unwrap_or_default()
}
