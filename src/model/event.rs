use serde_json::Value;

use super::ids::{SequenceId, ToolCallId};

/// One decoded frame of the chat stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    SessionStart {
        message_id: Option<String>,
    },
    TextStart {
        id: SequenceId,
        agent_name: Option<String>,
    },
    TextDelta {
        id: SequenceId,
        delta: String,
    },
    TextEnd {
        id: SequenceId,
        agent_name: Option<String>,
    },
    ReasoningStart {
        id: SequenceId,
        agent_name: Option<String>,
        /// Short "what I'm thinking about" line some agents attach.
        hint: Option<String>,
    },
    ReasoningDelta {
        id: SequenceId,
        delta: String,
    },
    ReasoningEnd {
        id: SequenceId,
        agent_name: Option<String>,
    },
    ToolStart {
        tool_call_id: ToolCallId,
        tool_name: String,
        /// `None` when the frame had no `input` field.
        input: Option<Value>,
        agent_name: Option<String>,
    },
    ToolEnd {
        tool_call_id: ToolCallId,
        output: Option<Value>,
    },
    StructuredData {
        namespace: String,
        payload: Option<Value>,
    },
    Error {
        message: String,
    },
    Abort,
    Unknown {
        raw: Value,
    },
}

impl StreamEvent {
    pub fn text_start(id: &str, agent_name: Option<&str>) -> Self {
        Self::TextStart {
            id: SequenceId::new(id),
            agent_name: agent_name.map(str::to_string),
        }
    }

    pub fn text_delta(id: &str, delta: &str) -> Self {
        Self::TextDelta {
            id: SequenceId::new(id),
            delta: delta.to_string(),
        }
    }

    pub fn text_end(id: &str) -> Self {
        Self::TextEnd {
            id: SequenceId::new(id),
            agent_name: None,
        }
    }

    pub fn reasoning_start(id: &str, agent_name: Option<&str>) -> Self {
        Self::ReasoningStart {
            id: SequenceId::new(id),
            agent_name: agent_name.map(str::to_string),
            hint: None,
        }
    }

    pub fn reasoning_delta(id: &str, delta: &str) -> Self {
        Self::ReasoningDelta {
            id: SequenceId::new(id),
            delta: delta.to_string(),
        }
    }

    pub fn reasoning_end(id: &str) -> Self {
        Self::ReasoningEnd {
            id: SequenceId::new(id),
            agent_name: None,
        }
    }

    pub fn tool_start(tool_call_id: &str, tool_name: &str, input: Value) -> Self {
        Self::ToolStart {
            tool_call_id: ToolCallId::new(tool_call_id),
            tool_name: tool_name.to_string(),
            input: Some(input),
            agent_name: None,
        }
    }

    pub fn tool_end(tool_call_id: &str, output: Value) -> Self {
        Self::ToolEnd {
            tool_call_id: ToolCallId::new(tool_call_id),
            output: Some(output),
        }
    }

    /// Wire tag this event was decoded from, for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionStart { .. } => "start",
            Self::TextStart { .. } => "text-start",
            Self::TextDelta { .. } => "text-delta",
            Self::TextEnd { .. } => "text-end",
            Self::ReasoningStart { .. } => "reasoning-start",
            Self::ReasoningDelta { .. } => "reasoning-delta",
            Self::ReasoningEnd { .. } => "reasoning-end",
            Self::ToolStart { .. } => "tool-input-available",
            Self::ToolEnd { .. } => "tool-output-available",
            Self::StructuredData { .. } => "data",
            Self::Error { .. } => "error",
            Self::Abort => "abort",
            Self::Unknown { .. } => "unknown",
        }
    }
}
