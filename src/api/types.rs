use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            name: None,
        }
    }
}

/// Body of `POST /api/v1/chat/ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement_gathering_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarizer_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick_agents: Option<Vec<String>>,
}

impl AskRequest {
    /// Single user question, no streaming.
    pub fn single(prompt: &str) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            stream: false,
            requirement_gathering_prompt: None,
            summarizer_prompt: None,
            pick_agents: None,
        }
    }
}

/// Answer of the ask endpoint: the last message that carries content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskReply {
    pub content: String,
    pub agent_name: Option<String>,
}

impl AskReply {
    /// Pull the reply out of the endpoint's message array. Anything that is
    /// not an array ending in a message with non-empty `content` yields `None`.
    pub fn from_response(response: &Value) -> Option<Self> {
        let last = response.as_array()?.last()?;
        let content = match last.get("content")? {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::String(_) | Value::Null => return None,
            other => other.to_string(),
        };
        let agent_name = last
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        Some(Self {
            content,
            agent_name,
        })
    }
}

/// Body of `POST /api/v1/chat/stream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConfig {
    pub thread_id: String,
    pub content: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursion_limit: Option<u32>,
}

impl StreamConfig {
    /// Turn config with a fresh message id.
    pub fn new(thread_id: &str, content: &str, user_id: &str) -> Self {
        Self {
            thread_id: thread_id.to_string(),
            content: content.to_string(),
            user_id: user_id.to_string(),
            message_id: Some(uuid::Uuid::new_v4().to_string()),
            original_content: None,
            recursion_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewThreadRequest {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewThreadResponse {
    #[serde(default)]
    pub message: String,
    pub thread_id: String,
    #[serde(default)]
    pub created_at: String,
}
