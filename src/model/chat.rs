use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One prompt and the answer it produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatExchange {
    pub timestamp: DateTime<Utc>,
    pub user: String,
    #[serde(default)]
    pub agent: Option<String>,
    pub prompt: String,
    pub response: String,
}

impl ChatExchange {
    pub fn new(timestamp: DateTime<Utc>, user: String, prompt: String, response: String) -> Self {
        Self {
            timestamp,
            user,
            agent: None,
            prompt,
            response,
        }
    }

    pub fn with_agent(mut self, agent: Option<String>) -> Self {
        self.agent = agent.filter(|a| !a.is_empty());
        self
    }
}

/// Exchanges of the running conversation, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSession {
    exchanges: Vec<ChatExchange>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, exchange: ChatExchange) {
        self.exchanges.push(exchange);
    }

    pub fn exchanges(&self) -> &[ChatExchange] {
        &self.exchanges
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Index shown next to blocks of the upcoming turn (1-based).
    pub fn next_index(&self) -> usize {
        self.exchanges.len() + 1
    }

    /// Drop everything, returning how many exchanges were cleared.
    pub fn clear(&mut self) -> usize {
        let count = self.exchanges.len();
        self.exchanges.clear();
        count
    }
}
