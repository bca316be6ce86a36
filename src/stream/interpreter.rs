use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, trace};

use crate::model::{SequenceId, StreamEvent, ToolCallId};
use crate::view::block::payload_body;
use crate::view::{BlockEvent, Notice, ProgressIndicator, RenderBlock, Renderer};

/// Most entries kept open per kind before the oldest is evicted.
pub const MAX_OPEN_ENTRIES: usize = 256;

const UNKNOWN_AGENT: &str = "unknown";

/// Accumulated content of one open text or reasoning sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePart {
    pub agent_name: String,
    pub content: String,
}

#[derive(Debug, Clone)]
struct ToolRecord {
    tool_name: String,
    started_at: Instant,
}

/// Map of open entries with a hard cap. Inserting past the cap evicts the
/// entry that was opened first.
#[derive(Debug)]
struct OpenEntries<K, V> {
    entries: HashMap<K, (u64, V)>,
    opened: u64,
}

impl<K: Eq + Hash + Clone + std::fmt::Debug, V> OpenEntries<K, V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            opened: 0,
        }
    }

    /// Last start wins: an existing entry under `key` is replaced.
    fn open(&mut self, key: K, value: V) {
        self.opened += 1;
        if !self.entries.contains_key(&key) && self.entries.len() >= MAX_OPEN_ENTRIES {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (opened, _))| *opened)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!(key = ?oldest, "evicting oldest open entry");
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key, (self.opened, value));
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key).map(|(_, v)| v)
    }

    fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(_, v)| v)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.opened = 0;
    }
}

/// Which of the two symmetric sequence kinds an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceKind {
    Text,
    Reasoning,
}

/// State machine turning stream events into rendered blocks.
///
/// One instance per conversation turn. Owns every open sequence and tool
/// call; nothing else touches them. Rendering and progress updates go
/// through the two sinks it is built with.
pub struct ChunkInterpreter<R, P> {
    renderer: R,
    progress: P,
    sequence_index: Option<usize>,
    text_parts: OpenEntries<SequenceId, SequencePart>,
    reasoning_parts: OpenEntries<SequenceId, SequencePart>,
    active_tools: OpenEntries<ToolCallId, ToolRecord>,
    /// Agent of the text sequence feeding `current_content`.
    current_agent_name: String,
    current_content: String,
    /// Text sequence feeding `current_content`; switches on its first
    /// non-empty delta, so an empty trailing sequence keeps the answer.
    current_text_id: Option<SequenceId>,
    /// Last agent a text start announced. Tool blocks fall back to it.
    responding_agent: Option<String>,
}

impl<R: Renderer, P: ProgressIndicator> ChunkInterpreter<R, P> {
    pub fn new(renderer: R, progress: P, sequence_index: Option<usize>) -> Self {
        Self {
            renderer,
            progress,
            sequence_index,
            text_parts: OpenEntries::new(),
            reasoning_parts: OpenEntries::new(),
            active_tools: OpenEntries::new(),
            current_agent_name: String::new(),
            current_content: String::new(),
            current_text_id: None,
            responding_agent: None,
        }
    }

    /// Apply one event. Never fails; protocol anomalies are logged.
    pub fn accept(&mut self, event: StreamEvent) {
        trace!(kind = event.kind(), "accept");
        match event {
            StreamEvent::SessionStart { message_id } => {
                if let Some(id) = message_id.filter(|id| !id.is_empty()) {
                    self.renderer.render_notice(&Notice::MessageId(id));
                }
            }

            StreamEvent::TextStart { id, agent_name } => {
                if let Some(ref name) = agent_name {
                    self.responding_agent = Some(name.clone());
                    self.progress
                        .set_text(&format!("{} is responding...\n", name));
                }
                // A restarted sequence begins a new answer on its next delta.
                if self.current_text_id.as_ref() == Some(&id) {
                    self.current_text_id = None;
                }
                self.open(SequenceKind::Text, id, agent_name);
            }
            StreamEvent::TextDelta { id, delta } => {
                if self.append(SequenceKind::Text, &id, &delta) && !delta.is_empty() {
                    self.accumulate(&id, &delta);
                }
            }
            StreamEvent::TextEnd { id, agent_name } => {
                self.flush(SequenceKind::Text, &id, agent_name);
            }

            StreamEvent::ReasoningStart {
                id,
                agent_name,
                hint,
            } => {
                if let Some(ref name) = agent_name {
                    let mut text = format!("{} is reasoning...\n", name);
                    if let Some(hint) = hint.filter(|h| !h.is_empty()) {
                        text.push_str(&format!("💭 {}\n", hint));
                    }
                    self.progress.set_text(&text);
                }
                self.open(SequenceKind::Reasoning, id, agent_name);
            }
            StreamEvent::ReasoningDelta { id, delta } => {
                self.append(SequenceKind::Reasoning, &id, &delta);
            }
            StreamEvent::ReasoningEnd { id, agent_name } => {
                self.flush(SequenceKind::Reasoning, &id, agent_name);
            }

            StreamEvent::ToolStart {
                tool_call_id,
                tool_name,
                input,
                agent_name,
            } => self.tool_start(tool_call_id, tool_name, input.as_ref(), agent_name),
            StreamEvent::ToolEnd {
                tool_call_id,
                output,
            } => self.tool_end(&tool_call_id, output.as_ref()),

            StreamEvent::StructuredData { namespace, payload } => {
                let block = RenderBlock::new(namespace, payload_body(payload.as_ref()))
                    .with_index(self.sequence_index)
                    .with_event(BlockEvent::StructuredOutput);
                self.renderer.render_block(&block);
            }

            StreamEvent::Error { message } => {
                self.renderer.render_notice(&Notice::Error(message));
            }
            StreamEvent::Abort => {
                self.progress.stop();
                self.renderer.render_notice(&Notice::Aborted);
            }
            StreamEvent::Unknown { raw } => {
                let tag = raw.get("type").and_then(Value::as_str).unwrap_or("");
                debug!(tag, "ignoring unknown event");
            }
        }
    }

    /// Text of the last text sequence that received content.
    pub fn current_content(&self) -> &str {
        &self.current_content
    }

    /// Agent that produced `current_content`; empty before any text arrived.
    pub fn current_agent_name(&self) -> &str {
        &self.current_agent_name
    }

    /// Number of open text sequences, reasoning sequences and tool calls.
    pub fn open_counts(&self) -> (usize, usize, usize) {
        (
            self.text_parts.len(),
            self.reasoning_parts.len(),
            self.active_tools.len(),
        )
    }

    /// Accumulated content of an open text sequence.
    pub fn text_part(&self, id: &SequenceId) -> Option<&SequencePart> {
        self.text_parts.get(id)
    }

    /// Forget all open sequences, tool calls and the session accumulator.
    pub fn reset(&mut self) {
        self.text_parts.clear();
        self.reasoning_parts.clear();
        self.active_tools.clear();
        self.current_agent_name.clear();
        self.current_content.clear();
        self.current_text_id = None;
        self.responding_agent = None;
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }

    pub fn into_parts(self) -> (R, P) {
        (self.renderer, self.progress)
    }

    fn parts_mut(&mut self, kind: SequenceKind) -> &mut OpenEntries<SequenceId, SequencePart> {
        match kind {
            SequenceKind::Text => &mut self.text_parts,
            SequenceKind::Reasoning => &mut self.reasoning_parts,
        }
    }

    fn open(&mut self, kind: SequenceKind, id: SequenceId, agent_name: Option<String>) {
        let part = SequencePart {
            agent_name: agent_name.unwrap_or_else(|| UNKNOWN_AGENT.to_string()),
            content: String::new(),
        };
        self.parts_mut(kind).open(id, part);
    }

    /// Returns false when `id` has no open sequence.
    fn append(&mut self, kind: SequenceKind, id: &SequenceId, delta: &str) -> bool {
        let Some(part) = self.parts_mut(kind).get_mut(id) else {
            debug!(?kind, %id, "delta for unknown sequence");
            return false;
        };
        part.content.push_str(delta);
        self.progress.append_text(delta);
        true
    }

    fn accumulate(&mut self, id: &SequenceId, delta: &str) {
        if self.current_text_id.as_ref() != Some(id) {
            let agent = self
                .text_parts
                .get(id)
                .map(|part| part.agent_name.clone())
                .unwrap_or_else(|| UNKNOWN_AGENT.to_string());
            self.current_content.clear();
            self.current_agent_name = agent;
            self.current_text_id = Some(id.clone());
        }
        self.current_content.push_str(delta);
    }

    fn fallback_agent(&self) -> String {
        self.responding_agent
            .clone()
            .unwrap_or_else(|| UNKNOWN_AGENT.to_string())
    }

    fn flush(&mut self, kind: SequenceKind, id: &SequenceId, agent_name: Option<String>) {
        let Some(part) = self.parts_mut(kind).remove(id) else {
            debug!(?kind, %id, "end for unknown sequence");
            return;
        };
        if part.content.is_empty() {
            return;
        }

        self.progress.clear_text();
        let agent = agent_name.unwrap_or(part.agent_name);
        let block = RenderBlock::new(agent, part.content).with_index(self.sequence_index);
        let block = match kind {
            SequenceKind::Text => block,
            SequenceKind::Reasoning => block.with_event(BlockEvent::Reasoning).muted(),
        };
        self.renderer.render_block(&block);
    }

    fn tool_start(
        &mut self,
        tool_call_id: ToolCallId,
        tool_name: String,
        input: Option<&Value>,
        agent_name: Option<String>,
    ) {
        let agent = agent_name.unwrap_or_else(|| self.fallback_agent());

        self.active_tools.open(
            tool_call_id,
            ToolRecord {
                tool_name: tool_name.clone(),
                started_at: Instant::now(),
            },
        );

        let block = RenderBlock::new(agent, payload_body(input))
            .with_index(self.sequence_index)
            .with_event(BlockEvent::ToolCall(tool_name));
        self.renderer.render_block(&block);
    }

    fn tool_end(&mut self, tool_call_id: &ToolCallId, output: Option<&Value>) {
        let agent = self.fallback_agent();

        let block = RenderBlock::new(agent, payload_body(output)).with_index(self.sequence_index);
        let block = match self.active_tools.remove(tool_call_id) {
            Some(record) => block
                .with_event(BlockEvent::ToolEnd(Some(record.tool_name)))
                .with_duration(record.started_at.elapsed()),
            None => {
                debug!(%tool_call_id, "tool end without matching start");
                block.with_event(BlockEvent::ToolEnd(None))
            }
        };
        self.renderer.render_block(&block);
    }
}
