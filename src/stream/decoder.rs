use tracing::{debug, warn};

use super::parsers::{parse_payload, DATA_PREFIX, DONE_SENTINEL};
use crate::model::StreamEvent;

/// Longest slice of a bad line echoed into the log.
const LOG_PREVIEW_CHARS: usize = 200;

/// Reassembles newline-delimited frames from arbitrarily split byte chunks.
///
/// Holds two carry-over buffers between reads: undecoded bytes of a UTF-8
/// character cut by the chunk boundary, and the text of the last incomplete
/// line. Malformed lines are logged and dropped; `decode` never fails.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: String,
    pending_bytes: Vec<u8>,
}

enum LineOutcome {
    Event(StreamEvent),
    Skip,
    Done,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and drain every event completed by it.
    pub fn decode(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.push_utf8(bytes);

        let Some(split) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(split + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        let mut events = Vec::new();
        for line in complete.split('\n') {
            match decode_line(line, true) {
                LineOutcome::Event(event) => events.push(event),
                LineOutcome::Skip => {}
                // End of content: the rest of this chunk is not looked at.
                LineOutcome::Done => break,
            }
        }
        events
    }

    /// Called once the source signals end-of-data. Parses whatever fragment
    /// is left as one last frame; failures are discarded quietly.
    pub fn flush(&mut self) -> Option<StreamEvent> {
        if !self.pending_bytes.is_empty() {
            let tail = std::mem::take(&mut self.pending_bytes);
            self.buffer.push_str(&String::from_utf8_lossy(&tail));
        }
        let fragment = std::mem::take(&mut self.buffer);
        match decode_line(&fragment, false) {
            LineOutcome::Event(event) => Some(event),
            LineOutcome::Skip | LineOutcome::Done => None,
        }
    }

    /// True when no partial frame is being held.
    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty() && self.pending_bytes.is_empty()
    }

    fn push_utf8(&mut self, bytes: &[u8]) {
        let mut input = std::mem::take(&mut self.pending_bytes);
        input.extend_from_slice(bytes);

        let mut rest: &[u8] = &input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    return;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    self.buffer.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        // Truncated character: wait for the next chunk.
                        None => {
                            self.pending_bytes = after.to_vec();
                            return;
                        }
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                    }
                }
            }
        }
    }
}

fn decode_line(line: &str, log_failures: bool) -> LineOutcome {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineOutcome::Skip;
    }

    let payload = trimmed
        .strip_prefix(DATA_PREFIX)
        .map(str::trim)
        .unwrap_or(trimmed);

    if payload == DONE_SENTINEL {
        return LineOutcome::Done;
    }
    if !payload.starts_with('{') {
        debug!(line = %preview(trimmed), "skipping non-JSON line");
        return LineOutcome::Skip;
    }

    match parse_payload(payload) {
        Ok(event) => LineOutcome::Event(event),
        Err(error) => {
            if log_failures {
                warn!(%error, line = %preview(trimmed), "dropping malformed frame");
            } else {
                debug!(%error, "discarding trailing fragment");
            }
            LineOutcome::Skip
        }
    }
}

fn preview(line: &str) -> String {
    line.chars().take(LOG_PREVIEW_CHARS).collect()
}
