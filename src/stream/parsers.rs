use serde_json::Value;

use crate::error::ParseError;
use crate::model::{SequenceId, StreamEvent, ToolCallId};

/// Prefix carried by event-stream framed lines.
pub const DATA_PREFIX: &str = "data: ";
/// Payload that marks the end of content.
pub const DONE_SENTINEL: &str = "[DONE]";
/// Tag prefix of structured-data events.
pub const STRUCTURED_PREFIX: &str = "data-";

/// Parse one frame payload (prefix already stripped) into an event.
///
/// # Functional Core
/// Pure function - no I/O, just string parsing.
pub fn parse_payload(payload: &str) -> Result<StreamEvent, ParseError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| ParseError::Json(e.to_string()))?;
    parse_event(value)
}

/// Map a decoded JSON object onto the event union by its `type` tag.
/// Unrecognised tags become [`StreamEvent::Unknown`] rather than errors.
pub fn parse_event(value: Value) -> Result<StreamEvent, ParseError> {
    if !value.is_object() {
        return Err(ParseError::NotAnObject);
    }
    let kind = match value.get("type").and_then(Value::as_str) {
        Some(kind) if !kind.is_empty() => kind.to_string(),
        _ => return Err(ParseError::MissingType),
    };

    let event = match kind.as_str() {
        "start" => StreamEvent::SessionStart {
            message_id: str_field(&value, "messageId").map(str::to_string),
        },
        "text-start" => StreamEvent::TextStart {
            id: sequence_id(&value, &kind)?,
            agent_name: agent_name(&value),
        },
        "text-delta" => StreamEvent::TextDelta {
            id: sequence_id(&value, &kind)?,
            delta: required_str(&value, &kind, "delta")?,
        },
        "text-end" => StreamEvent::TextEnd {
            id: sequence_id(&value, &kind)?,
            agent_name: agent_name(&value),
        },
        "reasoning-start" => StreamEvent::ReasoningStart {
            id: sequence_id(&value, &kind)?,
            agent_name: agent_name(&value),
            hint: agent_metadata(&value, "thinking"),
        },
        "reasoning-delta" => StreamEvent::ReasoningDelta {
            id: sequence_id(&value, &kind)?,
            delta: required_str(&value, &kind, "delta")?,
        },
        "reasoning-end" => StreamEvent::ReasoningEnd {
            id: sequence_id(&value, &kind)?,
            agent_name: agent_name(&value),
        },
        "tool-input-available" => StreamEvent::ToolStart {
            tool_call_id: tool_call_id(&value, &kind)?,
            tool_name: required_str(&value, &kind, "toolName")?,
            input: value.get("input").cloned(),
            agent_name: agent_name(&value),
        },
        "tool-output-available" => StreamEvent::ToolEnd {
            tool_call_id: tool_call_id(&value, &kind)?,
            output: value.get("output").cloned(),
        },
        "error" => StreamEvent::Error {
            message: str_field(&value, "errorText")
                .unwrap_or("unknown error")
                .to_string(),
        },
        "abort" => StreamEvent::Abort,
        other => match other.strip_prefix(STRUCTURED_PREFIX) {
            Some(namespace) => StreamEvent::StructuredData {
                namespace: if namespace.is_empty() {
                    "unknown".to_string()
                } else {
                    namespace.to_string()
                },
                payload: value.get("data").cloned(),
            },
            None => StreamEvent::Unknown { raw: value },
        },
    };

    Ok(event)
}

fn str_field<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field).and_then(Value::as_str)
}

fn required_str(value: &Value, kind: &str, field: &'static str) -> Result<String, ParseError> {
    str_field(value, field)
        .map(str::to_string)
        .ok_or_else(|| ParseError::MissingField {
            kind: kind.to_string(),
            field,
        })
}

fn sequence_id(value: &Value, kind: &str) -> Result<SequenceId, ParseError> {
    str_field(value, "id")
        .and_then(SequenceId::parse)
        .ok_or_else(|| ParseError::MissingField {
            kind: kind.to_string(),
            field: "id",
        })
}

fn tool_call_id(value: &Value, kind: &str) -> Result<ToolCallId, ParseError> {
    str_field(value, "toolCallId")
        .and_then(ToolCallId::parse)
        .ok_or_else(|| ParseError::MissingField {
            kind: kind.to_string(),
            field: "toolCallId",
        })
}

/// `providerMetadata.agent.<field>`, strings only.
fn agent_metadata(value: &Value, field: &str) -> Option<String> {
    value
        .get("providerMetadata")
        .and_then(|m| m.get("agent"))
        .and_then(|a| a.get(field))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn agent_name(value: &Value) -> Option<String> {
    agent_metadata(value, "name")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_start_with_agent() {
        let event = parse_payload(
            r#"{"type":"text-start","id":"t1","providerMetadata":{"agent":{"name":"planner"}}}"#,
        )
        .unwrap();
        assert_eq!(event, StreamEvent::text_start("t1", Some("planner")));
    }

    #[test]
    fn test_non_string_agent_name_ignored() {
        let event = parse_payload(
            r#"{"type":"text-start","id":"t1","providerMetadata":{"agent":{"name":7}}}"#,
        )
        .unwrap();
        assert_eq!(event, StreamEvent::text_start("t1", None));
    }

    #[test]
    fn test_parse_reasoning_hint() {
        let event = parse_payload(
            r#"{"type":"reasoning-start","id":"r1","providerMetadata":{"agent":{"name":"a","thinking":"plan first"}}}"#,
        )
        .unwrap();
        match event {
            StreamEvent::ReasoningStart { hint, agent_name, .. } => {
                assert_eq!(hint.as_deref(), Some("plan first"));
                assert_eq!(agent_name.as_deref(), Some("a"));
            }
            other => panic!("Expected ReasoningStart, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_tool_events() {
        let start = parse_payload(
            r#"{"type":"tool-input-available","toolCallId":"c1","toolName":"search","input":{"q":"x"}}"#,
        )
        .unwrap();
        assert_eq!(start, StreamEvent::tool_start("c1", "search", json!({"q": "x"})));

        let end = parse_payload(r#"{"type":"tool-output-available","toolCallId":"c1"}"#).unwrap();
        assert_eq!(
            end,
            StreamEvent::ToolEnd {
                tool_call_id: ToolCallId::new("c1"),
                output: None,
            }
        );

        let null = parse_payload(r#"{"type":"tool-output-available","toolCallId":"c1","output":null}"#)
            .unwrap();
        assert_eq!(null, StreamEvent::tool_end("c1", Value::Null));
    }

    #[test]
    fn test_structured_data_namespace() {
        let event = parse_payload(r#"{"type":"data-weather","data":{"temp":21}}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::StructuredData {
                namespace: "weather".to_string(),
                payload: Some(json!({"temp": 21})),
            }
        );

        let bare = parse_payload(r#"{"type":"data-","data":1}"#).unwrap();
        assert!(matches!(bare, StreamEvent::StructuredData { ref namespace, .. } if namespace == "unknown"));
    }

    #[test]
    fn test_unknown_tag_is_not_an_error() {
        let event = parse_payload(r#"{"type":"finish-step"}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Unknown {
                raw: json!({"type": "finish-step"})
            }
        );
    }

    #[test]
    fn test_frame_errors() {
        assert!(matches!(parse_payload("{oops"), Err(ParseError::Json(_))));
        assert_eq!(parse_payload("[1,2]"), Err(ParseError::NotAnObject));
        assert_eq!(parse_payload(r#"{"id":"t1"}"#), Err(ParseError::MissingType));
        assert_eq!(
            parse_payload(r#"{"type":"text-delta","id":"t1"}"#),
            Err(ParseError::MissingField {
                kind: "text-delta".to_string(),
                field: "delta"
            })
        );
        assert_eq!(
            parse_payload(r#"{"type":"text-end","id":""}"#),
            Err(ParseError::MissingField {
                kind: "text-end".to_string(),
                field: "id"
            })
        );
    }

    #[test]
    fn test_error_and_abort() {
        assert_eq!(
            parse_payload(r#"{"type":"error","errorText":"boom"}"#).unwrap(),
            StreamEvent::Error {
                message: "boom".to_string()
            }
        );
        assert_eq!(parse_payload(r#"{"type":"abort"}"#).unwrap(), StreamEvent::Abort);
    }
}
