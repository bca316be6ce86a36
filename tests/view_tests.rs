use agent_chat::model::StreamEvent;
use agent_chat::stream::{ChunkInterpreter, FrameDecoder};
use agent_chat::view::{format_body, RecordingProgress, TerminalRenderer};
use serde_json::json;

fn plain_output(wire: &str) -> String {
    let mut decoder = FrameDecoder::new();
    let renderer = TerminalRenderer::new(Vec::new(), false, false);
    let mut interp = ChunkInterpreter::new(renderer, RecordingProgress::new(), Some(1));
    for event in decoder.decode(wire.as_bytes()) {
        interp.accept(event);
    }
    if let Some(event) = decoder.flush() {
        interp.accept(event);
    }
    let (renderer, _) = interp.into_parts();
    String::from_utf8(renderer.into_inner()).unwrap()
}

fn footer() -> String {
    "━".repeat(30)
}

#[test]
fn test_text_block_layout() {
    let out = plain_output(concat!(
        "data: {\"type\":\"text-start\",\"id\":\"t\",\"providerMetadata\":{\"agent\":{\"name\":\"writer\"}}}\n",
        "data: {\"type\":\"text-delta\",\"id\":\"t\",\"delta\":\"not json\"}\n",
        "data: {\"type\":\"text-end\",\"id\":\"t\"}\n",
    ));
    assert_eq!(
        out,
        format!("\n writer  [1] ━━━━━━━━━━ \nnot json\n{}\n", footer())
    );
}

#[test]
fn test_doubly_encoded_body_is_pretty_printed() {
    let body = format_body("\"{\\\"a\\\":1}\"");
    assert_eq!(body.text, "{\n  \"a\": 1\n}");
    assert_eq!(format_body("not json").text, "not json");
}

#[test]
fn test_text_delta_carrying_json_string_renders_pretty() {
    let delta = serde_json::to_string("{\"a\":1}").unwrap();
    let wire = format!(
        "{}\n{}\n{}\n",
        json!({"type": "text-start", "id": "t"}),
        json!({"type": "text-delta", "id": "t", "delta": delta}),
        json!({"type": "text-end", "id": "t"}),
    );
    let out = plain_output(&wire);
    assert!(out.contains("\n{\n  \"a\": 1\n}\n"), "{}", out);
}

#[test]
fn test_tool_blocks_and_orphan_end() {
    let out = plain_output(concat!(
        "{\"type\":\"tool-input-available\",\"toolCallId\":\"c1\",\"toolName\":\"search\",\"input\":{\"q\":\"rust\"}}\n",
        "{\"type\":\"tool-output-available\",\"toolCallId\":\"zz\",\"output\":[1]}\n",
    ));
    assert!(out.contains(" unknown  [1] tool-call: search ━━━━━━━━━━ \n{\n  \"q\": \"rust\"\n}\n"));
    assert!(out.contains(" unknown  [1] tool-end: unknown ━━━━━━━━━━ \n[\n  1\n]\n"));
}

#[test]
fn test_structured_output_uses_namespace_as_label() {
    let out = plain_output("data: {\"type\":\"data-plan\",\"data\":{\"ok\":true}}\n");
    assert!(out.starts_with("\n plan  [1] structured-output ━━━━━━━━━━ \n"));
}

#[test]
fn test_notices_in_stream_order() {
    let out = plain_output(concat!(
        "data: {\"type\":\"start\",\"messageId\":\"m-9\"}\n",
        "data: {\"type\":\"error\",\"errorText\":\"boom\"}\n",
        "data: {\"type\":\"abort\"}\n",
    ));
    assert_eq!(out, "📤 Message ID: m-9\n❌ Error: boom\n⚠️  Stream aborted\n");
}

#[test]
fn test_reasoning_block_is_annotated() {
    let mut interp = ChunkInterpreter::new(
        TerminalRenderer::new(Vec::new(), false, false),
        RecordingProgress::new(),
        None,
    );
    interp.accept(StreamEvent::reasoning_start("r", Some("planner")));
    interp.accept(StreamEvent::reasoning_delta("r", "weighing options"));
    interp.accept(StreamEvent::reasoning_end("r"));

    let (renderer, _) = interp.into_parts();
    let out = String::from_utf8(renderer.into_inner()).unwrap();
    assert_eq!(
        out,
        format!(
            "\n planner  reasoning ━━━━━━━━━━ \nweighing options\n{}\n",
            footer()
        )
    );
}

#[test]
fn test_missing_tool_output_shows_placeholder() {
    let out = plain_output(concat!(
        "{\"type\":\"tool-input-available\",\"toolCallId\":\"c1\",\"toolName\":\"ping\"}\n",
        "{\"type\":\"tool-output-available\",\"toolCallId\":\"c1\"}\n",
    ));
    assert!(out.contains(" unknown  [1] tool-call: ping ━━━━━━━━━━ \nNo message provided\n"));
    assert!(out.contains("tool-end: ping"));
    assert!(!out.contains("null"));
}
