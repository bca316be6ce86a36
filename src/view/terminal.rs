use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use tracing::debug;

use super::block::{RenderBlock, Tone};
use super::syntax::highlight_json;
use super::{Notice, Renderer};
use crate::model::Theme;

const HEADER_RULE: &str = " ━━━━━━━━━━ ";
const FOOTER_WIDTH: usize = 30;

/// Applies colors when enabled, passes text through untouched otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    pub color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn fg(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.color {
            text.dim().to_string()
        } else {
            text.to_string()
        }
    }

    /// White text on a colored background.
    pub fn label(&self, text: &str, bg: Color) -> String {
        if self.color {
            text.with(Theme::LABEL_TEXT).on(bg).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Writes blocks and notices to a terminal (or any writer).
pub struct TerminalRenderer<W: Write> {
    out: W,
    painter: Painter,
    /// Clear the progress line before writing.
    interactive: bool,
}

impl TerminalRenderer<Stdout> {
    pub fn stdout(color: bool, interactive: bool) -> Self {
        Self::new(io::stdout(), color, interactive)
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, color: bool, interactive: bool) -> Self {
        Self {
            out,
            painter: Painter::new(color),
            interactive,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Full block text: header, body, footer.
    pub fn block_text(&self, block: &RenderBlock) -> String {
        let style = Theme::agent_style(&block.agent);
        let painter = self.painter;

        let label = painter.label(&format!(" {} ", block.agent), style.bg);
        let tail = painter.fg(&block.header_tail(), Theme::MUTED_TEXT);
        let rule = painter.fg(HEADER_RULE, style.fg);

        let body = block.formatted_body();
        let content = match block.tone {
            Tone::Muted => painter.dim(&body.text),
            Tone::Normal if body.is_json && painter.color => {
                highlight_json(&body.text).unwrap_or_else(|| painter.fg(&body.text, style.fg))
            }
            Tone::Normal => painter.fg(&body.text, style.fg),
        };
        let footer = painter.fg(&"━".repeat(FOOTER_WIDTH), style.fg);

        format!("\n{}{}{}\n{}\n{}\n", label, tail, rule, content, footer)
    }

    pub fn notice_text(&self, notice: &Notice) -> String {
        match notice {
            Notice::MessageId(id) => self.painter.dim(&format!("📤 Message ID: {}", id)),
            Notice::Error(message) => self
                .painter
                .fg(&format!("❌ Error: {}", message), Theme::ERROR),
            Notice::Aborted => self.painter.fg("⚠️  Stream aborted", Theme::WARNING),
        }
    }

    /// One `write_all` per call: `Stdout` holds its lock for the whole
    /// buffer, so a spinner frame cannot land between the clear and the text.
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        let mut buf = Vec::with_capacity(text.len() + 16);
        if self.interactive {
            queue!(buf, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
        }
        buf.extend_from_slice(text.as_bytes());
        self.out.write_all(&buf)?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_block(&mut self, block: &RenderBlock) {
        let text = self.block_text(block);
        if let Err(error) = self.write_text(&text) {
            debug!(%error, "terminal write failed");
        }
    }

    fn render_notice(&mut self, notice: &Notice) {
        let text = format!("{}\n", self.notice_text(notice));
        if let Err(error) = self.write_text(&text) {
            debug!(%error, "terminal write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::block::BlockEvent;
    use std::time::Duration;

    fn plain() -> TerminalRenderer<Vec<u8>> {
        TerminalRenderer::new(Vec::new(), false, false)
    }

    #[test]
    fn plain_block_layout() {
        let mut renderer = plain();
        let block = RenderBlock::new("researcher", r#"{"n":1}"#)
            .with_index(Some(2))
            .with_event(BlockEvent::ToolEnd(Some("search".into())))
            .with_duration(Duration::from_millis(20));
        renderer.render_block(&block);

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        let footer = "━".repeat(FOOTER_WIDTH);
        assert_eq!(
            out,
            format!(
                "\n researcher  [2] tool-end: search (20ms) ━━━━━━━━━━ \n{{\n  \"n\": 1\n}}\n{}\n",
                footer
            )
        );
    }

    #[test]
    fn plain_notices() {
        let mut renderer = plain();
        renderer.render_notice(&Notice::MessageId("m-1".into()));
        renderer.render_notice(&Notice::Error("boom".into()));
        renderer.render_notice(&Notice::Aborted);

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(
            out,
            "📤 Message ID: m-1\n❌ Error: boom\n⚠️  Stream aborted\n"
        );
    }

    #[test]
    fn colored_block_carries_escapes() {
        let renderer = TerminalRenderer::new(Vec::new(), true, false);
        let text = renderer.block_text(&RenderBlock::new("planner", "plan"));
        assert!(text.contains("\x1b["));
        assert!(text.contains("plan"));
    }

    #[test]
    fn interactive_clears_line_first() {
        let mut renderer = TerminalRenderer::new(Vec::new(), false, true);
        renderer.render_notice(&Notice::Aborted);
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.starts_with("\x1b["));
    }

    /// Records every `write` call separately.
    #[derive(Default)]
    struct WriteLog(Vec<Vec<u8>>);

    impl Write for WriteLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn interactive_clear_and_text_go_out_in_one_write() {
        let mut renderer = TerminalRenderer::new(WriteLog::default(), false, true);
        renderer.render_notice(&Notice::Aborted);
        let log = renderer.into_inner();
        assert_eq!(log.0.len(), 1);
        let written = String::from_utf8(log.0[0].clone()).unwrap();
        assert!(written.starts_with("\x1b["));
        assert!(written.ends_with("⚠️  Stream aborted\n"));
    }
}
