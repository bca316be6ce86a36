use super::block::RenderBlock;
use super::progress::ProgressIndicator;
use super::{Notice, Renderer};

/// Renderer that keeps everything in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub blocks: Vec<RenderBlock>,
    pub notices: Vec<Notice>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bodies(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.body.as_str()).collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render_block(&mut self, block: &RenderBlock) {
        self.blocks.push(block.clone());
    }

    fn render_notice(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

/// How a recorded progress indicator finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressOutcome {
    Stopped,
    Succeeded(String),
    Failed(String),
}

/// Progress indicator that only remembers its text and how it ended.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub text: String,
    pub outcome: Option<ProgressOutcome>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressIndicator for RecordingProgress {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    fn append_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn clear_text(&mut self) {
        self.text.clear();
    }

    fn stop(&mut self) {
        self.outcome = Some(ProgressOutcome::Stopped);
    }

    fn success(&mut self, message: &str) {
        self.outcome = Some(ProgressOutcome::Succeeded(message.to_string()));
    }

    fn fail(&mut self, message: &str) {
        self.outcome = Some(ProgressOutcome::Failed(message.to_string()));
    }
}
