pub mod block;
pub mod format;
pub mod progress;
pub mod record;
pub mod syntax;
pub mod terminal;

pub use block::{format_body, BlockEvent, FormattedBody, RenderBlock, Tone};
pub use progress::{ProgressIndicator, Spinner};
pub use record::{RecordingProgress, RecordingRenderer};
pub use terminal::{Painter, TerminalRenderer};

/// One-line messages that are not sequence flushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MessageId(String),
    Error(String),
    Aborted,
}

/// Sink for everything the chunk interpreter shows the user.
/// Writes are fire-and-forget; a failing terminal is not the caller's problem.
pub trait Renderer {
    fn render_block(&mut self, block: &RenderBlock);
    fn render_notice(&mut self, notice: &Notice);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn render_block(&mut self, block: &RenderBlock) {
        (**self).render_block(block);
    }

    fn render_notice(&mut self, notice: &Notice) {
        (**self).render_notice(notice);
    }
}
