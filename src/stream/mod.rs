pub mod decoder;
pub mod interpreter;
pub mod parsers;

pub use decoder::FrameDecoder;
pub use interpreter::{ChunkInterpreter, SequencePart, MAX_OPEN_ENTRIES};
pub use parsers::{parse_event, parse_payload};

use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::StreamError;
use crate::view::{ProgressIndicator, Renderer};

/// Final answer of one streamed turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamOutcome {
    pub content: String,
    pub agent_name: String,
}

type CompleteFn<'a> = Box<dyn FnOnce(&StreamOutcome) + 'a>;
type ErrorFn<'a> = Box<dyn FnOnce(&StreamError) + 'a>;

/// Per-turn settings for [`run`].
#[derive(Default)]
pub struct RunOptions<'a> {
    /// Index shown in every block header of this turn.
    pub sequence_index: Option<usize>,
    on_complete: Option<CompleteFn<'a>>,
    on_error: Option<ErrorFn<'a>>,
}

impl<'a> RunOptions<'a> {
    pub fn new(sequence_index: Option<usize>) -> Self {
        Self {
            sequence_index,
            on_complete: None,
            on_error: None,
        }
    }

    /// Called once when the stream ends normally.
    pub fn on_complete(mut self, f: impl FnOnce(&StreamOutcome) + 'a) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Called once on a read failure or cancellation.
    pub fn on_error(mut self, f: impl FnOnce(&StreamError) + 'a) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

/// Pump a byte stream through the decoder and interpreter until it ends.
///
/// The stream is owned here and dropped exactly once on every exit path,
/// before any callback runs. Malformed frames are absorbed; only read
/// failures and cancellation come back as errors.
pub async fn run<S, B, E, R, P>(
    stream: S,
    renderer: R,
    progress: P,
    options: RunOptions<'_>,
    cancel: &CancellationToken,
) -> Result<StreamOutcome, StreamError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
    R: Renderer,
    P: ProgressIndicator,
{
    let RunOptions {
        sequence_index,
        on_complete,
        on_error,
    } = options;

    let mut stream = Box::pin(stream);
    let mut decoder = FrameDecoder::new();
    let mut interpreter = ChunkInterpreter::new(renderer, progress, sequence_index);
    debug!(?sequence_index, "stream started");

    let result = loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break Err(StreamError::Cancelled),
            next = stream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                for event in decoder.decode(chunk.as_ref()) {
                    interpreter.accept(event);
                }
            }
            Some(Err(error)) => break Err(StreamError::Read(Box::new(error))),
            None => {
                if let Some(event) = decoder.flush() {
                    interpreter.accept(event);
                }
                break Ok(StreamOutcome {
                    content: interpreter.current_content().to_string(),
                    agent_name: interpreter.current_agent_name().to_string(),
                });
            }
        }
    };
    drop(stream);

    match result {
        Ok(outcome) => {
            debug!(chars = outcome.content.len(), agent = %outcome.agent_name, "stream finished");
            if let Some(f) = on_complete {
                f(&outcome);
            }
            Ok(outcome)
        }
        Err(error) => {
            if error.is_cancelled() {
                info!("stream cancelled");
            } else {
                debug!(%error, "stream failed");
            }
            if let Some(f) = on_error {
                f(&error);
            }
            Err(error)
        }
    }
}
