//! The output channel: an append/replace text log owned by a single display task.
//!
//! All writers hold an [`OutputHandle`] (or a sample-scoped [`SampleOutput`])
//! and send messages over one unbounded queue, so writes are applied one at a
//! time and in the order each writer produced them.

use crate::core::cancel::{CancelToken, GenerationCounter};
use crate::domain::ports::{DisplaySurface, OutputEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    text: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_line(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(line);
    }

    pub fn replace_last_line(&mut self, line: &str) {
        let start = self.last_line_start();
        self.text.truncate(start);
        self.text.push_str(line);
    }

    /// Index right after the last line break, or 0 when there is none.
    pub fn last_line_start(&self) -> usize {
        self.text.rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn apply(&mut self, event: &OutputEvent) {
        match event {
            OutputEvent::Append(line) => self.append_line(line),
            OutputEvent::ReplaceLast(line) => self.replace_last_line(line),
            OutputEvent::Clear => self.clear(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> Vec<String> {
        if self.text.is_empty() {
            return Vec::new();
        }
        self.text.split('\n').map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

enum Message {
    Write {
        generation: Option<u64>,
        event: OutputEvent,
    },
    Sync(oneshot::Sender<()>),
}

/// Handle used by the dispatcher and the screen. Writes are never filtered.
#[derive(Clone)]
pub struct OutputHandle {
    tx: mpsc::UnboundedSender<Message>,
    buffer: Arc<Mutex<OutputBuffer>>,
}

impl OutputHandle {
    /// Starts the display task. Sample writes stamped with a generation other
    /// than `live`'s current one are discarded.
    pub fn spawn<D: DisplaySurface>(display: D, live: GenerationCounter) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let buffer = Arc::new(Mutex::new(OutputBuffer::new()));
        let task = tokio::spawn(display_loop(rx, Arc::clone(&buffer), display, live));
        (Self { tx, buffer }, task)
    }

    pub fn append_line(&self, line: impl Into<String>) {
        self.write(None, OutputEvent::Append(line.into()));
    }

    pub fn replace_last_line(&self, line: impl Into<String>) {
        self.write(None, OutputEvent::ReplaceLast(line.into()));
    }

    pub fn clear(&self) {
        self.write(None, OutputEvent::Clear);
    }

    fn write(&self, generation: Option<u64>, event: OutputEvent) {
        if self.tx.send(Message::Write { generation, event }).is_err() {
            tracing::debug!("output channel closed, write dropped");
        }
    }

    /// A writer bound to one sample run.
    pub fn scoped(&self, token: &CancelToken) -> SampleOutput {
        SampleOutput {
            handle: self.clone(),
            token: token.clone(),
        }
    }

    /// Resolves once every write sent before this call has been applied.
    pub async fn sync(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Message::Sync(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    pub fn snapshot(&self) -> OutputBuffer {
        self.buffer.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.buffer.lock().lines()
    }
}

/// Writer handed to a running sample; goes quiet once the sample is cancelled.
#[derive(Clone)]
pub struct SampleOutput {
    handle: OutputHandle,
    token: CancelToken,
}

impl SampleOutput {
    pub fn append_line(&self, line: impl Into<String>) {
        self.write(OutputEvent::Append(line.into()));
    }

    pub fn replace_last_line(&self, line: impl Into<String>) {
        self.write(OutputEvent::ReplaceLast(line.into()));
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    fn write(&self, event: OutputEvent) {
        if self.token.is_cancelled() {
            return;
        }
        self.handle.write(Some(self.token.generation()), event);
    }
}

async fn display_loop<D: DisplaySurface>(
    mut rx: mpsc::UnboundedReceiver<Message>,
    buffer: Arc<Mutex<OutputBuffer>>,
    mut display: D,
    live: GenerationCounter,
) {
    while let Some(message) = rx.recv().await {
        match message {
            Message::Write { generation, event } => {
                if let Some(generation) = generation {
                    if !live.is_current(generation) {
                        tracing::trace!(generation, "dropping write from cancelled sample");
                        continue;
                    }
                }
                buffer.lock().apply(&event);
                display.render(&event);
            }
            Message::Sync(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("output channel closed");
}
