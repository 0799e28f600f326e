use crossbeam_channel::Receiver;
use std::thread::{self, JoinHandle};

use quickscribe_foundation::Notifier;
use quickscribe_telemetry::PipelineMetrics;
use quickscribe_text_injection::OutputSink;

use crate::transcript::TranscriptBuffer;

/// Shell-issued operations on the transcript, handled on the aggregator
/// thread so transcript ownership stays in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCommand {
    /// Reset the transcript to empty. Queued utterances are unaffected.
    Clear,
    /// Inject the entire current transcript as one batch.
    PasteAll,
}

/// Sole consumer of the utterance queue and exclusive owner of the
/// transcript. Merges each finalized utterance, dispatches the newly
/// appended fragment to the output sink, and publishes preview snapshots.
pub struct TextAggregator {
    utterances: Receiver<String>,
    commands: Receiver<TextCommand>,
    transcript: TranscriptBuffer,
    sink: Box<dyn OutputSink>,
    notifier: Notifier,
    metrics: PipelineMetrics,
}

impl TextAggregator {
    pub fn new(
        utterances: Receiver<String>,
        commands: Receiver<TextCommand>,
        sink: Box<dyn OutputSink>,
        notifier: Notifier,
        metrics: PipelineMetrics,
    ) -> Self {
        Self {
            utterances,
            commands,
            transcript: TranscriptBuffer::new(),
            sink,
            notifier,
            metrics,
        }
    }

    pub fn spawn(self) -> AggregatorHandle {
        let handle = thread::spawn(move || self.run());
        AggregatorHandle { handle }
    }

    fn run(mut self) {
        tracing::info!(target: "text", "aggregator started (sink: {})", self.sink.name());
        // Local receiver handles so select does not hold a borrow of self
        // across the arm bodies.
        let utterances = self.utterances.clone();
        let commands = self.commands.clone();
        loop {
            crossbeam_channel::select! {
                recv(utterances) -> msg => match msg {
                    Ok(utterance) => self.merge(utterance),
                    // Producer gone; buffered utterances were already
                    // delivered ahead of the disconnect.
                    Err(_) => break,
                },
                recv(commands) -> msg => match msg {
                    Ok(command) => self.handle_command(command),
                    Err(_) => break,
                },
            }
        }
        tracing::info!(target: "text", "aggregator stopped");
    }

    fn merge(&mut self, utterance: String) {
        let fragment = self.transcript.merge(&utterance);
        self.metrics.increment_utterances_merged();

        // Trailing space so consecutive fragments read naturally at the
        // cursor without retyping history.
        if let Err(e) = self.sink.inject(&format!("{} ", fragment)) {
            // The text still counts as spoken; only delivery failed.
            self.metrics.increment_dispatch_errors();
            tracing::warn!(target: "text", "dispatch failed: {}", e);
            self.notifier.status(format!("text injection failed: {}", e));
        }

        self.notifier.transcript(self.transcript.as_str());
    }

    fn handle_command(&mut self, command: TextCommand) {
        match command {
            TextCommand::Clear => {
                self.transcript.clear();
                self.notifier.transcript("");
                self.notifier.partial("");
                self.notifier.status("transcript cleared");
            }
            TextCommand::PasteAll => {
                if self.transcript.is_empty() {
                    self.notifier.status("no text to paste");
                    return;
                }
                match self.sink.inject(self.transcript.as_str()) {
                    Ok(()) => self.notifier.status("transcript pasted at cursor"),
                    Err(e) => {
                        self.metrics.increment_dispatch_errors();
                        tracing::warn!(target: "text", "paste all failed: {}", e);
                        self.notifier.status(format!("paste all failed: {}", e));
                    }
                }
            }
        }
    }
}

pub struct AggregatorHandle {
    handle: JoinHandle<()>,
}

impl AggregatorHandle {
    /// Wait for the aggregator to exit; it does so once the utterance or
    /// command channel disconnects.
    pub fn join(self) {
        let _ = self.handle.join();
    }
}
