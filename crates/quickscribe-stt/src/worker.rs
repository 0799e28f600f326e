use crossbeam_channel::{RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use quickscribe_audio::frame::AudioFrame;
use quickscribe_audio::queue::FrameReceiver;
use quickscribe_foundation::{DecodeError, Notifier};
use quickscribe_telemetry::PipelineMetrics;

use crate::types::RecognitionEvent;
use crate::SpeechDecoder;

/// Poll interval when the frame queue is empty. Short enough that stop
/// requests are noticed promptly, long enough not to burn a core.
pub const IDLE_BACKOFF: Duration = Duration::from_millis(50);

/// Upper bound on processing already-queued frames after a stop request.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Sole consumer of the frame queue. Drives the decoder strictly in frame
/// arrival order: finals go onto the utterance queue, partials go straight
/// to the display, and a decode error on one frame never stops the loop.
pub struct RecognitionWorker {
    frames: FrameReceiver,
    utterances: Sender<String>,
    decoder: Box<dyn SpeechDecoder>,
    notifier: Notifier,
    metrics: PipelineMetrics,
}

impl RecognitionWorker {
    pub fn new(
        frames: FrameReceiver,
        utterances: Sender<String>,
        decoder: Box<dyn SpeechDecoder>,
        notifier: Notifier,
        metrics: PipelineMetrics,
    ) -> Self {
        Self {
            frames,
            utterances,
            decoder,
            notifier,
            metrics,
        }
    }

    pub fn spawn(self) -> WorkerHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::spawn(move || self.run(flag));
        WorkerHandle { stop, handle }
    }

    fn run(mut self, stop: Arc<AtomicBool>) {
        tracing::info!(target: "stt", "recognition worker started");
        loop {
            if stop.load(Ordering::SeqCst) {
                self.drain();
                break;
            }
            match self.frames.recv_timeout(IDLE_BACKOFF) {
                Ok(frame) => self.process(frame),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        let snap = self.metrics.snapshot();
        tracing::info!(
            target: "stt",
            "recognition worker stopped ({} partials, {} finals, {} errors)",
            snap.partial_count,
            snap.final_count,
            snap.decode_errors
        );
    }

    /// Finish frames enqueued before the stop, but never block shutdown
    /// past the drain deadline.
    fn drain(&mut self) {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        while Instant::now() < deadline {
            match self.frames.try_recv() {
                Ok(frame) => self.process(frame),
                Err(_) => return,
            }
        }
        let discarded = self.frames.try_iter().count();
        if discarded > 0 {
            tracing::warn!(
                target: "stt",
                "drain deadline reached; discarded {} queued frames",
                discarded
            );
        }
    }

    fn process(&mut self, frame: AudioFrame) {
        match self.classify(&frame) {
            Ok(Some(RecognitionEvent::Final(text))) => {
                self.metrics.increment_finals();
                tracing::info!(target: "stt", "final: {}", text);
                if self.utterances.send(text).is_err() {
                    tracing::warn!(target: "stt", "utterance channel closed; dropping final");
                }
                // The finished utterance supersedes whatever partial was
                // showing.
                self.notifier.partial("");
            }
            Ok(Some(RecognitionEvent::Partial(text))) => {
                self.metrics.increment_partials();
                tracing::debug!(target: "stt", "partial: {}", text);
                self.notifier.partial(text);
            }
            Ok(None) => {}
            Err(e) => {
                self.metrics.increment_decode_errors();
                tracing::error!(target: "stt", "decode error: {}", e);
                self.notifier.status(format!("recognition error: {}", e));
            }
        }
    }

    /// Feed one frame and classify the decoder's answer. Empty results are
    /// dropped here so nothing downstream sees blank text.
    fn classify(&mut self, frame: &AudioFrame) -> Result<Option<RecognitionEvent>, DecodeError> {
        if self.decoder.feed(&frame.samples)? {
            let text = self.decoder.result();
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| RecognitionEvent::Final(trimmed.to_string())))
        } else {
            let text = self.decoder.partial();
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| RecognitionEvent::Partial(trimmed.to_string())))
        }
    }
}

pub struct WorkerHandle {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl WorkerHandle {
    /// Request stop and wait. Frames already enqueued are processed first,
    /// bounded by [`DRAIN_TIMEOUT`].
    pub fn stop(self) {
        self.stop.store(true, Ordering::SeqCst);
        let _ = self.handle.join();
    }
}
