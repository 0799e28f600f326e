//! End-to-end tests for the recognition worker + text aggregator pair,
//! driven by a scripted decoder and a recording sink instead of live audio
//! and a real injection backend.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use quickscribe_audio::frame::AudioFrame;
use quickscribe_audio::queue::{FrameQueue, FrameSender};
use quickscribe_foundation::{notification_channel, DispatchError, Notification};
use quickscribe_stt::worker::RecognitionWorker;
use quickscribe_stt::{ScriptStep, ScriptedDecoder};
use quickscribe_telemetry::PipelineMetrics;
use quickscribe_text::{TextAggregator, TextCommand};
use quickscribe_text_injection::OutputSink;

#[derive(Clone, Default)]
struct RecordingSink {
    injected: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn injected(&self) -> Vec<String> {
        self.injected.lock().unwrap().clone()
    }
}

impl OutputSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn inject(&mut self, text: &str) -> Result<(), DispatchError> {
        self.injected.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn copy(&mut self, text: &str) -> Result<(), DispatchError> {
        self.injected.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct Pipeline {
    frame_tx: FrameSender,
    command_tx: crossbeam_channel::Sender<TextCommand>,
    notifications: Receiver<Notification>,
    sink: RecordingSink,
    metrics: PipelineMetrics,
    worker: quickscribe_stt::WorkerHandle,
    aggregator: quickscribe_text::AggregatorHandle,
}

impl Pipeline {
    fn start(steps: Vec<ScriptStep>) -> Self {
        let (frame_tx, frame_rx) = FrameQueue::bounded(128);
        let (utterance_tx, utterance_rx) = crossbeam_channel::bounded(64);
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (notifier, notifications) = notification_channel();
        let metrics = PipelineMetrics::new();
        let sink = RecordingSink::default();

        let worker = RecognitionWorker::new(
            frame_rx,
            utterance_tx,
            Box::new(ScriptedDecoder::new(steps)),
            notifier.clone(),
            metrics.clone(),
        )
        .spawn();
        let aggregator = TextAggregator::new(
            utterance_rx,
            command_rx,
            Box::new(sink.clone()),
            notifier,
            metrics.clone(),
        )
        .spawn();

        Self {
            frame_tx,
            command_tx,
            notifications,
            sink,
            metrics,
            worker,
            aggregator,
        }
    }

    fn push_frames(&self, count: usize) {
        for _ in 0..count {
            self.frame_tx.push(AudioFrame {
                samples: vec![0i16; 160],
                timestamp: Instant::now(),
            });
        }
    }

    fn wait_for_transcript(&self, expected: &str) {
        let deadline = Duration::from_secs(3);
        loop {
            match self.notifications.recv_timeout(deadline) {
                Ok(Notification::Transcript(t)) if t == expected => return,
                Ok(_) => continue,
                Err(e) => panic!("transcript '{}' never arrived: {}", expected, e),
            }
        }
    }

    /// Tear everything down and return what was injected.
    fn finish(self) -> (Vec<String>, PipelineMetrics) {
        self.worker.stop();
        drop(self.frame_tx);
        drop(self.command_tx);
        self.aggregator.join();
        (self.sink.injected(), self.metrics)
    }
}

#[test]
fn utterances_reach_the_sink_in_fifo_order_despite_jitter() {
    let words = ["alpha", "bravo", "charlie", "delta", "echo"];
    let steps: Vec<ScriptStep> = words
        .iter()
        .map(|w| ScriptStep::Final((*w).to_string()))
        .collect();
    let pipeline = Pipeline::start(steps);

    // Uneven pacing between frames; ordering must not depend on timing.
    for (i, _) in words.iter().enumerate() {
        pipeline.push_frames(1);
        if i % 2 == 0 {
            std::thread::sleep(Duration::from_millis(15));
        }
    }
    pipeline.wait_for_transcript("alpha bravo charlie delta echo");

    let (injected, metrics) = pipeline.finish();
    assert_eq!(
        injected,
        vec!["alpha ", "bravo ", "charlie ", "delta ", "echo "]
    );
    assert_eq!(metrics.snapshot().final_count, 5);
    assert_eq!(metrics.snapshot().utterances_merged, 5);
}

#[test]
fn partials_update_the_display_but_never_the_transcript() {
    let pipeline = Pipeline::start(vec![
        ScriptStep::Partial("hel".to_string()),
        ScriptStep::Partial("hello wor".to_string()),
        ScriptStep::Final("hello world".to_string()),
    ]);
    pipeline.push_frames(3);
    pipeline.wait_for_transcript("hello world");

    let (injected, metrics) = pipeline.finish();
    assert_eq!(injected, vec!["hello world "]);
    assert_eq!(metrics.snapshot().partial_count, 2);
}

#[test]
fn sentence_merge_rules_hold_end_to_end() {
    let pipeline = Pipeline::start(vec![
        ScriptStep::Final("This is a test.".to_string()),
        ScriptStep::Final("next sentence".to_string()),
        ScriptStep::Final("more words".to_string()),
    ]);
    pipeline.push_frames(3);
    pipeline.wait_for_transcript("This is a test. Next sentence more words");

    let (injected, _) = pipeline.finish();
    assert_eq!(
        injected,
        vec!["This is a test. ", "Next sentence ", "more words "]
    );
}

#[test]
fn decode_errors_are_isolated_from_surrounding_utterances() {
    let pipeline = Pipeline::start(vec![
        ScriptStep::Final("before".to_string()),
        ScriptStep::Error("transient decoder fault".to_string()),
        ScriptStep::Final("after".to_string()),
    ]);
    pipeline.push_frames(3);
    pipeline.wait_for_transcript("before after");

    let (injected, metrics) = pipeline.finish();
    assert_eq!(injected, vec!["before ", "after "]);
    assert_eq!(metrics.snapshot().decode_errors, 1);
}

#[test]
fn clear_mid_stream_only_affects_the_transcript() {
    let pipeline = Pipeline::start(vec![
        ScriptStep::Final("first".to_string()),
        ScriptStep::Final("second".to_string()),
    ]);
    pipeline.push_frames(1);
    pipeline.wait_for_transcript("first");

    pipeline.command_tx.send(TextCommand::Clear).unwrap();
    let deadline = Duration::from_secs(3);
    loop {
        match pipeline.notifications.recv_timeout(deadline) {
            Ok(Notification::Status(s)) if s == "transcript cleared" => break,
            Ok(_) => continue,
            Err(e) => panic!("clear confirmation never arrived: {}", e),
        }
    }

    pipeline.push_frames(1);
    // The post-clear utterance starts a fresh transcript.
    pipeline.wait_for_transcript("second");

    let (injected, _) = pipeline.finish();
    assert_eq!(injected, vec!["first ", "second "]);
}

#[test]
fn paste_all_replays_the_accumulated_transcript() {
    let pipeline = Pipeline::start(vec![
        ScriptStep::Final("one.".to_string()),
        ScriptStep::Final("two".to_string()),
    ]);
    pipeline.push_frames(2);
    pipeline.wait_for_transcript("one. Two");

    pipeline.command_tx.send(TextCommand::PasteAll).unwrap();
    let deadline = Duration::from_secs(3);
    loop {
        match pipeline.notifications.recv_timeout(deadline) {
            Ok(Notification::Status(s)) if s == "transcript pasted at cursor" => break,
            Ok(_) => continue,
            Err(e) => panic!("paste-all confirmation never arrived: {}", e),
        }
    }

    let (injected, _) = pipeline.finish();
    assert_eq!(injected, vec!["one. ", "Two ", "one. Two"]);
}
