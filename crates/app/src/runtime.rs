use crossbeam_channel::Sender;
use std::sync::Arc;

use quickscribe_audio::capture::CaptureShared;
use quickscribe_audio::controller::{ControllerHandle, RecordingController};
use quickscribe_audio::queue::FrameQueue;
use quickscribe_audio::watchdog::ActivityWatchdog;
use quickscribe_audio::WatchdogHandle;
use quickscribe_foundation::{AppError, Notifier};
use quickscribe_stt::worker::{RecognitionWorker, WorkerHandle};
use quickscribe_telemetry::{MetricsSnapshot, PipelineMetrics};
use quickscribe_text::{AggregatorHandle, TextAggregator, TextCommand};
use quickscribe_text_injection::{NoopSink, OutputSink};

use crate::config::AppConfig;

/// Effective settings after merging config file and CLI flags.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub device: Option<String>,
    pub model_path: Option<String>,
    pub inject: bool,
    pub frame_queue_frames: usize,
    pub utterance_queue_len: usize,
}

impl RuntimeOptions {
    pub fn merge(config: AppConfig, device: Option<String>, model: Option<String>, no_inject: bool) -> Self {
        Self {
            device: device.or(config.device),
            model_path: model.or(config.model),
            inject: config.inject && !no_inject,
            frame_queue_frames: config.frame_queue_frames,
            utterance_queue_len: config.utterance_queue_len,
        }
    }
}

/// The wired pipeline: capture controller feeding the frame queue, the
/// recognition worker, the text aggregator, and the watchdog. Owns every
/// worker handle; `shutdown` tears them down in dependency order.
pub struct AppRuntime {
    controller: ControllerHandle,
    worker: WorkerHandle,
    aggregator: AggregatorHandle,
    watchdog: WatchdogHandle,
    commands: Sender<TextCommand>,
    metrics: PipelineMetrics,
}

impl AppRuntime {
    pub fn start(opts: RuntimeOptions, notifier: Notifier) -> Result<Self, AppError> {
        let metrics = PipelineMetrics::new();
        let shared = CaptureShared::new();

        let (frame_tx, frame_rx) = FrameQueue::bounded(opts.frame_queue_frames);
        let (utterance_tx, utterance_rx) = crossbeam_channel::bounded(opts.utterance_queue_len);
        let (command_tx, command_rx) = crossbeam_channel::unbounded();

        let decoder = build_decoder(opts.model_path.as_deref())?;
        let worker = RecognitionWorker::new(
            frame_rx,
            utterance_tx,
            decoder,
            notifier.clone(),
            metrics.clone(),
        )
        .spawn();

        let sink: Box<dyn OutputSink> = if opts.inject {
            quickscribe_text_injection::default_sink()
        } else {
            Box::new(NoopSink::new())
        };
        let aggregator = TextAggregator::new(
            utterance_rx,
            command_rx,
            sink,
            notifier.clone(),
            metrics.clone(),
        )
        .spawn();

        let controller = RecordingController::spawn(
            frame_tx,
            Arc::clone(&shared),
            notifier.clone(),
            metrics.clone(),
            opts.device.clone(),
        )?;

        let watchdog =
            ActivityWatchdog::new(shared, controller.active_flag(), notifier).spawn();

        Ok(Self {
            controller,
            worker,
            aggregator,
            watchdog,
            commands: command_tx,
            metrics,
        })
    }

    pub fn toggle_recording(&self) {
        self.controller.toggle();
    }

    pub fn is_recording(&self) -> bool {
        self.controller.is_active()
    }

    pub fn set_device(&self, name: Option<String>) {
        self.controller.set_device(name);
    }

    pub fn clear_transcript(&self) {
        let _ = self.commands.send(TextCommand::Clear);
    }

    pub fn paste_all(&self) {
        let _ = self.commands.send(TextCommand::PasteAll);
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Ordered teardown: stop capture first (the stream closes and the frame
    /// producer drops), let the worker drain what was already enqueued, then
    /// the aggregator exits on channel disconnect.
    pub fn shutdown(self) {
        self.watchdog.stop();
        self.controller.shutdown();
        self.worker.stop();
        drop(self.commands);
        self.aggregator.join();
        tracing::info!("pipeline shut down ({})", self.metrics.snapshot());
    }
}

#[cfg(feature = "vosk")]
fn build_decoder(
    model_path: Option<&str>,
) -> Result<Box<dyn quickscribe_stt::SpeechDecoder>, AppError> {
    use quickscribe_audio::SAMPLE_RATE_HZ;

    let model_path = quickscribe_stt_vosk::resolve_model_path(model_path);
    let decoder = quickscribe_stt_vosk::VoskDecoder::new(&model_path, SAMPLE_RATE_HZ as f32)?;
    tracing::info!(target: "stt", "loaded Vosk model from '{}'", model_path);
    Ok(Box::new(decoder))
}

#[cfg(not(feature = "vosk"))]
fn build_decoder(
    _model_path: Option<&str>,
) -> Result<Box<dyn quickscribe_stt::SpeechDecoder>, AppError> {
    tracing::warn!(
        target: "stt",
        "built without a recognition backend; audio is consumed but no text is produced"
    );
    Ok(Box::new(quickscribe_stt::NoopDecoder))
}
