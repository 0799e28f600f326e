use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, Stream, StreamConfig};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use quickscribe_foundation::{DeviceError, Notifier};
use quickscribe_telemetry::PipelineMetrics;

use crate::frame::{AudioFrame, FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ};
use crate::queue::FrameSender;
use crate::resampler::{downmix_to_mono, LinearResampler};

/// Liveness state written by the capture callback and read by the watchdog.
/// Reset at every Active entry.
#[derive(Default)]
pub struct CaptureShared {
    /// Frames assembled since the current recording started.
    pub frames_observed: AtomicU64,
    /// When the callback last delivered audio.
    pub last_frame: RwLock<Option<Instant>>,
}

impl CaptureShared {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Zero the counter and restart the activity clock.
    pub fn reset(&self) {
        self.frames_observed.store(0, Ordering::SeqCst);
        *self.last_frame.write() = Some(Instant::now());
    }

    pub fn touch(&self) {
        *self.last_frame.write() = Some(Instant::now());
    }

    pub fn observe_frame(&self) {
        self.frames_observed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Turns whatever the device delivers (any channel count, any rate) into
/// fixed-size mono 16 kHz frames on the frame queue. Lives behind a mutex
/// shared between the capture callback and the controller, so the trailing
/// partial frame can be flushed after the stream is dropped.
pub struct FrameAssembler {
    frames: FrameSender,
    shared: Arc<CaptureShared>,
    metrics: PipelineMetrics,
    channels: u16,
    resampler: Option<LinearResampler>,
    pending: Vec<i16>,
    started: Instant,
    samples_emitted: u64,
}

impl FrameAssembler {
    pub fn new(
        frames: FrameSender,
        shared: Arc<CaptureShared>,
        metrics: PipelineMetrics,
        input_rate: u32,
        channels: u16,
    ) -> Self {
        let resampler =
            (input_rate != SAMPLE_RATE_HZ).then(|| LinearResampler::new(input_rate, SAMPLE_RATE_HZ));
        if resampler.is_some() {
            tracing::info!(
                target: "audio",
                "resampling {} Hz {} ch -> {} Hz mono",
                input_rate,
                channels,
                SAMPLE_RATE_HZ
            );
        }
        Self {
            frames,
            shared,
            metrics,
            channels,
            resampler,
            pending: Vec::with_capacity(FRAME_SIZE_SAMPLES * 2),
            started: Instant::now(),
            samples_emitted: 0,
        }
    }

    /// Called from the capture callback with interleaved i16 samples.
    pub fn push_samples(&mut self, data: &[i16]) {
        self.shared.touch();
        if self.channels > 1 {
            let mono = downmix_to_mono(data, self.channels);
            self.accumulate(&mono);
        } else {
            self.accumulate(data);
        }
    }

    fn accumulate(&mut self, mono: &[i16]) {
        match &mut self.resampler {
            Some(rs) => {
                let resampled = rs.process(mono);
                self.pending.extend_from_slice(&resampled);
            }
            None => self.pending.extend_from_slice(mono),
        }
        while self.pending.len() >= FRAME_SIZE_SAMPLES {
            let samples: Vec<i16> = self.pending.drain(..FRAME_SIZE_SAMPLES).collect();
            self.emit(samples);
        }
    }

    /// Hand the remaining partial frame to the queue. Called once when the
    /// stream closes; short frames are valid at stream boundaries.
    pub fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let samples: Vec<i16> = self.pending.drain(..).collect();
        self.emit(samples);
    }

    fn emit(&mut self, samples: Vec<i16>) {
        // Timestamp from the emitted-sample count, not wall-clock reads per
        // frame, so jitter in callback delivery does not reorder time.
        let elapsed_ms = (self.samples_emitted * 1000) / SAMPLE_RATE_HZ as u64;
        let timestamp = self.started + Duration::from_millis(elapsed_ms);
        self.samples_emitted += samples.len() as u64;

        let evicted = self.frames.push(AudioFrame { samples, timestamp });
        if evicted > 0 {
            self.metrics.add_frames_dropped(evicted as u64);
            tracing::warn!(
                target: "audio",
                "frame queue full; evicted {} oldest frame(s)",
                evicted
            );
        }
        self.metrics.increment_frames_captured();
        self.shared.observe_frame();
    }
}

/// A live cpal input stream bound to one device. Dropping the stream stops
/// the callback; `close` also flushes the assembler's trailing frame.
pub struct CaptureStream {
    stream: Stream,
    assembler: Arc<Mutex<FrameAssembler>>,
    device_name: String,
}

impl CaptureStream {
    pub fn open(
        device: &cpal::Device,
        frames: FrameSender,
        shared: Arc<CaptureShared>,
        metrics: PipelineMetrics,
        notifier: Notifier,
    ) -> Result<Self, DeviceError> {
        let (config, sample_format) = negotiate_config(device)?;
        let device_name = device.name().unwrap_or_else(|_| "<unknown>".to_string());
        tracing::info!(
            target: "audio",
            "opening capture stream on '{}' ({} Hz, {} ch, {:?})",
            device_name,
            config.sample_rate.0,
            config.channels,
            sample_format
        );

        let assembler = Arc::new(Mutex::new(FrameAssembler::new(
            frames,
            shared,
            metrics,
            config.sample_rate.0,
            config.channels,
        )));

        let stream = build_stream(device, &config, sample_format, Arc::clone(&assembler), notifier)?;
        stream.play()?;

        Ok(Self {
            stream,
            assembler,
            device_name,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Stop the callback and flush the partial trailing frame into the
    /// queue. Always completes; cpal stream teardown is drop-based.
    pub fn close(self) {
        drop(self.stream);
        self.assembler.lock().flush();
    }
}

fn negotiate_config(device: &cpal::Device) -> Result<(StreamConfig, SampleFormat), DeviceError> {
    if let Ok(default) = device.default_input_config() {
        return Ok((
            StreamConfig {
                channels: default.channels(),
                sample_rate: default.sample_rate(),
                buffer_size: BufferSize::Default,
            },
            default.sample_format(),
        ));
    }

    // No default config: take the first supported range, at 16 kHz when the
    // range allows it.
    let mut configs = device.supported_input_configs()?;
    if let Some(range) = configs.next() {
        let sample_rate = if range.min_sample_rate().0 <= SAMPLE_RATE_HZ
            && range.max_sample_rate().0 >= SAMPLE_RATE_HZ
        {
            cpal::SampleRate(SAMPLE_RATE_HZ)
        } else {
            range.max_sample_rate()
        };
        return Ok((
            StreamConfig {
                channels: range.channels(),
                sample_rate,
                buffer_size: BufferSize::Default,
            },
            range.sample_format(),
        ));
    }

    Err(DeviceError::FormatNotSupported {
        format: "no supported input configs".to_string(),
    })
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    assembler: Arc<Mutex<FrameAssembler>>,
    notifier: Notifier,
) -> Result<Stream, DeviceError> {
    let err_fn = move |err: cpal::StreamError| {
        tracing::error!(target: "audio", "capture stream error: {}", err);
        notifier.status(format!("audio device error: {}", err));
    };

    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                assembler.lock().push_samples(data);
            },
            err_fn,
            None,
        )?,
        SampleFormat::U16 => {
            let mut scratch: Vec<i16> = Vec::new();
            device.build_input_stream(
                config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    scratch.extend(data.iter().map(|&s| (s as i32 - 32_768) as i16));
                    assembler.lock().push_samples(&scratch);
                },
                err_fn,
                None,
            )?
        }
        SampleFormat::F32 => {
            let mut scratch: Vec<i16> = Vec::new();
            device.build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    scratch.extend(
                        data.iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * 32_767.0).round() as i16),
                    );
                    assembler.lock().push_samples(&scratch);
                },
                err_fn,
                None,
            )?
        }
        SampleFormat::F64 => {
            let mut scratch: Vec<i16> = Vec::new();
            device.build_input_stream(
                config,
                move |data: &[f64], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    scratch.extend(
                        data.iter()
                            .map(|&s| (s.clamp(-1.0, 1.0) * 32_767.0).round() as i16),
                    );
                    assembler.lock().push_samples(&scratch);
                },
                err_fn,
                None,
            )?
        }
        other => {
            return Err(DeviceError::FormatNotSupported {
                format: format!("{:?}", other),
            });
        }
    };

    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::FrameQueue;

    fn assembler_with_queue(
        capacity: usize,
        input_rate: u32,
        channels: u16,
    ) -> (FrameAssembler, crate::queue::FrameReceiver, PipelineMetrics) {
        let (tx, rx) = FrameQueue::bounded(capacity);
        let metrics = PipelineMetrics::new();
        let shared = CaptureShared::new();
        shared.reset();
        (
            FrameAssembler::new(tx, shared, metrics.clone(), input_rate, channels),
            rx,
            metrics,
        )
    }

    #[test]
    fn frames_are_emitted_at_nominal_size() {
        let (mut assembler, rx, metrics) = assembler_with_queue(16, SAMPLE_RATE_HZ, 1);
        // 2.5 nominal frames of input, delivered in uneven chunks.
        let input = vec![7i16; FRAME_SIZE_SAMPLES * 2 + FRAME_SIZE_SAMPLES / 2];
        for chunk in input.chunks(1_234) {
            assembler.push_samples(chunk);
        }
        let frames: Vec<AudioFrame> = rx.try_iter().collect();
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| f.samples.len() == FRAME_SIZE_SAMPLES));
        assert_eq!(metrics.snapshot().frames_captured, 2);
    }

    #[test]
    fn flush_emits_short_trailing_frame() {
        let (mut assembler, rx, _metrics) = assembler_with_queue(16, SAMPLE_RATE_HZ, 1);
        assembler.push_samples(&vec![1i16; FRAME_SIZE_SAMPLES + 100]);
        assembler.flush();
        let frames: Vec<AudioFrame> = rx.try_iter().collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].samples.len(), FRAME_SIZE_SAMPLES);
        assert_eq!(frames[1].samples.len(), 100);
        // Nothing left; flushing again emits nothing.
        assembler.flush();
        assert!(rx.try_iter().next().is_none());
    }

    #[test]
    fn stereo_input_is_downmixed_before_framing() {
        let (mut assembler, rx, _metrics) = assembler_with_queue(16, SAMPLE_RATE_HZ, 2);
        // Interleaved stereo: each L/R pair averages to 500.
        let stereo: Vec<i16> = std::iter::repeat([400i16, 600i16])
            .take(FRAME_SIZE_SAMPLES)
            .flatten()
            .collect();
        assembler.push_samples(&stereo);
        let frame = rx.try_recv().expect("one mono frame");
        assert_eq!(frame.samples.len(), FRAME_SIZE_SAMPLES);
        assert!(frame.samples.iter().all(|&s| s == 500));
    }

    #[test]
    fn overflow_is_counted_against_metrics() {
        let (mut assembler, rx, metrics) = assembler_with_queue(2, SAMPLE_RATE_HZ, 1);
        assembler.push_samples(&vec![0i16; FRAME_SIZE_SAMPLES * 4]);
        assert_eq!(metrics.snapshot().frames_dropped, 2);
        assert_eq!(rx.try_iter().count(), 2);
    }

    #[test]
    fn shared_state_tracks_observed_frames() {
        let (tx, _rx) = FrameQueue::bounded(8);
        let shared = CaptureShared::new();
        shared.reset();
        let mut assembler = FrameAssembler::new(
            tx,
            Arc::clone(&shared),
            PipelineMetrics::new(),
            SAMPLE_RATE_HZ,
            1,
        );
        assembler.push_samples(&vec![0i16; FRAME_SIZE_SAMPLES * 3]);
        assert_eq!(shared.frames_observed.load(Ordering::SeqCst), 3);
        assert!(shared.last_frame.read().is_some());
    }
}
