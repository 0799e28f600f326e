use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use quickscribe_foundation::{DeviceError, Notifier};
use quickscribe_telemetry::PipelineMetrics;

use crate::capture::{CaptureShared, CaptureStream};
use crate::device::DeviceManager;
use crate::queue::FrameSender;

enum Command {
    Toggle,
    SetDevice(Option<String>),
    Shutdown,
}

/// Recording lifecycle state machine: `Idle --toggle--> Active --toggle-->
/// Idle`. Runs on its own thread because cpal streams are not Send; the
/// stream handle never leaves this thread. Device changes while Active
/// restart the stream in place without publishing an intermediate Idle.
pub struct RecordingController {
    devices: DeviceManager,
    stream: Option<CaptureStream>,
    selection: Option<String>,
    frames: FrameSender,
    shared: Arc<CaptureShared>,
    active: Arc<AtomicBool>,
    notifier: Notifier,
    metrics: PipelineMetrics,
}

impl RecordingController {
    pub fn spawn(
        frames: FrameSender,
        shared: Arc<CaptureShared>,
        notifier: Notifier,
        metrics: PipelineMetrics,
        initial_device: Option<String>,
    ) -> Result<ControllerHandle, DeviceError> {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let active = Arc::new(AtomicBool::new(false));
        let active_flag = Arc::clone(&active);

        let handle = thread::Builder::new()
            .name("recording-control".to_string())
            .spawn(move || {
                let mut controller = RecordingController {
                    devices: DeviceManager::new(),
                    stream: None,
                    selection: initial_device,
                    frames,
                    shared,
                    active,
                    notifier,
                    metrics,
                };
                controller.run(cmd_rx);
            })
            .map_err(|e| DeviceError::Thread(format!("failed to spawn control thread: {}", e)))?;

        Ok(ControllerHandle {
            cmd_tx,
            active: active_flag,
            handle,
        })
    }

    fn run(&mut self, cmd_rx: Receiver<Command>) {
        for cmd in cmd_rx.iter() {
            match cmd {
                Command::Toggle => self.toggle(),
                Command::SetDevice(name) => self.change_device(name),
                Command::Shutdown => break,
            }
        }
        // Quit always leaves the controller Idle with the stream closed.
        self.stop();
        tracing::info!(target: "audio", "recording controller stopped");
    }

    fn toggle(&mut self) {
        if self.stream.is_some() {
            self.stop();
            self.notifier.status("Stopped");
        } else {
            self.start();
        }
    }

    /// Enter Active: publish the transition, reset liveness state, then open
    /// the stream. An open failure reverts to Idle immediately, with no
    /// retry.
    fn start(&mut self) {
        self.active.store(true, Ordering::SeqCst);
        self.notifier.recording(true);
        self.shared.reset();

        match self.open_stream() {
            Ok(stream) => {
                tracing::info!(target: "audio", "capture started on '{}'", stream.device_name());
                self.notifier
                    .status(format!("Recording on {}", stream.device_name()));
                self.stream = Some(stream);
            }
            Err(e) => {
                tracing::error!(target: "audio", "failed to start capture: {}", e);
                self.active.store(false, Ordering::SeqCst);
                self.notifier.recording(false);
                self.notifier.status(format!("failed to start recording: {}", e));
            }
        }
    }

    /// Enter Idle: close the stream (flushing the trailing frame) and
    /// publish the transition. Always ends Idle.
    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.close();
            tracing::info!(
                target: "audio",
                "capture stopped ({} frames this session)",
                self.shared.frames_observed.load(Ordering::SeqCst)
            );
        }
        if self.active.swap(false, Ordering::SeqCst) {
            self.notifier.recording(false);
        }
    }

    /// Swap the device selection. While Active this restarts the stream
    /// within the controller thread; the published Active state only drops
    /// if the restart fails. Audio between stop and start is lost.
    fn change_device(&mut self, name: Option<String>) {
        self.selection = name;
        let label = self
            .selection
            .clone()
            .unwrap_or_else(|| "default input".to_string());
        self.notifier.status(format!("input device changed to {}", label));

        if self.stream.is_none() {
            return;
        }

        if let Some(stream) = self.stream.take() {
            stream.close();
        }
        self.shared.reset();
        match self.open_stream() {
            Ok(stream) => {
                tracing::info!(target: "audio", "capture moved to '{}'", stream.device_name());
                self.notifier
                    .status(format!("Recording on {}", stream.device_name()));
                self.stream = Some(stream);
            }
            Err(e) => {
                tracing::error!(target: "audio", "failed to restart capture: {}", e);
                self.active.store(false, Ordering::SeqCst);
                self.notifier.recording(false);
                self.notifier
                    .status(format!("failed to restart recording: {}", e));
            }
        }
    }

    fn open_stream(&mut self) -> Result<CaptureStream, DeviceError> {
        let device = self.devices.open(self.selection.as_deref())?;
        CaptureStream::open(
            &device,
            self.frames.clone(),
            Arc::clone(&self.shared),
            self.metrics.clone(),
            self.notifier.clone(),
        )
    }
}

/// Shell-facing handle. Commands are fire-and-forget; the published Active
/// flag is the observable state.
pub struct ControllerHandle {
    cmd_tx: Sender<Command>,
    active: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ControllerHandle {
    pub fn toggle(&self) {
        let _ = self.cmd_tx.send(Command::Toggle);
    }

    pub fn set_device(&self, name: Option<String>) {
        let _ = self.cmd_tx.send(Command::SetDevice(name));
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn active_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active)
    }

    /// Stop recording if needed and join the control thread.
    pub fn shutdown(self) {
        let _ = self.cmd_tx.send(Command::Shutdown);
        let _ = self.handle.join();
    }
}
