use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use quickscribe_foundation::Notifier;

use crate::capture::CaptureShared;

/// How often the watchdog looks at the capture liveness state.
pub const WATCHDOG_PERIOD: Duration = Duration::from_secs(1);

/// How long without a frame counts as a stalled pipeline.
pub const STALL_THRESHOLD: Duration = Duration::from_secs(2);

/// Periodic liveness check for the capture pipeline. Purely observational:
/// it reads the shared timestamps and counters and publishes an activity
/// line, never touching recording state or the queues. Inert while Idle.
pub struct ActivityWatchdog {
    period: Duration,
    staleness: Duration,
    shared: Arc<CaptureShared>,
    recording_active: Arc<AtomicBool>,
    notifier: Notifier,
}

impl ActivityWatchdog {
    pub fn new(
        shared: Arc<CaptureShared>,
        recording_active: Arc<AtomicBool>,
        notifier: Notifier,
    ) -> Self {
        Self {
            period: WATCHDOG_PERIOD,
            staleness: STALL_THRESHOLD,
            shared,
            recording_active,
            notifier,
        }
    }

    /// Override the fixed timings; used by tests to avoid multi-second
    /// sleeps.
    pub fn with_timing(mut self, period: Duration, staleness: Duration) -> Self {
        self.period = period;
        self.staleness = staleness;
        self
    }

    pub fn spawn(self) -> WatchdogHandle {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::spawn(move || {
            while flag.load(Ordering::SeqCst) {
                thread::sleep(self.period);
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
                if !self.recording_active.load(Ordering::SeqCst) {
                    continue;
                }
                self.tick();
            }
        });

        WatchdogHandle { running, handle }
    }

    fn tick(&self) {
        let last = *self.shared.last_frame.read();
        let Some(last) = last else {
            return;
        };
        let elapsed = last.elapsed();
        if elapsed > self.staleness {
            tracing::warn!(target: "audio", "no audio data for {:?}", elapsed);
            self.notifier.activity(format!(
                "no audio observed for {:.1}s",
                elapsed.as_secs_f32()
            ));
        } else {
            let frames = self.shared.frames_observed.load(Ordering::Relaxed);
            self.notifier.activity(format!("active ({} frames)", frames));
        }
    }
}

pub struct WatchdogHandle {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl WatchdogHandle {
    pub fn stop(self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.handle.join();
    }
}
