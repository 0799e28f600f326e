use std::time::{Duration, Instant};

use quickscribe_audio::capture::CaptureShared;
use quickscribe_audio::controller::RecordingController;
use quickscribe_audio::device::DeviceManager;
use quickscribe_audio::queue::FrameQueue;
use quickscribe_foundation::{notification_channel, Notification};
use quickscribe_telemetry::PipelineMetrics;

fn has_input_hardware() -> bool {
    let manager = DeviceManager::new();
    manager.default_input_name().is_some() || !manager.input_device_names().is_empty()
}

fn wait_for<F: FnMut() -> bool>(mut cond: F, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    cond()
}

#[test]
fn even_toggle_count_returns_to_idle() {
    if !has_input_hardware() {
        eprintln!("skipping even_toggle_count_returns_to_idle: no input devices");
        return;
    }

    let (frame_tx, _frame_rx) = FrameQueue::bounded(64);
    let shared = CaptureShared::new();
    let (notifier, _rx) = notification_channel();
    let handle = RecordingController::spawn(
        frame_tx,
        shared,
        notifier,
        PipelineMetrics::new(),
        None,
    )
    .expect("spawn controller");

    handle.toggle();
    assert!(wait_for(|| handle.is_active(), Duration::from_secs(3)));
    handle.toggle();
    assert!(wait_for(|| !handle.is_active(), Duration::from_secs(3)));
    handle.toggle();
    handle.toggle();
    assert!(wait_for(|| !handle.is_active(), Duration::from_secs(3)));

    handle.shutdown();
}

#[test]
fn open_failure_reverts_to_idle_with_report() {
    let (frame_tx, _frame_rx) = FrameQueue::bounded(64);
    let shared = CaptureShared::new();
    let (notifier, rx) = notification_channel();
    // A device name that cannot exist forces the open-failure path even on
    // machines with working microphones.
    let handle = RecordingController::spawn(
        frame_tx,
        shared,
        notifier,
        PipelineMetrics::new(),
        Some("quickscribe-test-nonexistent-device".to_string()),
    )
    .expect("spawn controller");

    handle.toggle();

    // Wait for the open failure to be reported rather than polling the
    // active flag, which is false both before and after the attempt.
    let mut notifications: Vec<Notification> = Vec::new();
    let failed = wait_for(
        || {
            notifications.extend(rx.try_iter());
            notifications.iter().any(|n| matches!(
                n,
                Notification::Status(s) if s.contains("failed to start recording")
            ))
        },
        Duration::from_secs(3),
    );
    handle.shutdown();

    assert!(failed, "no failure report in {:?}", notifications);
    assert!(!notifications.is_empty());
    // Active was entered and reverted.
    assert!(notifications.contains(&Notification::Recording(true)));
    assert!(notifications.contains(&Notification::Recording(false)));
}

#[test]
fn shutdown_while_idle_is_clean() {
    let (frame_tx, frame_rx) = FrameQueue::bounded(8);
    let shared = CaptureShared::new();
    let (notifier, _rx) = notification_channel();
    let handle = RecordingController::spawn(
        frame_tx,
        shared,
        notifier,
        PipelineMetrics::new(),
        None,
    )
    .expect("spawn controller");

    handle.shutdown();
    // All producers are gone once the controller exits.
    assert!(frame_rx.recv().is_err());
}
