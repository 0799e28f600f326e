//! Audio side of the quickscribe pipeline: device management, the capture
//! stream with its real-time callback, frame assembly, the bounded frame
//! queue, the recording lifecycle controller, and the activity watchdog.

pub mod capture;
pub mod controller;
pub mod device;
pub mod frame;
pub mod queue;
pub mod resampler;
pub mod watchdog;

pub use capture::{CaptureShared, CaptureStream, FrameAssembler};
pub use controller::{ControllerHandle, RecordingController};
pub use device::DeviceManager;
pub use frame::{AudioFrame, FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ};
pub use queue::{FrameQueue, FrameReceiver, FrameSender};
pub use watchdog::{ActivityWatchdog, WatchdogHandle, STALL_THRESHOLD, WATCHDOG_PERIOD};
