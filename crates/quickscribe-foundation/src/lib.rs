//! Foundation types for quickscribe
//!
//! Error taxonomy shared by every pipeline stage, the one-way notification
//! channel the shell consumes, and the process shutdown handler.

pub mod error;
pub mod notify;
pub mod shutdown;

pub use error::{AppError, DecodeError, DeviceError, DispatchError};
pub use notify::{notification_channel, Notification, Notifier};
pub use shutdown::{ShutdownGuard, ShutdownHandler};
