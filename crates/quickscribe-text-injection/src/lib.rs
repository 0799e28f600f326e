//! Output boundary for recognized text: place a fragment at the cursor
//! (clipboard write + paste keystroke) or on the clipboard alone.

#[cfg(all(feature = "wl_clipboard", feature = "enigo"))]
pub mod clipboard_paste;
pub mod noop;

#[cfg(all(feature = "wl_clipboard", feature = "enigo"))]
pub use clipboard_paste::ClipboardPasteInjector;
pub use noop::NoopSink;

use quickscribe_foundation::DispatchError;

/// Where recognized text leaves the pipeline. Implementations are driven
/// from the aggregator thread only, so they may keep mutable state.
pub trait OutputSink: Send {
    fn name(&self) -> &'static str;

    /// Place text at the current cursor position.
    fn inject(&mut self, text: &str) -> Result<(), DispatchError>;

    /// Place text on the clipboard without pasting.
    fn copy(&mut self, text: &str) -> Result<(), DispatchError>;
}

/// The best sink this build supports: clipboard+paste when the backends are
/// compiled in, otherwise a no-op.
pub fn default_sink() -> Box<dyn OutputSink> {
    #[cfg(all(feature = "wl_clipboard", feature = "enigo"))]
    {
        Box::new(ClipboardPasteInjector::new())
    }
    #[cfg(not(all(feature = "wl_clipboard", feature = "enigo")))]
    {
        tracing::warn!(target: "inject", "no injection backend compiled in; text stays in the transcript only");
        Box::new(NoopSink::default())
    }
}
