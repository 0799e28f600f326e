use enigo::{Direction, Enigo, Key, Keyboard, Settings};
use tracing::debug;
use wl_clipboard_rs::copy::{MimeType, Options, Source};

use quickscribe_foundation::DispatchError;

use crate::OutputSink;

/// Clipboard-then-paste injection: write the text to the Wayland clipboard
/// and synthesize the platform paste chord. The fragment intentionally
/// stays on the clipboard afterwards, matching what the user just dictated.
#[derive(Default)]
pub struct ClipboardPasteInjector;

impl ClipboardPasteInjector {
    pub fn new() -> Self {
        Self
    }

    fn set_clipboard(text: &str) -> Result<(), DispatchError> {
        let source = Source::Bytes(text.as_bytes().to_vec().into());
        Options::new()
            .copy(source, MimeType::Text)
            .map_err(|e| DispatchError::Clipboard(e.to_string()))?;
        debug!(target: "inject", "clipboard set ({} chars)", text.len());
        Ok(())
    }

    fn press_paste() -> Result<(), DispatchError> {
        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| DispatchError::Keystroke(format!("failed to create Enigo: {}", e)))?;

        #[cfg(target_os = "macos")]
        let modifier = Key::Meta;
        #[cfg(not(target_os = "macos"))]
        let modifier = Key::Control;

        enigo
            .key(modifier, Direction::Press)
            .map_err(|e| DispatchError::Keystroke(format!("modifier press failed: {}", e)))?;
        let chord = enigo
            .key(Key::Unicode('v'), Direction::Click)
            .map_err(|e| DispatchError::Keystroke(format!("'v' failed: {}", e)));
        // Release the modifier even when the 'v' failed, or Ctrl stays
        // stuck down.
        enigo
            .key(modifier, Direction::Release)
            .map_err(|e| DispatchError::Keystroke(format!("modifier release failed: {}", e)))?;
        chord?;
        Ok(())
    }
}

impl OutputSink for ClipboardPasteInjector {
    fn name(&self) -> &'static str {
        "clipboard-paste"
    }

    fn inject(&mut self, text: &str) -> Result<(), DispatchError> {
        if text.is_empty() {
            return Ok(());
        }
        Self::set_clipboard(text)?;
        Self::press_paste()?;
        debug!(target: "inject", "injected {} chars at cursor", text.len());
        Ok(())
    }

    fn copy(&mut self, text: &str) -> Result<(), DispatchError> {
        if text.is_empty() {
            return Ok(());
        }
        Self::set_clipboard(text)
    }
}
