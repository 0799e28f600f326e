use serde::Deserialize;
use std::path::Path;

use quickscribe_foundation::AppError;

/// Settings read from `quickscribe.toml`. Everything has a default so the
/// file is optional; CLI flags override whatever is loaded.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Input device name; `None` uses the host default.
    pub device: Option<String>,
    /// Vosk model directory.
    pub model: Option<String>,
    /// Whether recognized text is injected at the cursor.
    pub inject: bool,
    /// Frame queue capacity, in 0.25 s frames.
    pub frame_queue_frames: usize,
    /// Utterance queue capacity.
    pub utterance_queue_len: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: None,
            model: None,
            inject: true,
            frame_queue_frames: 64,
            utterance_queue_len: 64,
        }
    }
}

impl AppConfig {
    /// Load the config file, or defaults when it does not exist. A present
    /// but malformed file is an error, never silently ignored.
    pub fn load_or_default(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&raw)
            .map_err(|e| AppError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let config = AppConfig::load_or_default(Path::new("/nonexistent/quickscribe.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "device = \"USB Microphone\"\ninject = false\nframe_queue_frames = 16"
        )
        .unwrap();
        let config = AppConfig::load_or_default(file.path()).unwrap();
        assert_eq!(config.device.as_deref(), Some("USB Microphone"));
        assert!(!config.inject);
        assert_eq!(config.frame_queue_frames, 16);
        assert_eq!(config.utterance_queue_len, 64);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "device = [not toml").unwrap();
        assert!(AppConfig::load_or_default(file.path()).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "devcie = \"typo\"").unwrap();
        assert!(AppConfig::load_or_default(file.path()).is_err());
    }
}
