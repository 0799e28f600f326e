//! Vosk backend for the quickscribe recognition boundary, gated behind the
//! "vosk" feature so the rest of the workspace builds without libvosk.

#[cfg(feature = "vosk")]
pub mod decoder;

#[cfg(feature = "vosk")]
pub use decoder::VoskDecoder;

/// Default model directory, matching the small English model the project
/// ships with instructions for.
pub const DEFAULT_MODEL_DIR: &str = "vosk-model-small-en-us-0.15";

/// Resolve the model directory: explicit argument, then the
/// `QUICKSCRIBE_MODEL_PATH` environment variable, then the default.
pub fn resolve_model_path(explicit: Option<&str>) -> String {
    if let Some(path) = explicit {
        if !path.is_empty() {
            return path.to_string();
        }
    }
    std::env::var("QUICKSCRIBE_MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_DIR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        assert_eq!(resolve_model_path(Some("/opt/model")), "/opt/model");
    }

    #[test]
    fn empty_explicit_path_falls_through() {
        // Env-dependent fallbacks both end somewhere non-empty.
        assert!(!resolve_model_path(Some("")).is_empty());
    }
}
