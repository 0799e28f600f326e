use tracing::warn;
use vosk::{CompleteResult, DecodingState, Model, Recognizer};

use quickscribe_foundation::DecodeError;
use quickscribe_stt::SpeechDecoder;

/// Streaming Vosk recognizer behind the [`SpeechDecoder`] boundary. One
/// instance is one recognition session; `reset` flushes Vosk's internal
/// state for a new session.
pub struct VoskDecoder {
    recognizer: Recognizer,
}

impl VoskDecoder {
    pub fn new(model_path: &str, sample_rate: f32) -> Result<Self, DecodeError> {
        // Vosk models are trained for a fixed rate; warn rather than refuse,
        // recognition just degrades.
        if (sample_rate - 16_000.0).abs() > 0.1 {
            warn!(
                target: "stt",
                "sample rate {} Hz differs from the expected 16000 Hz; accuracy may suffer",
                sample_rate
            );
        }

        if !std::path::Path::new(model_path).exists() {
            return Err(DecodeError::Model(format!(
                "Vosk model not found at '{}'; download a model or set QUICKSCRIBE_MODEL_PATH",
                model_path
            )));
        }

        let model = Model::new(model_path).ok_or_else(|| {
            DecodeError::Model(format!("failed to load Vosk model from '{}'", model_path))
        })?;

        let mut recognizer = Recognizer::new(&model, sample_rate).ok_or_else(|| {
            DecodeError::Model(format!(
                "failed to create Vosk recognizer at {} Hz",
                sample_rate
            ))
        })?;
        // Single best hypothesis; word timings are not consumed anywhere.
        recognizer.set_max_alternatives(0);
        recognizer.set_words(false);
        recognizer.set_partial_words(false);

        Ok(Self { recognizer })
    }

    fn extract_text(result: CompleteResult) -> String {
        match result {
            CompleteResult::Single(single) => single.text.to_string(),
            CompleteResult::Multiple(multiple) => multiple
                .alternatives
                .first()
                .map(|alt| alt.text.to_string())
                .unwrap_or_default(),
        }
    }
}

impl SpeechDecoder for VoskDecoder {
    fn feed(&mut self, pcm: &[i16]) -> Result<bool, DecodeError> {
        let state = self
            .recognizer
            .accept_waveform(pcm)
            .map_err(|e| DecodeError::Frame(format!("waveform rejected: {:?}", e)))?;

        match state {
            DecodingState::Finalized => Ok(true),
            DecodingState::Running => Ok(false),
            DecodingState::Failed => Err(DecodeError::Frame(
                "recognition failed for current chunk".to_string(),
            )),
        }
    }

    fn result(&mut self) -> String {
        Self::extract_text(self.recognizer.result())
    }

    fn partial(&mut self) -> String {
        self.recognizer.partial_result().partial.to_string()
    }

    fn reset(&mut self) {
        // Vosk has no explicit reset; fetching the final result clears the
        // session state.
        let _ = self.recognizer.final_result();
    }
}
