use quickscribe_foundation::DecodeError;

use crate::SpeechDecoder;

/// Decoder used when no recognition backend is compiled in. Consumes every
/// frame and never produces text, so the rest of the pipeline still runs.
pub struct NoopDecoder;

impl SpeechDecoder for NoopDecoder {
    fn feed(&mut self, _pcm: &[i16]) -> Result<bool, DecodeError> {
        Ok(false)
    }

    fn result(&mut self) -> String {
        String::new()
    }

    fn partial(&mut self) -> String {
        String::new()
    }

    fn reset(&mut self) {}
}
