use std::collections::VecDeque;

use quickscribe_foundation::DecodeError;

use crate::SpeechDecoder;

/// One scripted response to a fed frame.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Report this in-progress hypothesis.
    Partial(String),
    /// Complete the utterance with this final text.
    Final(String),
    /// Keep decoding with nothing to report.
    Silence,
    /// Fail on this frame.
    Error(String),
}

/// Test decoder that replays a fixed script, one step per fed frame.
/// Frames past the end of the script decode as silence.
pub struct ScriptedDecoder {
    steps: VecDeque<ScriptStep>,
    current_partial: String,
    pending_final: String,
    resets: usize,
}

impl ScriptedDecoder {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: steps.into(),
            current_partial: String::new(),
            pending_final: String::new(),
            resets: 0,
        }
    }

    pub fn resets(&self) -> usize {
        self.resets
    }
}

impl SpeechDecoder for ScriptedDecoder {
    fn feed(&mut self, _pcm: &[i16]) -> Result<bool, DecodeError> {
        match self.steps.pop_front() {
            Some(ScriptStep::Partial(text)) => {
                self.current_partial = text;
                Ok(false)
            }
            Some(ScriptStep::Final(text)) => {
                self.pending_final = text;
                self.current_partial.clear();
                Ok(true)
            }
            Some(ScriptStep::Silence) | None => {
                self.current_partial.clear();
                Ok(false)
            }
            Some(ScriptStep::Error(message)) => Err(DecodeError::Frame(message)),
        }
    }

    fn result(&mut self) -> String {
        std::mem::take(&mut self.pending_final)
    }

    fn partial(&mut self) -> String {
        self.current_partial.clone()
    }

    fn reset(&mut self) {
        self.current_partial.clear();
        self.pending_final.clear();
        self.resets += 1;
    }
}
