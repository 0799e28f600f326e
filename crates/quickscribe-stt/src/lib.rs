//! Speech recognition boundary for quickscribe.
//!
//! The decoder itself is an external collaborator (Vosk, or a test double);
//! this crate defines the trait it is consumed through, the event type the
//! worker classifies its output into, and the worker that drives it.

pub mod noop;
pub mod scripted;
pub mod types;
pub mod worker;

pub use noop::NoopDecoder;
pub use scripted::{ScriptStep, ScriptedDecoder};
pub use types::RecognitionEvent;
pub use worker::{RecognitionWorker, WorkerHandle};

use quickscribe_foundation::DecodeError;

/// Streaming decoder interface. Implementations are stateful and scoped to
/// one continuous recording session; `reset` starts a new session.
pub trait SpeechDecoder: Send {
    /// Feed 16 kHz mono S16LE samples. Returns true when the current
    /// utterance is complete and a final result can be fetched.
    fn feed(&mut self, pcm: &[i16]) -> Result<bool, DecodeError>;

    /// Final text for the utterance that just completed.
    fn result(&mut self) -> String;

    /// Revisable hypothesis for the in-progress utterance.
    fn partial(&mut self) -> String;

    /// Discard in-flight decoder state.
    fn reset(&mut self);
}
