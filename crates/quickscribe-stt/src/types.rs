/// Classified decoder output for one fed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Revisable in-progress hypothesis; supersedes any prior partial.
    Partial(String),
    /// Terminal text for one utterance. Always non-empty after trimming;
    /// empty finals are discarded before an event is ever built.
    Final(String),
}

impl RecognitionEvent {
    pub fn text(&self) -> &str {
        match self {
            RecognitionEvent::Partial(text) | RecognitionEvent::Final(text) => text,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, RecognitionEvent::Final(_))
    }
}
