/// The session transcript. Owned exclusively by the aggregator thread;
/// append-only except for `clear`.
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    text: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Merge one finalized utterance and return the fragment exactly as it
    /// was appended (recapitalized or not), which is what gets dispatched.
    ///
    /// Rules: the first utterance is appended verbatim; after that exactly
    /// one space separates fragments, and when the existing transcript ends
    /// in `.`, `!` or `?` (ignoring trailing whitespace) a lowercase first
    /// letter of the new utterance is capitalized.
    pub fn merge(&mut self, utterance: &str) -> String {
        if self.text.is_empty() {
            self.text.push_str(utterance);
            return utterance.to_string();
        }

        let fragment = if ends_sentence(&self.text) {
            capitalize_first(utterance)
        } else {
            utterance.to_string()
        };

        self.text.push(' ');
        self.text.push_str(&fragment);
        fragment
    }
}

fn ends_sentence(text: &str) -> bool {
    matches!(text.trim_end().chars().last(), Some('.' | '!' | '?'))
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(chars.as_str());
            out
        }
        _ => s.to_string(),
    }
}
