//! Transcript side of the quickscribe pipeline: the merge fold that grows
//! the transcript from finalized utterances, and the aggregator worker that
//! owns it and dispatches each increment to the output sink.

pub mod aggregator;
pub mod transcript;

pub use aggregator::{AggregatorHandle, TextAggregator, TextCommand};
pub use transcript::TranscriptBuffer;
