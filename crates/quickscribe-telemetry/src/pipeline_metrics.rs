use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared counters for cross-thread pipeline monitoring. Every field is a
/// plain atomic so the capture callback can update them without locking.
#[derive(Clone, Default)]
pub struct PipelineMetrics {
    /// Frames assembled and handed to the frame queue.
    pub frames_captured: Arc<AtomicU64>,
    /// Frames evicted by the queue's drop-oldest policy.
    pub frames_dropped: Arc<AtomicU64>,
    /// Partial hypotheses surfaced to the display.
    pub partial_count: Arc<AtomicU64>,
    /// Finalized utterances emitted by the recognizer.
    pub final_count: Arc<AtomicU64>,
    /// Per-frame decoder failures (worker kept going).
    pub decode_errors: Arc<AtomicU64>,
    /// Utterances merged into the transcript.
    pub utterances_merged: Arc<AtomicU64>,
    /// Output sink failures (transcript advanced anyway).
    pub dispatch_errors: Arc<AtomicU64>,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_frames_captured(&self) {
        self.frames_captured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_frames_dropped(&self, count: u64) {
        self.frames_dropped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_partials(&self) {
        self.partial_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_finals(&self) {
        self.final_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_decode_errors(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_utterances_merged(&self) {
        self.utterances_merged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dispatch_errors(&self) {
        self.dispatch_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_captured: self.frames_captured.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            partial_count: self.partial_count.load(Ordering::Relaxed),
            final_count: self.final_count.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            utterances_merged: self.utterances_merged.load(Ordering::Relaxed),
            dispatch_errors: self.dispatch_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters, for the shell's stats command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_captured: u64,
    pub frames_dropped: u64,
    pub partial_count: u64,
    pub final_count: u64,
    pub decode_errors: u64,
    pub utterances_merged: u64,
    pub dispatch_errors: u64,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "frames: {} captured, {} dropped | recognition: {} partials, {} finals, {} errors | text: {} merged, {} dispatch errors",
            self.frames_captured,
            self.frames_dropped,
            self.partial_count,
            self.final_count,
            self.decode_errors,
            self.utterances_merged,
            self.dispatch_errors,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_shared_across_clones() {
        let metrics = PipelineMetrics::new();
        let clone = metrics.clone();
        clone.increment_frames_captured();
        clone.increment_frames_captured();
        clone.add_frames_dropped(3);
        let snap = metrics.snapshot();
        assert_eq!(snap.frames_captured, 2);
        assert_eq!(snap.frames_dropped, 3);
    }
}
