use tracing::debug;

use quickscribe_foundation::DispatchError;

use crate::OutputSink;

/// Always-succeeding sink for `--no-inject` runs and featureless builds.
#[derive(Debug, Default)]
pub struct NoopSink {
    injected: u64,
    copied: u64,
}

impl NoopSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn injected(&self) -> u64 {
        self.injected
    }

    pub fn copied(&self) -> u64 {
        self.copied
    }
}

impl OutputSink for NoopSink {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn inject(&mut self, text: &str) -> Result<(), DispatchError> {
        self.injected += 1;
        debug!(target: "inject", "noop inject ({} chars)", text.len());
        Ok(())
    }

    fn copy(&mut self, text: &str) -> Result<(), DispatchError> {
        self.copied += 1;
        debug!(target: "inject", "noop copy ({} chars)", text.len());
        Ok(())
    }
}
